use regex::Regex;

lazy_static::lazy_static! {
    /// Names that end up inside `docker` arguments or SQL must stay plain:
    /// leading letter or underscore, then letters, digits, underscores or
    /// dashes. Referenced by the config validation rules.
    pub static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap();
}

/// Quotes a string as a MySQL string literal, escaping embedded quotes and
/// backslashes so seed values can never break out of the literal.
pub fn quote_literal(input: &str) -> String {
    let escaped = input.replace('\\', "\\\\").replace('\'', "''");
    format!("'{}'", escaped)
}
