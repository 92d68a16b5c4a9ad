use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a user row as stored in the `users` table.
///
/// Users own tasks through `Task::owner_id`; the schema itself is managed by
/// the API application, not by the supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_serializes_with_snake_case_fields() {
        let user = User {
            id: 1,
            username: "john_doe".to_string(),
            email: "john.doe@example.com".to_string(),
            full_name: "John Doe".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            is_active: true,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "john_doe");
        assert_eq!(json["full_name"], "John Doe");
        assert_eq!(json["is_active"], true);
    }
}
