//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! supervisor. It centralizes error management, providing a consistent way to
//! represent the conditions that can abort an environment startup, from a
//! missing virtualenv to a container engine failure.
//!
//! Each variant maps to a process exit code via [`AppError::exit_code`], so
//! the binary can distinguish "prerequisite/configuration problem" from
//! "datastore unavailable" from "a supervised service failed". It also
//! provides `From` trait implementations for common error types like
//! `std::io::Error`, `sqlx::Error` and `validator::ValidationErrors`,
//! allowing for easy conversion using the `?` operator.

use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur while bringing the stack up
/// or tearing it down.
#[derive(Debug)]
pub enum AppError {
    /// A required piece of the development environment is absent (exit 1).
    /// Reported before any process is launched.
    MissingPrerequisite(String),
    /// The configuration read from the environment is invalid (exit 1).
    ConfigError(String),
    /// A configuration value failed field-level validation (exit 1).
    /// Wraps errors from the `validator` crate.
    ValidationError(String),
    /// The container engine could not be invoked, or an engine command
    /// exited nonzero (exit 2).
    ContainerEngine(String),
    /// The datastore never became ready, or a connection-level check
    /// failed (exit 2). Wraps errors from the `sqlx` crate.
    DatastoreError(String),
    /// A supervised service did not come up within the startup bound (exit 3).
    StartupTimeout(String),
    /// A supervised service could not be launched (exit 3).
    ProcessLaunch(String),
    /// A supervised service exited while the supervisor was running (exit 3).
    ServiceExited(String),
    /// An I/O operation failed, e.g. writing the seed file (exit 2).
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::MissingPrerequisite(msg) => write!(f, "Missing prerequisite: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ContainerEngine(msg) => write!(f, "Container engine error: {}", msg),
            AppError::DatastoreError(msg) => write!(f, "Datastore error: {}", msg),
            AppError::StartupTimeout(msg) => write!(f, "Startup timeout: {}", msg),
            AppError::ProcessLaunch(msg) => write!(f, "Process launch error: {}", msg),
            AppError::ServiceExited(msg) => write!(f, "Service exited: {}", msg),
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl AppError {
    /// Maps each error class to the exit code the binary reports.
    ///
    /// Prerequisite and configuration problems exit 1, datastore and engine
    /// problems exit 2, supervised-service problems exit 3. A clean
    /// signal-triggered shutdown is not an error and exits 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::MissingPrerequisite(_)
            | AppError::ConfigError(_)
            | AppError::ValidationError(_) => 1,
            AppError::ContainerEngine(_) | AppError::DatastoreError(_) | AppError::Io(_) => 2,
            AppError::StartupTimeout(_)
            | AppError::ProcessLaunch(_)
            | AppError::ServiceExited(_) => 3,
        }
    }
}

/// Converts `std::io::Error` into `AppError::Io`.
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> AppError {
        AppError::Io(error.to_string())
    }
}

/// Converts `sqlx::Error` into `AppError::DatastoreError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::DatastoreError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        // Prerequisite and configuration failures
        let error = AppError::MissingPrerequisite("venv not found".into());
        assert_eq!(error.exit_code(), 1);

        let error = AppError::ConfigError("API_PORT must be a number".into());
        assert_eq!(error.exit_code(), 1);

        // Datastore failures
        let error = AppError::ContainerEngine("docker run failed".into());
        assert_eq!(error.exit_code(), 2);

        let error = AppError::DatastoreError("connection refused".into());
        assert_eq!(error.exit_code(), 2);

        // Supervised service failures
        let error = AppError::ServiceExited("api exited with status 1".into());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error: AppError = io_error.into();
        match error {
            AppError::Io(msg) => assert!(msg.contains("no such file")),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_display_includes_context() {
        let error = AppError::StartupTimeout("api on port 8001".into());
        assert_eq!(error.to_string(), "Startup timeout: api on port 8001");
    }
}
