#![doc = "The `taskstack` library crate."]
#![doc = ""]
#![doc = "This crate contains the orchestration logic for the local task-management"]
#![doc = "development stack: configuration, the datastore container management, the"]
#![doc = "seed data, the supervised service processes and the supervisor sequence."]
#![doc = "It is used by the main binary (`main.rs`) to bring the stack up and down."]

pub mod config;
pub mod docker;
pub mod error;
pub mod models;
pub mod process;
pub mod seed;
pub mod security;
pub mod supervisor;

// Re-export key types if desired for easier use of the library crate.
// Example:
// pub use crate::error::AppError;
// pub use crate::models::{Task, TaskStatus, User};
