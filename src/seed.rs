//!
//! # Seed Data
//!
//! Fixed sample rows for the `users` and `tasks` tables, rendered as a MySQL
//! script and written into the directory that gets mounted at
//! `/docker-entrypoint-initdb.d`. The container executes the script once at
//! first initialization.
//!
//! The inserts are keyed on the tables' unique columns and carry an
//! `ON DUPLICATE KEY UPDATE id = id` clause, so running the script against an
//! already-seeded database is a no-op: no duplicated rows, no errors. The
//! schema itself (the `users` and `tasks` tables) is created by the API
//! application and is assumed to exist.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use log::info;

use crate::error::AppError;
use crate::models::{Task, TaskPriority, TaskStatus, User};
use crate::security::quote_literal;

/// File name the seed script is written under inside the seed directory.
pub const SEED_FILE_NAME: &str = "init.sql";

/// The three sample users. Task owner references point at these ids.
pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            username: "john_doe".to_string(),
            email: "john.doe@example.com".to_string(),
            full_name: "John Doe".to_string(),
            created_at: seed_time(2024, 1, 15, 9, 0, 0),
            is_active: true,
        },
        User {
            id: 2,
            username: "jane_smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            full_name: "Jane Smith".to_string(),
            created_at: seed_time(2024, 1, 15, 9, 5, 0),
            is_active: true,
        },
        User {
            id: 3,
            username: "mike_wilson".to_string(),
            email: "mike.wilson@example.com".to_string(),
            full_name: "Mike Wilson".to_string(),
            created_at: seed_time(2024, 1, 16, 14, 30, 0),
            is_active: true,
        },
    ]
}

/// The six sample tasks, spread across the three users and all status and
/// priority values.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            title: "Set up project repository".to_string(),
            description: Some("Create the git repository and push the initial skeleton".to_string()),
            status: TaskStatus::Completed,
            priority: TaskPriority::High,
            due_date: None,
            created_at: seed_time(2024, 1, 15, 10, 0, 0),
            updated_at: seed_time(2024, 1, 17, 16, 20, 0),
            owner_id: 1,
        },
        Task {
            id: 2,
            title: "Design database schema".to_string(),
            description: Some("Model users and tasks tables with their relations".to_string()),
            status: TaskStatus::Completed,
            priority: TaskPriority::High,
            due_date: Some(seed_time(2024, 1, 20, 18, 0, 0)),
            created_at: seed_time(2024, 1, 15, 11, 0, 0),
            updated_at: seed_time(2024, 1, 19, 9, 45, 0),
            owner_id: 1,
        },
        Task {
            id: 3,
            title: "Implement task endpoints".to_string(),
            description: Some("CRUD endpoints for tasks with status and priority filters".to_string()),
            status: TaskStatus::InProgress,
            priority: TaskPriority::Medium,
            due_date: Some(seed_time(2024, 2, 1, 18, 0, 0)),
            created_at: seed_time(2024, 1, 16, 9, 30, 0),
            updated_at: seed_time(2024, 1, 22, 13, 10, 0),
            owner_id: 2,
        },
        Task {
            id: 4,
            title: "Build dashboard overview page".to_string(),
            description: Some("Show task counts per status and a filterable table".to_string()),
            status: TaskStatus::InProgress,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: seed_time(2024, 1, 17, 10, 15, 0),
            updated_at: seed_time(2024, 1, 23, 11, 0, 0),
            owner_id: 2,
        },
        Task {
            id: 5,
            title: "Write API usage examples".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            due_date: None,
            created_at: seed_time(2024, 1, 18, 15, 0, 0),
            updated_at: seed_time(2024, 1, 18, 15, 0, 0),
            owner_id: 3,
        },
        Task {
            id: 6,
            title: "Review error handling".to_string(),
            description: Some("Audit the API's error responses for consistency".to_string()),
            status: TaskStatus::Pending,
            priority: TaskPriority::High,
            due_date: Some(seed_time(2024, 2, 5, 18, 0, 0)),
            created_at: seed_time(2024, 1, 19, 8, 45, 0),
            updated_at: seed_time(2024, 1, 19, 8, 45, 0),
            owner_id: 3,
        },
    ]
}

/// Renders the full seed script. Rendering is deterministic: the sample data
/// uses fixed timestamps, not clock readings.
pub fn render_seed_sql() -> String {
    let mut sql = String::new();
    sql.push_str("-- Sample data for the task management database.\n");
    sql.push_str("-- Executed once by the container at first initialization; inserts are\n");
    sql.push_str("-- keyed on unique columns so re-running the file leaves an already-seeded\n");
    sql.push_str("-- database unchanged.\n\n");

    sql.push_str(
        "INSERT INTO users (id, username, email, full_name, created_at, is_active) VALUES\n",
    );
    let users = sample_users();
    for (i, user) in users.iter().enumerate() {
        let terminator = if i + 1 == users.len() { "\n" } else { ",\n" };
        sql.push_str(&format!(
            "    ({}, {}, {}, {}, {}, {}){}",
            user.id,
            quote_literal(&user.username),
            quote_literal(&user.email),
            quote_literal(&user.full_name),
            sql_datetime(&user.created_at),
            sql_bool(user.is_active),
            terminator,
        ));
    }
    sql.push_str("ON DUPLICATE KEY UPDATE id = id;\n\n");

    sql.push_str(
        "INSERT INTO tasks (id, title, description, status, priority, due_date, created_at, updated_at, owner_id) VALUES\n",
    );
    let tasks = sample_tasks();
    for (i, task) in tasks.iter().enumerate() {
        let terminator = if i + 1 == tasks.len() { "\n" } else { ",\n" };
        sql.push_str(&format!(
            "    ({}, {}, {}, {}, {}, {}, {}, {}, {}){}",
            task.id,
            quote_literal(&task.title),
            sql_opt_text(task.description.as_deref()),
            quote_literal(task.status.as_str()),
            quote_literal(task.priority.as_str()),
            sql_opt_datetime(task.due_date.as_ref()),
            sql_datetime(&task.created_at),
            sql_datetime(&task.updated_at),
            task.owner_id,
            terminator,
        ));
    }
    sql.push_str("ON DUPLICATE KEY UPDATE id = id;\n");

    sql
}

/// Writes the seed script into `dir`, creating the directory if needed, and
/// returns the path of the written file.
pub fn write_seed_file(dir: &Path) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SEED_FILE_NAME);
    fs::write(&path, render_seed_sql())?;
    info!("wrote seed file {}", path.display());
    Ok(path)
}

fn seed_time(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .expect("seed timestamps are valid calendar dates")
}

fn sql_datetime(value: &DateTime<Utc>) -> String {
    format!("'{}'", value.format("%Y-%m-%d %H:%M:%S"))
}

fn sql_opt_datetime(value: Option<&DateTime<Utc>>) -> String {
    match value {
        Some(dt) => sql_datetime(dt),
        None => "NULL".to_string(),
    }
}

fn sql_opt_text(value: Option<&str>) -> String {
    match value {
        Some(text) => quote_literal(text),
        None => "NULL".to_string(),
    }
}

fn sql_bool(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}
