//!
//! # Datastore Container Management
//!
//! Drives the `docker` CLI to keep the MySQL container in the running state.
//! The decision of what to do is a pure function of the observed container
//! state: a running container is left alone, a stopped one is started, a
//! missing one is created with the configured credentials, port mapping and
//! seed-file mount.
//!
//! Engine failures are fatal: if the container can never become available
//! the whole startup sequence aborts instead of continuing without a
//! datastore.

use std::path::Path;
use std::process::Stdio;

use log::info;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::Config;
use crate::error::AppError;
use crate::seed;

const DOCKER_BIN: &str = "docker";
/// MySQL's port inside the container; the host side comes from the config.
const MYSQL_CONTAINER_PORT: u16 = 3306;
/// Where MySQL images pick up first-run init scripts.
const INIT_MOUNT_POINT: &str = "/docker-entrypoint-initdb.d/init.sql";

/// Observed state of the datastore container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
    Missing,
}

/// What the supervisor decided to do about the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatastoreAction {
    /// Container already running; nothing was done.
    None,
    /// An existing stopped container was started.
    Start,
    /// No container existed; one was created.
    Create,
}

/// Maps an observed state to the action to take.
pub fn plan_action(state: ContainerState) -> DatastoreAction {
    match state {
        ContainerState::Running => DatastoreAction::None,
        ContainerState::Stopped => DatastoreAction::Start,
        ContainerState::Missing => DatastoreAction::Create,
    }
}

/// The slice of `docker inspect` state the supervisor cares about.
#[derive(Debug, Deserialize)]
struct EngineState {
    #[serde(rename = "Running")]
    running: bool,
}

/// Queries the engine for the container's state. A failed inspect means the
/// container does not exist; a failure to invoke the engine at all is fatal.
pub async fn container_state(name: &str) -> Result<ContainerState, AppError> {
    let output = Command::new(DOCKER_BIN)
        .args(["inspect", "--format", "{{json .State}}", name])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| AppError::ContainerEngine(format!("failed to invoke `docker`: {}", e)))?;

    if !output.status.success() {
        return Ok(ContainerState::Missing);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let state: EngineState = serde_json::from_str(stdout.trim()).map_err(|e| {
        AppError::ContainerEngine(format!("unexpected `docker inspect` output: {}", e))
    })?;

    if state.running {
        Ok(ContainerState::Running)
    } else {
        Ok(ContainerState::Stopped)
    }
}

/// Arguments for `docker run` creating the datastore container. Split out so
/// the exact invocation is testable without an engine.
pub fn create_args(config: &Config, seed_file: &Path) -> Vec<String> {
    vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        config.container_name.clone(),
        "-e".to_string(),
        format!("MYSQL_ROOT_PASSWORD={}", config.root_password),
        "-e".to_string(),
        format!("MYSQL_DATABASE={}", config.database),
        "-e".to_string(),
        format!("MYSQL_USER={}", config.app_user),
        "-e".to_string(),
        format!("MYSQL_PASSWORD={}", config.app_password),
        "-p".to_string(),
        format!("{}:{}", config.datastore_port, MYSQL_CONTAINER_PORT),
        "-v".to_string(),
        format!("{}:{}:ro", seed_file.display(), INIT_MOUNT_POINT),
        config.image.clone(),
    ]
}

/// Ensures the datastore container is running, returning the action that was
/// taken. Only the create path touches the filesystem: the seed file is
/// written (and mounted) when, and only when, a new container is created.
pub async fn ensure_datastore(config: &Config) -> Result<DatastoreAction, AppError> {
    let state = container_state(&config.container_name).await?;
    let action = plan_action(state);

    match action {
        DatastoreAction::None => {
            info!("container `{}` already running", config.container_name);
        }
        DatastoreAction::Start => {
            info!("starting stopped container `{}`", config.container_name);
            run_engine(&["start".to_string(), config.container_name.clone()]).await?;
        }
        DatastoreAction::Create => {
            let seed_file = seed::write_seed_file(&config.seed_dir)?;
            // The engine mounts by absolute path.
            let seed_file = std::fs::canonicalize(&seed_file)?;
            info!(
                "creating container `{}` from image `{}`",
                config.container_name, config.image
            );
            run_engine(&create_args(config, &seed_file)).await?;
        }
    }

    Ok(action)
}

async fn run_engine(args: &[String]) -> Result<String, AppError> {
    let output = Command::new(DOCKER_BIN)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| AppError::ContainerEngine(format!("failed to invoke `docker`: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::ContainerEngine(format!(
            "`docker {}` failed: {}",
            args.first().map(String::as_str).unwrap_or(""),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
