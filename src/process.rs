//!
//! # Supervised Service Processes
//!
//! Wraps the API and dashboard children in a guard that owns the process for
//! its whole lifetime. The command line comes from configuration and is
//! parsed as plain command text (no shell interpretation); the child is
//! spawned with `kill_on_drop` so that any exit path of the supervisor, not
//! only the signal handler, releases it.

use std::process::{ExitStatus, Stdio};

use log::{info, warn};
use tokio::process::{Child, Command};

use crate::error::AppError;

/// A launched service with its recorded process handle.
#[derive(Debug)]
pub struct ServiceProcess {
    name: String,
    child: Child,
}

/// Parses `command_line` and spawns it. The child inherits stdout/stderr so
/// the service's own logs stream to the supervisor's terminal.
pub fn spawn_service(name: &str, command_line: &str) -> Result<ServiceProcess, AppError> {
    let parts = shlex::split(command_line).ok_or_else(|| {
        AppError::ProcessLaunch(format!(
            "{} command is not valid command text: `{}`",
            name, command_line
        ))
    })?;
    let mut iter = parts.into_iter();
    let program = iter
        .next()
        .ok_or_else(|| AppError::ProcessLaunch(format!("{} command is empty", name)))?;
    let args: Vec<String> = iter.collect();

    let child = Command::new(&program)
        .args(&args)
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| {
            AppError::ProcessLaunch(format!("failed to spawn {} (`{}`): {}", name, program, e))
        })?;

    match child.id() {
        Some(pid) => info!("launched {} (pid {})", name, pid),
        None => info!("launched {}", name),
    }

    Ok(ServiceProcess {
        name: name.to_string(),
        child,
    })
}

impl ServiceProcess {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the child to exit on its own.
    pub async fn wait(&mut self) -> Result<ExitStatus, AppError> {
        self.child.wait().await.map_err(|e| {
            AppError::ServiceExited(format!("failed to wait for {}: {}", self.name, e))
        })
    }

    /// Sends a kill to the child and reaps it. A child that already exited
    /// is not an error; any other failure is logged and swallowed so that
    /// shutdown always proceeds to the remaining children.
    pub async fn terminate(&mut self) {
        match self.child.start_kill() {
            Ok(()) => {
                let _ = self.child.wait().await;
                info!("stopped {}", self.name);
            }
            // start_kill reports InvalidInput once the child has been reaped.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(e) => warn!("failed to stop {}: {}", self.name, e),
        }
    }
}
