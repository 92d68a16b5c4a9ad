//!
//! # Startup/Shutdown Orchestration
//!
//! Brings the stack up in dependency order and tears it down cleanly:
//!
//! 1. prerequisite check (virtual environment must exist),
//! 2. datastore container ensured running, seed file mounted at creation,
//! 3. datastore readiness probed with a real connection, bounded retries,
//! 4. API launched, its port probed,
//! 5. dashboard launched, its port probed,
//! 6. block until a child exits or SIGINT/SIGTERM arrives,
//! 7. terminate both children; the datastore container is longer-lived
//!    infrastructure and is deliberately left running.
//!
//! Readiness is verified, never assumed: each probe retries with exponential
//! backoff up to the configured startup timeout and surfaces a clear error
//! when the bound is exceeded.

use std::process::ExitStatus;
use std::time::Duration;

use log::info;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tokio::net::TcpStream;
use tokio::time::Instant;

use crate::config::Config;
use crate::docker;
use crate::error::AppError;
use crate::process;

enum Outcome {
    ApiExited(Result<ExitStatus, AppError>),
    DashboardExited(Result<ExitStatus, AppError>),
    Shutdown,
}

pub struct Supervisor {
    config: Config,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Supervisor { config }
    }

    /// Runs the whole startup sequence and blocks until shutdown.
    ///
    /// Returns `Ok(())` only for a signal-triggered shutdown; an early child
    /// exit or any startup failure is an error, after the already-launched
    /// children have been terminated.
    pub async fn run(&self) -> Result<(), AppError> {
        self.check_prerequisites()?;

        println!(
            "Ensuring datastore container `{}` is available...",
            self.config.container_name
        );
        docker::ensure_datastore(&self.config).await?;

        println!(
            "Waiting for the datastore on port {}...",
            self.config.datastore_port
        );
        self.wait_for_database().await?;

        println!("Starting API on port {}...", self.config.api_port);
        let mut api = process::spawn_service("api", &self.config.api_command)?;
        if let Err(e) = wait_for_port("api", self.config.api_port, self.config.startup_timeout()).await
        {
            api.terminate().await;
            return Err(e);
        }

        println!("Starting dashboard on port {}...", self.config.dashboard_port);
        let mut dashboard = match process::spawn_service("dashboard", &self.config.dashboard_command)
        {
            Ok(dashboard) => dashboard,
            Err(e) => {
                api.terminate().await;
                return Err(e);
            }
        };
        if let Err(e) = wait_for_port(
            "dashboard",
            self.config.dashboard_port,
            self.config.startup_timeout(),
        )
        .await
        {
            api.terminate().await;
            dashboard.terminate().await;
            return Err(e);
        }

        println!(
            "Stack is up: API {} | dashboard {} | database {}",
            self.config.api_url(),
            self.config.dashboard_url(),
            self.config.database_url()
        );
        println!("Press Ctrl+C to stop.");

        let outcome = tokio::select! {
            status = api.wait() => Outcome::ApiExited(status),
            status = dashboard.wait() => Outcome::DashboardExited(status),
            _ = shutdown_signal() => Outcome::Shutdown,
        };

        match outcome {
            Outcome::Shutdown => {
                println!("Shutting down...");
                api.terminate().await;
                dashboard.terminate().await;
                info!(
                    "container `{}` left running",
                    self.config.container_name
                );
                Ok(())
            }
            Outcome::ApiExited(status) => {
                dashboard.terminate().await;
                Err(AppError::ServiceExited(exit_message("api", status)))
            }
            Outcome::DashboardExited(status) => {
                api.terminate().await;
                Err(AppError::ServiceExited(exit_message("dashboard", status)))
            }
        }
    }

    /// Fails fast, before anything is launched, when the environment the
    /// service commands depend on is absent.
    fn check_prerequisites(&self) -> Result<(), AppError> {
        let venv = &self.config.venv_dir;
        if !venv.is_dir() {
            return Err(AppError::MissingPrerequisite(format!(
                "virtual environment not found at `{}`; create it and install the application requirements first",
                venv.display()
            )));
        }
        Ok(())
    }

    /// Probes the datastore with a real connection and ping using the
    /// application credentials, retrying with backoff until the startup
    /// timeout.
    async fn wait_for_database(&self) -> Result<(), AppError> {
        let options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(self.config.datastore_port)
            .username(&self.config.app_user)
            .password(&self.config.app_password)
            .database(&self.config.database);

        let deadline = Instant::now() + self.config.startup_timeout();
        let mut delay = Duration::from_millis(500);
        loop {
            match options.connect().await {
                Ok(mut conn) => {
                    conn.ping().await?;
                    let _ = conn.close().await;
                    info!(
                        "datastore is accepting connections on port {}",
                        self.config.datastore_port
                    );
                    return Ok(());
                }
                Err(e) => {
                    if Instant::now() + delay >= deadline {
                        return Err(AppError::StartupTimeout(format!(
                            "datastore did not accept connections on port {} within {}s: {}",
                            self.config.datastore_port, self.config.startup_timeout_secs, e
                        )));
                    }
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(5));
                }
            }
        }
    }
}

/// Waits until something accepts TCP connections on `port`, retrying with
/// exponential backoff up to `timeout`.
pub async fn wait_for_port(name: &str, port: u16, timeout: Duration) -> Result<(), AppError> {
    let deadline = Instant::now() + timeout;
    let mut delay = Duration::from_millis(250);
    loop {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(_) => {
                info!("{} is accepting connections on port {}", name, port);
                return Ok(());
            }
            Err(e) => {
                if Instant::now() + delay >= deadline {
                    return Err(AppError::StartupTimeout(format!(
                        "{} did not accept connections on port {} within the startup bound: {}",
                        name, port, e
                    )));
                }
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(2));
            }
        }
    }
}

/// Resolves on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn exit_message(name: &str, status: Result<ExitStatus, AppError>) -> String {
    match status {
        Ok(status) => format!("{} exited unexpectedly ({})", name, status),
        Err(e) => format!("{} could not be awaited: {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::net::TcpListener;
    use std::path::PathBuf;

    fn test_config(venv_dir: PathBuf) -> Config {
        Config {
            container_name: "task_management_db".to_string(),
            image: "mysql:8.0".to_string(),
            datastore_port: 3307,
            database: "task_management".to_string(),
            app_user: "app_user".to_string(),
            app_password: "app_password".to_string(),
            root_password: "rootpassword".to_string(),
            seed_dir: PathBuf::from("db/init"),
            venv_dir,
            api_port: 8001,
            api_command: "venv/bin/uvicorn main:app --reload --port 8001".to_string(),
            dashboard_port: 8502,
            dashboard_command: "venv/bin/streamlit run streamlit_app.py --server.port 8502"
                .to_string(),
            startup_timeout_secs: 60,
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_wait_for_port_succeeds_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().unwrap().port();

        wait_for_port("listener", port, Duration::from_secs(5))
            .await
            .expect("probe must succeed while the listener is alive");
    }

    #[tokio::test]
    async fn test_wait_for_port_times_out_when_nothing_listens() {
        // Bind and drop to get a port that is very likely free.
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = wait_for_port("ghost", port, Duration::from_millis(300))
            .await
            .expect_err("probe must time out");
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_missing_venv_fails_before_anything_launches() {
        let config = test_config(PathBuf::from("definitely/not/a/venv"));
        let supervisor = Supervisor::new(config);
        let err = supervisor
            .check_prerequisites()
            .expect_err("missing venv must be fatal");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("virtual environment"));
    }

    #[tokio::test]
    async fn test_present_venv_passes_prerequisite_check() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = test_config(dir.path().to_path_buf());
        let supervisor = Supervisor::new(config);
        supervisor
            .check_prerequisites()
            .expect("existing venv dir must pass");
    }
}
