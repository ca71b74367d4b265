//! Task dispatch

use colored::Colorize;
use secrecy::ExposeSecret;
use tracing::info;

use crate::deploy::orchestrator::Orchestrator;
use crate::errors::DeployError;
use crate::models::app::Selector;

/// One invocation of the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    BuildApp,
    Clone(String),
    BuildConfigs,
    Deploy(String),
    Kill(String),
    Status(String),
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::BuildApp => "build_app",
            Task::Clone(_) => "clone",
            Task::BuildConfigs => "build_configs",
            Task::Deploy(_) => "deploy",
            Task::Kill(_) => "kill",
            Task::Status(_) => "status",
        }
    }
}

/// Run `task`. Selectors are validated before anything touches the host.
pub async fn run(orchestrator: &Orchestrator, task: Task) -> Result<(), DeployError> {
    info!("Running task {}", task.name());

    match task {
        Task::BuildApp => orchestrator.build_app().await,
        Task::Clone(app) => orchestrator.clone_apps(app.parse()?).await,
        Task::BuildConfigs => {
            let generated = orchestrator.build_configs().await?;
            println!("{} {}", "CLIENT_ID".bold(), generated.credentials.client_id);
            println!(
                "{} {}",
                "CLIENT_SECRET".bold(),
                "*".repeat(generated.credentials.client_secret.expose_secret().len())
            );
            println!(
                "{} {}",
                "FILE_SERVER_BASE_URL".bold(),
                generated.file_server_base_url
            );
            if let Some(dir) = &generated.files_directory {
                println!("{} {}", "FILES_DIRECTORY".bold(), dir);
            }
            Ok(())
        }
        Task::Deploy(app) => orchestrator.deploy(app.parse()?).await,
        Task::Kill(app) => orchestrator.kill(app.parse()?).await,
        Task::Status(app) => {
            let selector: Selector = app.parse()?;
            for status in orchestrator.status(selector).await {
                let state = match (status.pid, status.alive) {
                    (Some(pid), true) => format!("running (pid {})", pid).green(),
                    (Some(pid), false) => format!("stopped (stale pid {})", pid).yellow(),
                    (None, _) => "not deployed".dimmed(),
                };
                println!("{:<12} {}", status.app.name(), state);
            }
            Ok(())
        }
    }
}
