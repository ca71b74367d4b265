//! Deployment pipeline for the web app and the file server
//!
//! Every operation is a one-shot sequence of commands issued through the
//! [`CommandRunner`], one after the other. Nothing is retried and a failed
//! step aborts the operation without undoing earlier steps.

use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::app::options::DeployOptions;
use crate::deploy::config::{
    ConfigFile, CredentialPair, FILES_DIRECTORY_KEY, FILE_SERVER_BASE_URL_KEY,
};
use crate::deploy::prompt::Prompter;
use crate::deploy::runner::{CommandRunner, ShellCommand};
use crate::deploy::{git, network, process, venv};
use crate::errors::DeployError;
use crate::models::app::{AppDescriptor, AppKind, Selector};
use crate::utils::shell_quote;

const STORAGE_PROMPT: &str =
    "Shared storage path for the file server (leave blank to keep the default):";
const DEPLOY_WEB_APP_PROMPT: &str = "Deploy web app locally?";

/// Summary of a `build_configs` run
#[derive(Debug)]
pub struct GeneratedConfig {
    pub credentials: CredentialPair,
    pub file_server_base_url: Url,
    pub files_directory: Option<String>,
}

/// Process state of one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppStatus {
    pub app: AppKind,
    pub pid: Option<i32>,
    pub alive: bool,
}

/// Drives clone, configure, deploy and kill against the local host
pub struct Orchestrator {
    options: DeployOptions,
    runner: Arc<dyn CommandRunner>,
    prompter: Arc<dyn Prompter>,
}

impl Orchestrator {
    pub fn new(
        options: DeployOptions,
        runner: Arc<dyn CommandRunner>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            options,
            runner,
            prompter,
        }
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Clone, configure, start the file server and optionally the web app
    pub async fn build_app(&self) -> Result<(), DeployError> {
        self.clone_apps(Selector::All).await?;
        self.build_configs().await?;
        self.deploy_file_server(false).await?;

        if self.prompter.confirm(DEPLOY_WEB_APP_PROMPT).await? {
            self.deploy_web_app(true).await?;
        } else {
            info!("Skipping web app deployment");
        }
        Ok(())
    }

    /// Fresh checkout plus virtualenv for every selected application
    pub async fn clone_apps(&self, selector: Selector) -> Result<(), DeployError> {
        for kind in selector.apps() {
            let app = self.options.app(kind);
            git::fresh_clone(self.runner.as_ref(), &app.repo_url, &app.install_dir).await?;
            venv::provision(self.runner.as_ref(), app).await?;
        }
        Ok(())
    }

    /// Generate shared credentials and endpoint settings for both apps
    pub async fn build_configs(&self) -> Result<GeneratedConfig, DeployError> {
        let host = network::host_address();
        self.build_configs_for_host(host).await
    }

    /// [`Self::build_configs`] with an already known host address
    pub async fn build_configs_for_host(
        &self,
        host: IpAddr,
    ) -> Result<GeneratedConfig, DeployError> {
        let policy = self.options.config_policy;
        let web = &self.options.web_app;
        let fs = &self.options.file_server;

        let credentials = CredentialPair::generate();
        info!(
            "Generated client credentials (client id {})",
            credentials.client_id
        );

        let file_server_base_url =
            network::base_url(host, fs.port, &self.options.file_server_api_path)?;

        let mut web_config = ConfigFile::load(&web.config_file).await?;
        credentials.write_into(&mut web_config, policy);
        web_config.apply(policy, FILE_SERVER_BASE_URL_KEY, file_server_base_url.as_str());

        let mut fs_config = ConfigFile::load(&fs.config_file).await?;
        credentials.write_into(&mut fs_config, policy);

        let answer = self.prompter.ask(STORAGE_PROMPT).await?;
        let files_directory = Some(answer.trim().to_string()).filter(|dir| !dir.is_empty());
        if let Some(dir) = &files_directory {
            fs_config.apply(policy, FILES_DIRECTORY_KEY, dir);
        }

        web_config.save(&web.config_file).await?;
        fs_config.save(&fs.config_file).await?;
        info!(
            "Wrote {:?} and {:?} ({:?} policy)",
            web.config_file.path(),
            fs.config_file.path(),
            policy
        );

        Ok(GeneratedConfig {
            credentials,
            file_server_base_url,
            files_directory,
        })
    }

    /// Start the selected applications; `all` starts the file server first
    pub async fn deploy(&self, selector: Selector) -> Result<(), DeployError> {
        match selector {
            Selector::One(AppKind::WebApp) => self.deploy_web_app(false).await,
            Selector::One(AppKind::FileServer) => self.deploy_file_server(false).await,
            Selector::All => {
                self.deploy_file_server(false).await?;
                self.deploy_web_app(false).await
            }
        }
    }

    /// Install dependencies, optionally initialize the database, start gunicorn
    pub async fn deploy_web_app(&self, init_db: bool) -> Result<(), DeployError> {
        let app = &self.options.web_app;
        info!("Deploying {}", app.kind.label());

        self.run(venv::in_venv(app, "pip install -r requirements.txt"))
            .await?;
        if init_db {
            self.run(venv::in_venv(app, "python manage.py migrate")).await?;
            self.run(venv::in_venv(app, "python manage.py createsuperuser").interactive())
                .await?;
        }
        self.start(app).await
    }

    /// Install dependencies, optionally rebuild fixtures, start gunicorn
    pub async fn deploy_file_server(&self, build_fixtures: bool) -> Result<(), DeployError> {
        let app = &self.options.file_server;
        info!("Deploying {}", app.kind.label());

        self.run(venv::in_venv(app, "pip install -r requirements.txt"))
            .await?;
        if build_fixtures {
            self.run(venv::in_venv(app, self.options.fixtures_cmd.clone()))
                .await?;
        }
        self.start(app).await
    }

    /// SIGKILL the recorded process of every selected application.
    /// Stops at the first application whose pid file or process is missing.
    pub async fn kill(&self, selector: Selector) -> Result<(), DeployError> {
        for kind in selector.apps() {
            let app = self.options.app(kind);
            let pid = process::read_pid(&app.pid_file).await?;
            info!("Stopping {} (pid {})", app.kind.label(), pid);
            process::force_kill(pid)?;
        }
        Ok(())
    }

    /// Recorded pid and liveness of every selected application
    pub async fn status(&self, selector: Selector) -> Vec<AppStatus> {
        let mut statuses = Vec::new();
        for kind in selector.apps() {
            let pid = process::recorded_pid(&self.options.app(kind).pid_file).await;
            statuses.push(AppStatus {
                app: kind,
                pid,
                alive: pid.map(process::is_alive).unwrap_or(false),
            });
        }
        statuses
    }

    async fn start(&self, app: &AppDescriptor) -> Result<(), DeployError> {
        if let Some(pid) = process::recorded_pid(&app.pid_file).await {
            if process::is_alive(pid) {
                warn!(
                    "{} is already running as pid {}; that process will be orphaned",
                    app.kind.label(),
                    pid
                );
            }
        }

        let line = format!(
            "gunicorn --daemon --bind {} --pid {} {}",
            shell_quote(&app.bind_address()),
            shell_quote(&app.pid_file.path().to_string_lossy()),
            shell_quote(&app.wsgi_app)
        );
        self.run(venv::in_venv(app, line)).await?;
        info!("{} started on {}", app.kind.label(), app.bind_address());
        Ok(())
    }

    async fn run(&self, command: ShellCommand) -> Result<(), DeployError> {
        self.runner.run(&command).await
    }
}
