//! Deployment options passed to every operation

use crate::deploy::config::ConfigPolicy;
use crate::models::app::{AppDescriptor, AppKind};
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;

/// Name of the pid file gunicorn writes in each install directory
pub const PID_FILE_NAME: &str = "gunicorn.pid";

/// Main deployment options
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Where both applications live
    pub layout: StorageLayout,

    /// Web application descriptor
    pub web_app: AppDescriptor,

    /// File server descriptor
    pub file_server: AppDescriptor,

    /// How generated keys are written
    pub config_policy: ConfigPolicy,

    /// API prefix of the file server, used for the web app's base URL
    pub file_server_api_path: String,

    /// Command that rebuilds the file server's fixture tree
    pub fixtures_cmd: String,
}

impl DeployOptions {
    /// Build the options for `layout` from loaded settings
    pub fn new(layout: StorageLayout, settings: &Settings) -> Self {
        let web_dir = layout.web_app_dir();
        let web_app = AppDescriptor {
            kind: AppKind::WebApp,
            repo_url: settings.web_app.repo_url.clone(),
            config_file: web_dir.file(&settings.web_app.config_file),
            pid_file: web_dir.file(PID_FILE_NAME),
            install_dir: web_dir,
            bind_host: settings.bind_host.clone(),
            port: settings.web_app.port,
            wsgi_app: settings.web_app.wsgi_app.clone(),
            env: vec![(
                "DJANGO_SETTINGS_MODULE".to_string(),
                settings.web_app.django_settings_module.clone(),
            )],
        };

        let fs_dir = layout.file_server_dir();
        let file_server = AppDescriptor {
            kind: AppKind::FileServer,
            repo_url: settings.file_server.repo_url.clone(),
            config_file: fs_dir.file(&settings.file_server.config_file),
            pid_file: fs_dir.file(PID_FILE_NAME),
            install_dir: fs_dir,
            bind_host: settings.bind_host.clone(),
            port: settings.file_server.port,
            wsgi_app: settings.file_server.wsgi_app.clone(),
            env: Vec::new(),
        };

        Self {
            layout,
            web_app,
            file_server,
            config_policy: settings.config_policy,
            file_server_api_path: settings.file_server.api_path.clone(),
            fixtures_cmd: settings.file_server.fixtures_cmd.clone(),
        }
    }

    /// Descriptor of `kind`
    pub fn app(&self, kind: AppKind) -> &AppDescriptor {
        match kind {
            AppKind::WebApp => &self.web_app,
            AppKind::FileServer => &self.file_server,
        }
    }
}
