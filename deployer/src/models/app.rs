//! Application descriptors and selectors

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// The two deployable applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    WebApp,
    FileServer,
}

impl AppKind {
    /// Selector / directory name of the application
    pub fn name(&self) -> &'static str {
        match self {
            AppKind::WebApp => "web_app",
            AppKind::FileServer => "file_server",
        }
    }

    /// Human readable label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            AppKind::WebApp => "Web App",
            AppKind::FileServer => "File Server",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which applications an operation applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    One(AppKind),
}

impl Selector {
    /// Selected applications, in the order operations visit them
    pub fn apps(&self) -> Vec<AppKind> {
        match self {
            Selector::All => vec![AppKind::WebApp, AppKind::FileServer],
            Selector::One(kind) => vec![*kind],
        }
    }
}

impl FromStr for Selector {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Selector::All),
            "web_app" => Ok(Selector::One(AppKind::WebApp)),
            "file_server" => Ok(Selector::One(AppKind::FileServer)),
            other => Err(DeployError::InvalidSelector(other.to_string())),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str("all"),
            Selector::One(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

/// Everything the orchestrator needs to know about one application
#[derive(Debug, Clone)]
pub struct AppDescriptor {
    pub kind: AppKind,

    /// Git URL the source tree is cloned from
    pub repo_url: String,

    /// Directory holding the clone, the venv and the runtime files
    pub install_dir: Dir,

    /// Settings module the generated keys are written into
    pub config_file: File,

    /// Pid file handed to gunicorn
    pub pid_file: File,

    /// Address gunicorn binds on
    pub bind_host: String,
    pub port: u16,

    /// WSGI entry point, e.g. `easyNAS.wsgi:application`
    pub wsgi_app: String,

    /// Extra environment for every command run inside the venv
    pub env: Vec<(String, String)>,
}

impl AppDescriptor {
    pub fn venv_dir(&self) -> Dir {
        self.install_dir.subdir("venv")
    }

    /// The venv's own activation script
    pub fn activate_script(&self) -> PathBuf {
        self.venv_dir().path().join("bin").join("activate")
    }

    /// Stable alias to the activation script, recreated on every clone
    pub fn activate_link(&self) -> File {
        self.install_dir.file("activate")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}
