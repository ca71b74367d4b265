//! Settings file management

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::deploy::config::ConfigPolicy;
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Settings file read when none is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "nasdeploy.json";

/// Orchestrator settings, read from an optional JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Optional log file, in addition to stderr. Relative to the base directory.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Directory the two install directories are created in.
    /// Defaults to the parent of the working directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Address both services bind on
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// How generated keys are written into the settings modules
    #[serde(default)]
    pub config_policy: ConfigPolicy,

    /// Web application configuration
    #[serde(default)]
    pub web_app: WebAppSettings,

    /// File server configuration
    #[serde(default)]
    pub file_server: FileServerSettings,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_file: None,
            base_dir: None,
            bind_host: default_bind_host(),
            config_policy: ConfigPolicy::default(),
            web_app: WebAppSettings::default(),
            file_server: FileServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `file`, or defaults when it does not exist
    pub async fn load_or_default(file: &File) -> Result<Self, DeployError> {
        if !file.exists().await {
            return Ok(Self::default());
        }
        Self::load(file).await
    }

    /// Load settings from `file`, which must exist
    pub async fn load(file: &File) -> Result<Self, DeployError> {
        file.read_json().await.map_err(|e| {
            DeployError::ConfigError(format!("Unable to read {:?}: {}", file.path(), e))
        })
    }

    /// Log file location with a relative `log_file` placed under `base_dir`
    pub fn log_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.log_file.as_ref().map(|file| base_dir.join(file))
    }
}

/// Web application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppSettings {
    #[serde(default = "default_web_repo")]
    pub repo_url: String,

    #[serde(default = "default_web_port")]
    pub port: u16,

    /// Settings module, relative to the install directory
    #[serde(default = "default_web_config")]
    pub config_file: PathBuf,

    #[serde(default = "default_web_wsgi")]
    pub wsgi_app: String,

    /// Value exported as `DJANGO_SETTINGS_MODULE`
    #[serde(default = "default_django_settings")]
    pub django_settings_module: String,
}

fn default_web_repo() -> String {
    "https://github.com/rjhowar2/easyNAS".to_string()
}

fn default_web_port() -> u16 {
    8000
}

fn default_web_config() -> PathBuf {
    PathBuf::from("easyNAS/settings/common.py")
}

fn default_web_wsgi() -> String {
    "easyNAS.wsgi:application".to_string()
}

fn default_django_settings() -> String {
    "easyNAS.settings.dev".to_string()
}

impl Default for WebAppSettings {
    fn default() -> Self {
        Self {
            repo_url: default_web_repo(),
            port: default_web_port(),
            config_file: default_web_config(),
            wsgi_app: default_web_wsgi(),
            django_settings_module: default_django_settings(),
        }
    }
}

/// File server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileServerSettings {
    #[serde(default = "default_fs_repo")]
    pub repo_url: String,

    #[serde(default = "default_fs_port")]
    pub port: u16,

    /// Config module, relative to the install directory
    #[serde(default = "default_fs_config")]
    pub config_file: PathBuf,

    #[serde(default = "default_fs_wsgi")]
    pub wsgi_app: String,

    /// API prefix appended to the derived base URL
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Command that rebuilds the fixture directory tree
    #[serde(default = "default_fixtures_cmd")]
    pub fixtures_cmd: String,
}

fn default_fs_repo() -> String {
    "https://github.com/rjhowar2/nas-file-server".to_string()
}

fn default_fs_port() -> u16 {
    5000
}

fn default_fs_config() -> PathBuf {
    PathBuf::from("nas_server/config.py")
}

fn default_fs_wsgi() -> String {
    "runserver:app".to_string()
}

fn default_api_path() -> String {
    "/nas_server/api/v1.0".to_string()
}

fn default_fixtures_cmd() -> String {
    "python build_test_dirs.py".to_string()
}

impl Default for FileServerSettings {
    fn default() -> Self {
        Self {
            repo_url: default_fs_repo(),
            port: default_fs_port(),
            config_file: default_fs_config(),
            wsgi_app: default_fs_wsgi(),
            api_path: default_api_path(),
            fixtures_cmd: default_fixtures_cmd(),
        }
    }
}
