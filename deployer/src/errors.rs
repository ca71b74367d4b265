//! Error types for the deployment orchestrator

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for nasdeploy
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Invalid application selector '{0}' (expected one of: all, web_app, file_server)")]
    InvalidSelector(String),

    #[error("Command `{command}` failed with {}", exit_code_text(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process id file {path:?}: {reason}")]
    PidFile { path: PathBuf, reason: String },

    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Prompt error: {0}")]
    PromptError(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),

}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl DeployError {
    /// Process exit status the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::InvalidSelector(_) => 2,
            _ => 1,
        }
    }
}
