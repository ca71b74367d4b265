//! Shell command execution on the target host

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::DeployError;
use crate::utils::shell_quote;

/// A command line plus the context it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Command line passed to the shell
    pub line: String,

    /// Working directory
    pub cwd: Option<PathBuf>,

    /// Activation script sourced before `line`
    pub activate: Option<PathBuf>,

    /// Extra environment variables
    pub env: Vec<(String, String)>,

    /// Inherit the operator's terminal instead of running detached from stdin
    pub interactive: bool,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            cwd: None,
            activate: None,
            env: Vec::new(),
            interactive: false,
        }
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run inside the environment set up by `script`
    pub fn activated(mut self, script: impl AsRef<Path>) -> Self {
        self.activate = Some(script.as_ref().to_path_buf());
        self
    }

    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.env.extend(vars.iter().cloned());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// The full script handed to bash, activation prefix included
    pub fn script(&self) -> String {
        match &self.activate {
            Some(script) => format!(
                ". {} && {}",
                shell_quote(&script.to_string_lossy()),
                self.line
            ),
            None => self.line.clone(),
        }
    }
}

/// Executes commands one at a time, failing on a non-zero exit status
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ShellCommand) -> Result<(), DeployError>;
}

/// Runs commands locally through `bash -c`, or `sh -c` where bash is missing
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
}

impl ShellRunner {
    pub fn new() -> Self {
        let shell = if Path::new("/bin/bash").exists() {
            "/bin/bash"
        } else {
            "/bin/sh"
        };
        Self::with_shell(shell)
    }

    /// Run through a specific POSIX shell
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &ShellCommand) -> Result<(), DeployError> {
        let script = command.script();
        info!("Running: {}", command.line);
        debug!("Full script: {} (cwd: {:?})", script, command.cwd);

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(&script);
        if let Some(cwd) = &command.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if !command.interactive {
            cmd.stdin(Stdio::null());
        }

        let status = cmd.status().await.map_err(|source| DeployError::Spawn {
            command: command.line.clone(),
            source,
        })?;

        if !status.success() {
            return Err(DeployError::CommandFailed {
                command: command.line.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }
}
