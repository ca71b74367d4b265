use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nasdeploy::app::run::Task;

#[derive(Parser, Debug)]
#[command(
    name = "nasdeploy",
    version,
    about = "Clone, configure and run the easyNAS web app and file server"
)]
pub(crate) struct Args {
    /// JSON settings file [default: nasdeploy.json, if present]
    #[arg(long, global = true)]
    pub(crate) settings: Option<PathBuf>,

    /// Overrides the settings file's log level
    #[arg(long, global = true)]
    pub(crate) log_level: Option<String>,

    #[arg(long, global = true, default_value_t = false)]
    pub(crate) log_json: bool,

    /// Answer every confirmation with yes
    #[arg(long, short = 'y', global = true, default_value_t = false)]
    pub(crate) yes: bool,

    /// Shared storage path for the file server, skips the prompt
    #[arg(long, global = true)]
    pub(crate) files_directory: Option<String>,

    /// Never read from stdin
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) non_interactive: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Clone both apps, generate configs, start the file server, then the web app
    BuildApp,
    /// Fresh checkout and virtualenv
    Clone {
        #[arg(default_value = "all")]
        app: String,
    },
    /// Generate shared credentials and endpoint settings
    BuildConfigs,
    /// Start an application under gunicorn
    Deploy { app: String },
    /// Kill a running application through its pid file
    Kill {
        #[arg(default_value = "all")]
        app: String,
    },
    /// Show recorded pids and whether they are running
    Status {
        #[arg(default_value = "all")]
        app: String,
    },
    /// Print build information as JSON
    Version,
}

impl Command {
    /// The orchestrator task, `None` for commands handled by the binary itself
    pub(crate) fn task(self) -> Option<Task> {
        match self {
            Command::BuildApp => Some(Task::BuildApp),
            Command::Clone { app } => Some(Task::Clone(app)),
            Command::BuildConfigs => Some(Task::BuildConfigs),
            Command::Deploy { app } => Some(Task::Deploy(app)),
            Command::Kill { app } => Some(Task::Kill(app)),
            Command::Status { app } => Some(Task::Status(app)),
            Command::Version => None,
        }
    }
}
