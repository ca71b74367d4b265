//! nasdeploy - Entry Point
//!
//! Clones, configures and runs the easyNAS web app and its file server on the
//! local machine.

mod cli;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing::{debug, error};

use nasdeploy::app::options::DeployOptions;
use nasdeploy::app::run::run;
use nasdeploy::deploy::orchestrator::Orchestrator;
use nasdeploy::deploy::prompt::{PresetPrompter, Prompter, ScriptedPrompter, StdinPrompter};
use nasdeploy::deploy::runner::ShellRunner;
use nasdeploy::errors::DeployError;
use nasdeploy::filesys::file::File;
use nasdeploy::logs::{init_logging, LogLevel, LogOptions};
use nasdeploy::storage::layout::StorageLayout;
use nasdeploy::storage::settings::{Settings, DEFAULT_SETTINGS_FILE};
use nasdeploy::utils::version_info;

use crate::cli::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let Some(task) = args.command.task() else {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("{} {}", "[ERROR]".red().bold(), e),
        }
        return;
    };

    let loaded = match &args.settings {
        Some(path) => Settings::load(&File::new(path)).await,
        None => Settings::load_or_default(&File::new(DEFAULT_SETTINGS_FILE)).await,
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => exit_with(e),
    };

    let layout = match StorageLayout::resolve(settings.base_dir.as_deref()) {
        Ok(layout) => layout,
        Err(e) => exit_with(e),
    };

    let log_level = match args.log_level.as_deref().map(str::parse::<LogLevel>) {
        Some(Ok(level)) => level,
        Some(Err(e)) => exit_with(DeployError::ConfigError(e)),
        None => settings.log_level.clone(),
    };
    let log_options = LogOptions {
        log_level,
        log_file: settings.log_path(&layout.base_dir),
        json_format: args.log_json,
        ..Default::default()
    };
    // Held until exit so the file writer flushes
    let log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    debug!("Using base directory {:?}", layout.base_dir);

    let fallback: Arc<dyn Prompter> = if args.non_interactive {
        Arc::new(ScriptedPrompter::new(false))
    } else {
        Arc::new(StdinPrompter)
    };
    let prompter = PresetPrompter::new(fallback)
        .confirm_with(args.yes.then_some(true))
        .answer_with(args.files_directory.clone());

    let options = DeployOptions::new(layout, &settings);
    let orchestrator = Orchestrator::new(options, Arc::new(ShellRunner::new()), Arc::new(prompter));

    if let Err(e) = run(&orchestrator, task).await {
        error!("{}", e);
        drop(log_guard);
        exit_with(e);
    }
}

fn exit_with(err: DeployError) -> ! {
    eprintln!("{} {}", "[ERROR]".red().bold(), err);
    std::process::exit(err.exit_code());
}
