//! Isolated Python environments

use tracing::info;

use crate::deploy::runner::{CommandRunner, ShellCommand};
use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::models::app::AppDescriptor;

/// Create `venv/` inside the install directory and point the `activate`
/// alias at its activation script
pub async fn provision(
    runner: &dyn CommandRunner,
    app: &AppDescriptor,
) -> Result<File, DeployError> {
    info!("Creating virtualenv for {}", app.kind.label());

    runner
        .run(&ShellCommand::new("virtualenv venv").current_dir(app.install_dir.path()))
        .await?;

    app.install_dir
        .symlink("activate", &app.activate_script())
        .await
}

/// A command run inside the application's environment
pub fn in_venv(app: &AppDescriptor, line: impl Into<String>) -> ShellCommand {
    ShellCommand::new(line)
        .current_dir(app.install_dir.path())
        .activated(app.activate_link().path())
        .envs(&app.env)
}
