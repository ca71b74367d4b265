//! Git checkout of application sources

use tracing::{debug, info};

use crate::deploy::runner::{CommandRunner, ShellCommand};
use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::utils::shell_quote;

/// Fresh clone of `repo_url` into `target_dir`.
///
/// Any existing directory is removed first so no file of a previous checkout
/// survives. There is no rollback: a failed clone leaves the directory behind.
pub async fn fresh_clone(
    runner: &dyn CommandRunner,
    repo_url: &str,
    target_dir: &Dir,
) -> Result<(), DeployError> {
    info!("Cloning {} into {:?}", repo_url, target_dir.path());

    if target_dir.exists().await {
        debug!("Removing existing checkout at {:?}", target_dir.path());
    }
    target_dir.recreate().await?;

    let line = format!(
        "git clone {} {}",
        shell_quote(repo_url),
        shell_quote(&target_dir.path().to_string_lossy())
    );
    runner.run(&ShellCommand::new(line)).await?;

    info!("Successfully cloned {}", repo_url);
    Ok(())
}
