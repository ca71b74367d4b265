//! Storage layout of the target host

use std::path::{Path, PathBuf};

use crate::errors::DeployError;
use crate::filesys::dir::Dir;
use crate::models::app::AppKind;

/// Sibling install directories under one base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    /// Base directory for both applications
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Layout for the configured base directory, or the parent of the
    /// current working directory when none is configured
    pub fn resolve(base_dir: Option<&Path>) -> Result<Self, DeployError> {
        let cwd = std::env::current_dir()?;
        Ok(match base_dir {
            Some(dir) => Self::anchored(dir, &cwd),
            None => Self::new(cwd.parent().map(PathBuf::from).unwrap_or(cwd)),
        })
    }

    /// Layout with a relative `base_dir` taken from `cwd`.
    ///
    /// Symlink targets, activation scripts and pid files are all handed to
    /// commands running inside the install directories, so every path in the
    /// layout must be absolute.
    pub fn anchored(base_dir: impl AsRef<Path>, cwd: &Path) -> Self {
        Self::new(cwd.join(base_dir))
    }

    /// Install directory of an application
    pub fn app_dir(&self, kind: AppKind) -> Dir {
        Dir::new(self.base_dir.join(kind.name()))
    }

    /// Web application install directory
    pub fn web_app_dir(&self) -> Dir {
        self.app_dir(AppKind::WebApp)
    }

    /// File server install directory
    pub fn file_server_dir(&self) -> Dir {
        self.app_dir(AppKind::FileServer)
    }
}
