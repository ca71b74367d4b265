//! Directory operations

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::DeployError;
use crate::filesys::file::File;

/// A directory wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the directory exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Create the directory (and parents)
    pub async fn create(&self) -> Result<(), DeployError> {
        fs::create_dir_all(&self.path).await?;
        Ok(())
    }

    /// Delete the directory and all contents
    pub async fn delete(&self) -> Result<(), DeployError> {
        if self.exists().await {
            fs::remove_dir_all(&self.path).await?;
        }
        Ok(())
    }

    /// Delete the directory if present, then create it empty
    pub async fn recreate(&self) -> Result<(), DeployError> {
        self.delete().await?;
        self.create().await
    }

    /// Names of the direct entries, sorted
    pub async fn entry_names(&self) -> Result<Vec<String>, DeployError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    /// Point `name` inside this directory at `target`, replacing any existing link
    pub async fn symlink(&self, name: &str, target: &Path) -> Result<File, DeployError> {
        let link = self.path.join(name);
        if fs::symlink_metadata(&link).await.is_ok() {
            fs::remove_file(&link).await?;
        }

        make_symlink(target, &link).await?;
        Ok(File::new(link))
    }

    /// Get a file within this directory
    pub fn file(&self, name: impl AsRef<Path>) -> File {
        File::new(self.path.join(name))
    }

    /// Get a subdirectory
    pub fn subdir(&self, name: impl AsRef<Path>) -> Dir {
        Dir::new(self.path.join(name))
    }
}

#[cfg(unix)]
async fn make_symlink(target: &Path, link: &Path) -> Result<(), DeployError> {
    fs::symlink(target, link).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn make_symlink(_target: &Path, _link: &Path) -> Result<(), DeployError> {
    Err(DeployError::Unsupported(
        "symlinks are only created on unix targets".to_string(),
    ))
}
