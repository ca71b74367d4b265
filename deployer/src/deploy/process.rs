//! Process records of daemonized applications

use tracing::{debug, info};

use crate::errors::DeployError;
use crate::filesys::file::File;

/// Read the pid recorded in `pid_file`
pub async fn read_pid(pid_file: &File) -> Result<i32, DeployError> {
    let contents = pid_file
        .read_optional_string()
        .await?
        .ok_or_else(|| DeployError::PidFile {
            path: pid_file.path().to_path_buf(),
            reason: "file does not exist".to_string(),
        })?;

    let pid = contents
        .trim()
        .parse::<i32>()
        .map_err(|e| DeployError::PidFile {
            path: pid_file.path().to_path_buf(),
            reason: format!("invalid pid {:?}: {}", contents.trim(), e),
        })?;

    if pid <= 0 {
        // 0 and negatives would address process groups
        return Err(DeployError::PidFile {
            path: pid_file.path().to_path_buf(),
            reason: format!("refusing to signal pid {}", pid),
        });
    }
    Ok(pid)
}

/// Pid recorded in `pid_file`, if any, without failing on a missing or bad file
pub async fn recorded_pid(pid_file: &File) -> Option<i32> {
    match read_pid(pid_file).await {
        Ok(pid) => Some(pid),
        Err(e) => {
            debug!("No usable pid: {}", e);
            None
        }
    }
}

/// Send SIGKILL to `pid`
#[cfg(unix)]
pub fn force_kill(pid: i32) -> Result<(), DeployError> {
    info!("Killing process {}", pid);
    let rc = unsafe { libc::kill(pid, libc::SIGKILL) };
    if rc == 0 {
        Ok(())
    } else {
        Err(DeployError::Signal {
            pid,
            source: std::io::Error::last_os_error(),
        })
    }
}

#[cfg(not(unix))]
pub fn force_kill(pid: i32) -> Result<(), DeployError> {
    Err(DeployError::Unsupported(format!(
        "cannot signal process {} on this platform",
        pid
    )))
}

/// Whether a process with `pid` exists
#[cfg(unix)]
pub fn is_alive(pid: i32) -> bool {
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }
    // EPERM: the process exists but belongs to someone else
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub fn is_alive(_pid: i32) -> bool {
    false
}
