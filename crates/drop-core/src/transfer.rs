//! Remote copy via an external secure-copy program.
//!
//! The core never speaks the protocol itself; it builds a `host:path`
//! address and hands a local file to `scp`.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{DropError, TransferFailure};

/// Copies a local file to a remote `host:path` location.
pub trait Transfer {
    fn transfer(&self, local: &Path, remote_server: &str, remote_path: &str) -> Result<(), DropError>;
}

/// Join a remote directory and file name with exactly one `/`.
/// An empty directory leaves the name relative to the remote login directory.
pub fn remote_path(remote_dir: &str, file_name: &str) -> String {
    if remote_dir.is_empty() {
        file_name.to_string()
    } else if remote_dir.ends_with('/') {
        format!("{}{}", remote_dir, file_name)
    } else {
        format!("{}/{}", remote_dir, file_name)
    }
}

/// `server:path` address as understood by scp.
pub fn remote_address(remote_server: &str, remote_path: &str) -> String {
    format!("{}:{}", remote_server, remote_path)
}

/// Runs `scp -p -q <local> <server>:<path>`; `-p` keeps the staged mode.
#[derive(Debug, Clone)]
pub struct ScpTransfer {
    program: OsString,
}

impl Default for ScpTransfer {
    fn default() -> Self {
        Self {
            program: OsString::from("scp"),
        }
    }
}

impl ScpTransfer {
    /// Use a different scp-compatible program.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Transfer for ScpTransfer {
    fn transfer(&self, local: &Path, remote_server: &str, remote_path: &str) -> Result<(), DropError> {
        let destination = remote_address(remote_server, remote_path);
        tracing::info!("copying {} to {}", local.display(), destination);

        let status = Command::new(&self.program)
            .arg("-p")
            .arg("-q")
            .arg(local)
            .arg(&destination)
            .status()
            .map_err(|e| DropError::Transfer {
                destination: destination.clone(),
                reason: TransferFailure::Spawn(e),
            })?;

        if !status.success() {
            tracing::warn!("copy to {} failed: {}", destination, status);
            return Err(DropError::Transfer {
                destination,
                reason: TransferFailure::Exit(status),
            });
        }
        tracing::info!("copy to {} finished", destination);
        Ok(())
    }
}
