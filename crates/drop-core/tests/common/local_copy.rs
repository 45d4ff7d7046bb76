//! Transfer double that "uploads" by copying into a local directory.

use drop_core::error::{DropError, TransferFailure};
use drop_core::transfer::{remote_address, Transfer};
use std::path::Path;

/// Copies the staged file to `remote_path` on the local filesystem, ignoring
/// the server. `corrupt` flips the first byte of the copy.
pub struct LocalCopy {
    pub corrupt: bool,
}

impl Transfer for LocalCopy {
    fn transfer(&self, local: &Path, remote_server: &str, remote_path: &str) -> Result<(), DropError> {
        let fail = |e| DropError::Transfer {
            destination: remote_address(remote_server, remote_path),
            reason: TransferFailure::Spawn(e),
        };
        std::fs::copy(local, remote_path).map_err(fail)?;
        if self.corrupt {
            let mut bytes = std::fs::read(remote_path).map_err(fail)?;
            if let Some(b) = bytes.first_mut() {
                *b ^= 0x20;
            }
            std::fs::write(remote_path, bytes).map_err(fail)?;
        }
        Ok(())
    }
}
