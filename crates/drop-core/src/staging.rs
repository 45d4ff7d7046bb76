//! Stage upload bytes in a private temp file so permission bits can be set
//! before `scp -p` copies them.

use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::DropError;

/// A staged copy of the upload. The file is removed when this is dropped.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write `bytes` to a new temp file and apply `mode`.
pub fn stage(bytes: &[u8], mode: u32) -> Result<StagedFile, DropError> {
    let mut file = tempfile::Builder::new()
        .prefix("drop-")
        .tempfile()
        .map_err(DropError::Staging)?;
    file.write_all(bytes).map_err(DropError::Staging)?;
    file.flush().map_err(DropError::Staging)?;
    apply_mode(file.path(), mode)?;
    tracing::debug!(
        path = %file.path().display(),
        len = bytes.len(),
        mode = %format!("{:o}", mode),
        "staged upload"
    );
    Ok(StagedFile { file })
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<(), DropError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(DropError::Staging)
}

#[cfg(not(unix))]
fn apply_mode(path: &Path, mode: u32) -> Result<(), DropError> {
    tracing::debug!(
        "permission bits {:o} not applied to {} on this platform",
        mode,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_holds_bytes_and_is_removed_on_drop() {
        let staged = stage(b"payload", 0o644).unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(fs::read(&path).unwrap(), b"payload");
        drop(staged);
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn staged_file_carries_mode() {
        use std::os::unix::fs::PermissionsExt;
        let staged = stage(b"x", 0o640).unwrap();
        let mode = fs::metadata(staged.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o640);
    }
}
