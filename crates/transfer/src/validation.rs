use std::path::{Path, PathBuf};

use crate::TransferError;

/// What is known about the artifact before any bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Absolute path of the artifact.
    pub path: PathBuf,
    /// Size in bytes at inspection time.
    pub size: u64,
    /// Base name sent as the multipart filename.
    pub file_name: String,
}

/// Checks that `path` names a readable, non-empty regular file.
///
/// Rejects:
/// - Missing or unreadable paths (`Io`)
/// - Directories (`NotAFile`)
/// - Zero-byte files (`EmptyArtifact`), which would produce an empty plan
pub fn inspect_artifact(path: &Path) -> Result<ArtifactInfo, TransferError> {
    let metadata = std::fs::metadata(path)?;

    if metadata.is_dir() {
        return Err(TransferError::NotAFile(path.display().to_string()));
    }

    if metadata.len() == 0 {
        return Err(TransferError::EmptyArtifact(path.display().to_string()));
    }

    // Unreadable files must fail before any network call.
    std::fs::File::open(path)?;

    let path = std::path::absolute(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ArtifactInfo {
        size: metadata.len(),
        path,
        file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn inspects_regular_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AreaActions.smod");
        std::fs::write(&path, vec![7u8; 1234]).unwrap();

        let info = inspect_artifact(&path).unwrap();
        assert_eq!(info.size, 1234);
        assert_eq!(info.file_name, "AreaActions.smod");
        assert!(info.path.is_absolute());
    }

    #[test]
    fn rejects_missing_file() {
        let result = inspect_artifact(Path::new("/nonexistent/path/mod.smod"));
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[test]
    fn rejects_directory() {
        let dir = TempDir::new().unwrap();
        let result = inspect_artifact(dir.path());
        assert!(matches!(result, Err(TransferError::NotAFile(_))));
    }

    #[test]
    fn rejects_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.smod");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            inspect_artifact(&path),
            Err(TransferError::EmptyArtifact(_))
        ));
    }
}
