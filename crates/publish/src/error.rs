//! Publish error types.

use std::path::PathBuf;

use crate::registry::RegistryError;

/// Errors that end a publish session.
///
/// Review-state polling never fails the session: once the version is
/// finalized, poll failures are logged and reported as
/// [`ReviewOutcome::Unknown`](crate::ReviewOutcome::Unknown).
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Invalid request or settings. Raised before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The artifact is missing, a directory, empty or unreadable.
    #[error("file error for {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: modpub_transfer::TransferError,
    },

    /// Creating or finalizing the version failed.
    #[error("{step} failed: {source}")]
    Remote {
        step: &'static str,
        #[source]
        source: RegistryError,
    },

    /// Sending a chunk failed. The remote version is left partially uploaded.
    #[error("failed to upload part {part}: {source}")]
    Transport {
        part: u32,
        #[source]
        source: RegistryError,
    },

    /// Reading or framing a chunk failed after the upload had started.
    #[error("failed to prepare part {part}: {source}")]
    ChunkRead {
        part: u32,
        #[source]
        source: modpub_transfer::TransferError,
    },

    #[error("cancelled")]
    Cancelled,
}
