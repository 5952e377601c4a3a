//! Splitting an artifact into upload parts and framing each part as a
//! GraphQL multipart request.

mod chunked;
mod multipart;
mod plan;
mod validation;

pub use chunked::ChunkReader;
pub use multipart::{EnvelopeBuilder, MultipartEnvelope, OCTET_STREAM};
pub use plan::{ChunkDescriptor, ChunkPlan, ChunkSize, plan};
pub use validation::{ArtifactInfo, inspect_artifact};

/// Smallest chunk size the API accepts: 1 MB.
pub const MIN_CHUNK_SIZE: u64 = 1_000_000;

/// Default chunk size: 10 MB.
pub const DEFAULT_CHUNK_SIZE: u64 = 10_000_000;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chunk size cannot be smaller than 1MB (got {0} bytes)")]
    ChunkSizeTooSmall(u64),

    #[error("file cannot be a directory: {0}")]
    NotAFile(String),

    #[error("file is empty: {0}")]
    EmptyArtifact(String),

    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },
}
