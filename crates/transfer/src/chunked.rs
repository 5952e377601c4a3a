use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::TransferError;
use crate::plan::ChunkDescriptor;

/// Reads planned chunks from an artifact on disk.
///
/// No file handle is kept between reads: every [`read_chunk`] call opens
/// the file, seeks to the chunk offset and reads exactly one chunk, so
/// peak memory is bounded by the chunk size.
///
/// [`read_chunk`]: ChunkReader::read_chunk
#[derive(Debug, Clone)]
pub struct ChunkReader {
    path: PathBuf,
}

impl ChunkReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the bytes described by `chunk`.
    ///
    /// Fails with [`TransferError::ShortRead`] if the file shrank since the
    /// plan was computed.
    pub fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Vec<u8>, TransferError> {
        let mut file = std::fs::File::open(&self.path)?;
        file.seek(SeekFrom::Start(chunk.offset))?;

        let mut buf = Vec::with_capacity(chunk.length as usize);
        let read = file.by_ref().take(chunk.length).read_to_end(&mut buf)? as u64;
        if read != chunk.length {
            return Err(TransferError::ShortRead {
                offset: chunk.offset,
                expected: chunk.length,
                actual: read,
            });
        }
        Ok(buf)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
