use crate::{MIN_CHUNK_SIZE, TransferError};

/// A validated chunk size (at least [`MIN_CHUNK_SIZE`] bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkSize(u64);

impl ChunkSize {
    /// Validates a user supplied chunk size.
    pub fn new(bytes: u64) -> Result<Self, TransferError> {
        if bytes < MIN_CHUNK_SIZE {
            return Err(TransferError::ChunkSizeTooSmall(bytes));
        }
        Ok(Self(bytes))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(crate::DEFAULT_CHUNK_SIZE)
    }
}

/// One contiguous byte range of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// 0-based position in the plan.
    pub index: usize,
    /// 1-based part number sent to the server (`index + 1`).
    pub part_number: u32,
    /// Byte offset within the artifact.
    pub offset: u64,
    /// Number of bytes in this chunk.
    pub length: u64,
}

impl ChunkDescriptor {
    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Ordered, gap-free partition of `[0, total_size)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    chunks: Vec<ChunkDescriptor>,
    total_size: u64,
}

impl ChunkPlan {
    pub fn iter(&self) -> std::slice::Iter<'_, ChunkDescriptor> {
        self.chunks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ChunkDescriptor> {
        self.chunks.get(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Size of the artifact the plan covers.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

impl<'a> IntoIterator for &'a ChunkPlan {
    type Item = &'a ChunkDescriptor;
    type IntoIter = std::slice::Iter<'a, ChunkDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// Splits `total_size` bytes into `ceil(total_size / chunk_size)` chunks.
///
/// Every chunk is `chunk_size` bytes long except possibly the last one,
/// which holds the remainder. An empty artifact yields an empty plan.
pub fn plan(total_size: u64, chunk_size: ChunkSize) -> ChunkPlan {
    let size = chunk_size.get();
    let count = total_size.div_ceil(size) as usize;

    let chunks = (0..count)
        .map(|index| {
            let offset = index as u64 * size;
            ChunkDescriptor {
                index,
                part_number: (index + 1) as u32,
                offset,
                length: size.min(total_size - offset),
            }
        })
        .collect();

    ChunkPlan { chunks, total_size }
}
