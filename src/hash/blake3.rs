//! BLAKE3 stream hasher.

use crate::manifest::Digest;

/// Incremental BLAKE3 accumulator.
///
/// Feed it byte slices with [`update`](Self::update) in stream order; the
/// digest depends only on the concatenated bytes, never on how they were
/// split.
#[derive(Debug, Clone)]
pub struct StreamHasher {
    state: blake3::Hasher,
    len: u64,
}

impl StreamHasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            state: blake3::Hasher::new(),
            len: 0,
        }
    }

    /// Folds `data` into the accumulator.
    ///
    /// Pass only the bytes a read actually produced, never a whole buffer.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.len += data.len() as u64;
    }

    /// Returns the digest of everything fed so far.
    pub fn finalize(&self) -> Digest {
        Digest::from(self.state.finalize())
    }

    /// Resets the hasher to its initial state.
    pub fn reset(&mut self) {
        self.state.reset();
        self.len = 0;
    }

    /// Returns the number of bytes fed since creation or the last reset.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if nothing has been fed since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hashes `data` in one shot.
    pub fn digest(data: &[u8]) -> Digest {
        Digest::from(blake3::hash(data))
    }
}

impl Default for StreamHasher {
    fn default() -> Self {
        Self::new()
    }
}
