//! Configuration for fragmentation runs.
//!
//! - [`FragmentConfig`] - Chunk size bound and I/O buffer size
//!
//! # Example
//!
//! ```
//! use fragrs::FragmentConfig;
//!
//! // 4 MiB fragments, read in 128 KiB slices
//! let config = FragmentConfig::new(4 * 1024 * 1024)?.with_buffer_size(128 * 1024);
//! assert_eq!(config.chunk_size(), 4 * 1024 * 1024);
//! # Ok::<(), fragrs::FragError>(())
//! ```

use crate::error::FragError;

/// Default maximum fragment size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Number of hex characters of the fragment digest embedded in its file name.
pub const HASH_PREFIX_LEN: usize = 20;

/// File extension of published fragment files.
pub const FRAGMENT_EXTENSION: &str = "frag";

/// File name the CLI uses for the manifest inside the fragment directory.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Configuration for a fragmentation run.
///
/// `chunk_size` is the maximum byte length of any fragment; every fragment
/// except possibly the last is exactly this long. `buffer_size` bounds how
/// much is read from the source per call and has no effect on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentConfig {
    chunk_size: u64,
    buffer_size: usize,
}

impl FragmentConfig {
    /// Creates a new configuration with the given chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`FragError::InvalidConfig`] if `chunk_size` is zero.
    pub fn new(chunk_size: u64) -> Result<Self, FragError> {
        Self::validated(chunk_size, DEFAULT_BUFFER_SIZE)
    }

    fn validated(chunk_size: u64, buffer_size: usize) -> Result<Self, FragError> {
        if chunk_size == 0 {
            return Err(FragError::InvalidConfig {
                message: "chunk size must be non-zero",
            });
        }

        if buffer_size == 0 {
            return Err(FragError::InvalidConfig {
                message: "buffer size must be non-zero",
            });
        }

        Ok(Self {
            chunk_size,
            buffer_size,
        })
    }

    /// Sets the chunk size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`FragmentConfig::validate`] to check it.
    pub fn with_chunk_size(mut self, size: u64) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the read buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Returns the maximum fragment size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Returns the read buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), FragError> {
        Self::validated(self.chunk_size, self.buffer_size).map(|_| ())
    }
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FragmentConfig::default();
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.buffer_size(), DEFAULT_BUFFER_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FragmentConfig::default()
            .with_chunk_size(4096)
            .with_buffer_size(512);
        assert_eq!(config.chunk_size(), 4096);
        assert_eq!(config.buffer_size(), 512);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            FragmentConfig::new(0),
            Err(FragError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_catches_builder_zeroes() {
        assert!(FragmentConfig::default().with_chunk_size(0).validate().is_err());
        assert!(FragmentConfig::default().with_buffer_size(0).validate().is_err());
    }

    #[test]
    fn test_chunk_size_one_is_valid() {
        let config = FragmentConfig::new(1).unwrap();
        assert_eq!(config.chunk_size(), 1);
    }
}
