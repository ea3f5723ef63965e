//! Error types for fragrs.

use std::path::PathBuf;

use crate::manifest::Digest;

/// Errors that can occur while fragmenting, reassembling or verifying.
#[derive(Debug, thiserror::Error)]
pub enum FragError {
    /// An I/O error occurred while reading or writing stream data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error tied to a specific file on disk.
    #[error("io error at {}: {source}", .path.display())]
    IoAt {
        /// The file that could not be opened, written or renamed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be parsed or failed validation.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// The reassembled or checked stream does not match its recorded digest.
    ///
    /// Output already written is left in place.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch {
        /// The digest recorded in the manifest (or hash source).
        expected: Digest,
        /// The digest computed from the actual bytes.
        actual: Digest,
    },

    /// A fragment file's content does not match its descriptor.
    #[error("fragment {filename} is corrupt: expected {expected}, got {actual}")]
    FragmentCorrupt {
        /// Name of the offending fragment file.
        filename: String,
        /// The digest recorded in the manifest.
        expected: Digest,
        /// The digest of the bytes on disk.
        actual: Digest,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl FragError {
    /// Attaches a path to an I/O error.
    pub(crate) fn at(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| FragError::IoAt { path, source }
    }
}

impl From<serde_json::Error> for FragError {
    fn from(e: serde_json::Error) -> Self {
        FragError::Manifest(e.to_string())
    }
}
