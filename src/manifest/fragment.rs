//! Fragment descriptors and file naming.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Digest;
use crate::config::{FRAGMENT_EXTENSION, HASH_PREFIX_LEN};
use crate::error::FragError;

/// One emitted fragment: its digest and its file name next to the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentDescriptor {
    /// Digest of exactly this fragment's bytes.
    pub hash: Digest,

    /// File name, relative to the fragment directory.
    pub filename: String,
}

impl FragmentDescriptor {
    /// Creates a descriptor for the fragment at `ordinal` with the given digest,
    /// naming it with [`fragment_filename`].
    pub fn new(ordinal: usize, hash: Digest) -> Self {
        Self {
            hash,
            filename: fragment_filename(ordinal, &hash),
        }
    }

    /// Checks that `filename` is a bare file name that cannot escape the
    /// fragment directory.
    pub(crate) fn validate(&self) -> Result<(), FragError> {
        let name = self.filename.as_str();
        let bad = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0');
        if bad {
            return Err(FragError::Manifest(format!(
                "fragment filename '{name}' is not a plain file name"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FragmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.filename, self.hash)
    }
}

/// Builds the on-disk name `<ordinal>-<hash prefix>.frag`.
pub fn fragment_filename(ordinal: usize, hash: &Digest) -> String {
    format!(
        "{}-{}.{}",
        ordinal,
        hash.hex_prefix(HASH_PREFIX_LEN),
        FRAGMENT_EXTENSION
    )
}
