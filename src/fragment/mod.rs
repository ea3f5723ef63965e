//! Fragmentation of byte streams into fragment files.
//!
//! - [`Fragmenter`] - Stateful writer with `fragment()`, `push()`, `finish()`
//! - [`fragment`] - One-call fragmentation of a reader
//! - [`fragment_to_dir`] - Fragmentation plus saving the manifest alongside

mod writer;

use std::io::Read;
use std::path::{Path, PathBuf};

pub use writer::Fragmenter;

use crate::config::FragmentConfig;
use crate::error::FragError;
use crate::manifest::Manifest;

/// Splits `reader` into fragments of at most `chunk_size` bytes inside `dir`.
pub fn fragment<R: Read>(
    reader: R,
    dir: impl AsRef<Path>,
    chunk_size: u64,
) -> Result<Manifest, FragError> {
    Fragmenter::new(dir, FragmentConfig::new(chunk_size)?)?.fragment(reader)
}

/// Splits `reader` into `dir` and saves the manifest there as `manifest_name`.
///
/// Returns the manifest and the path it was saved to.
pub fn fragment_to_dir<R: Read>(
    reader: R,
    dir: impl AsRef<Path>,
    config: FragmentConfig,
    manifest_name: &str,
) -> Result<(Manifest, PathBuf), FragError> {
    let dir = dir.as_ref();
    let manifest = Fragmenter::new(dir, config)?.fragment(reader)?;
    let path = dir.join(manifest_name);
    manifest.save(&path)?;
    Ok((manifest, path))
}
