//! Reassembly and verification of fragmented streams.
//!
//! - [`Defragmenter`] - Copies fragments in manifest order and checks the digest
//! - [`defragment`] - Reassemble into any writer, hashing as it goes
//! - [`defragment_to_path`] - Reassemble into a file and verify by rereading it

mod reader;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub use reader::Defragmenter;

use crate::error::FragError;
use crate::manifest::Manifest;

/// Reassembles `manifest` from `dir` into `dest` and verifies the digest.
///
/// The digest is teed while writing, so `dest` may be a pipe or stdout.
pub fn defragment<W: Write>(
    manifest: &Manifest,
    dir: impl AsRef<Path>,
    dest: W,
) -> Result<(), FragError> {
    Defragmenter::new(manifest, dir).defragment(dest).map(|_| ())
}

/// Reassembles `manifest` from `dir` into a new file at `dest`.
///
/// The manifest is validated first; an invalid one leaves `dest` untouched.
/// The file is then created or truncated, written, read back in full to
/// verify the digest, and synced. On mismatch the file is kept as written.
pub fn defragment_to_path(
    manifest: &Manifest,
    dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<(), FragError> {
    manifest.validate()?;
    let dest = dest.as_ref();
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .map_err(FragError::at(dest))?;

    Defragmenter::new(manifest, dir).defragment_seekable(&mut file)?;
    file.sync_all().map_err(FragError::at(dest))?;
    Ok(())
}
