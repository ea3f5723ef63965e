//! Fragment reader - reassembles a stream from its manifest and verifies it.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::buffer::Buffer;
use crate::config::DEFAULT_BUFFER_SIZE;
use crate::error::FragError;
use crate::hash::{HashingWriter, digest_reader};
use crate::manifest::{Digest, Manifest};

/// Reassembles the fragments listed in a [`Manifest`].
///
/// The manifest is validated before anything is read or written, so a
/// descriptor naming a path outside `dir` is rejected even when the manifest
/// was built by hand. Fragments are copied strictly in manifest order. A
/// missing or unreadable fragment aborts the run. After copying, the digest of what was written is
/// compared against [`Manifest::hash`]; on mismatch the destination is left
/// as written and [`FragError::DigestMismatch`] is returned.
#[derive(Debug, Clone)]
pub struct Defragmenter<'a> {
    manifest: &'a Manifest,
    dir: PathBuf,
}

impl<'a> Defragmenter<'a> {
    /// Creates a reader for `manifest` whose fragments live in `dir`.
    pub fn new(manifest: &'a Manifest, dir: impl AsRef<Path>) -> Self {
        Self {
            manifest,
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Writes the reassembled stream to `dest`, hashing it on the way out.
    ///
    /// Works with sinks that cannot be read back, such as stdout. Returns
    /// the number of bytes written.
    pub fn defragment<W: Write>(&self, dest: W) -> Result<u64, FragError> {
        self.manifest.validate()?;
        let mut writer = HashingWriter::new(dest);
        let bytes = self.copy_fragments(&mut writer)?;
        writer.flush()?;
        self.verify(writer.digest(), bytes)?;
        Ok(bytes)
    }

    /// Writes the reassembled stream to `dest`, then rereads it to verify.
    ///
    /// The digest is computed from a second pass over the bytes starting at
    /// the position `dest` was at on entry, so it reflects what the medium
    /// actually holds. Returns the number of bytes written.
    pub fn defragment_seekable<W>(&self, dest: &mut W) -> Result<u64, FragError>
    where
        W: Read + Write + Seek,
    {
        self.manifest.validate()?;
        let start = dest.stream_position()?;
        let bytes = self.copy_fragments(dest)?;
        dest.flush()?;

        dest.seek(SeekFrom::Start(start))?;
        let actual = digest_reader(Read::by_ref(dest).take(bytes))?;
        self.verify(actual, bytes)?;
        Ok(bytes)
    }

    /// Checks every fragment file against its descriptor without writing anything.
    ///
    /// Stops at the first fragment whose content does not match.
    pub fn check_fragments(&self) -> Result<(), FragError> {
        self.manifest.validate()?;
        for desc in &self.manifest.fragments {
            let path = self.dir.join(&desc.filename);
            let file = File::open(&path).map_err(FragError::at(&path))?;
            let actual = digest_reader(file).map_err(|e| match e {
                FragError::Io(source) => FragError::IoAt {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;

            if actual != desc.hash {
                warn!(filename = %desc.filename, expected = %desc.hash, %actual, "fragment corrupt");
                return Err(FragError::FragmentCorrupt {
                    filename: desc.filename.clone(),
                    expected: desc.hash,
                    actual,
                });
            }
            debug!(filename = %desc.filename, "fragment ok");
        }
        Ok(())
    }

    /// Returns the directory fragments are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn copy_fragments<W: Write>(&self, dest: &mut W) -> Result<u64, FragError> {
        let mut buf = Buffer::take(DEFAULT_BUFFER_SIZE);
        let mut total = 0u64;

        for (ordinal, desc) in self.manifest.fragments.iter().enumerate() {
            let path = self.dir.join(&desc.filename);
            let mut file = File::open(&path).map_err(FragError::at(&path))?;
            let mut copied = 0u64;

            loop {
                let n = match file.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(FragError::IoAt { path, source: e }),
                };
                dest.write_all(&buf[..n])?;
                copied += n as u64;
            }

            debug!(ordinal, filename = %desc.filename, len = copied, "copied fragment");
            total += copied;
        }

        Ok(total)
    }

    fn verify(&self, actual: Digest, bytes: u64) -> Result<(), FragError> {
        let expected = self.manifest.hash;
        if actual != expected {
            warn!(%expected, %actual, bytes, "reassembled stream does not match manifest");
            return Err(FragError::DigestMismatch { expected, actual });
        }
        info!(
            fragments = self.manifest.len(),
            bytes,
            hash = %actual,
            "reassembled and verified stream"
        );
        Ok(())
    }
}
