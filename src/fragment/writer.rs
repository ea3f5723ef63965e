//! Fragment writer - splits a stream into fixed-size fragment files.
//!
//! [`Fragmenter`] holds the chunk boundary state for one run: a countdown of
//! bytes left in the current fragment, a fragment-scoped hasher, a hasher over
//! the whole stream, and the staging file the current fragment is written to.
//!
//! Bytes arrive either from a reader ([`Fragmenter::fragment`]) or in
//! arbitrarily sized segments ([`Fragmenter::push`]). Either way a fragment is
//! published as soon as it reaches `chunk_size` bytes, and
//! [`Fragmenter::finish`] publishes the final short fragment and returns the
//! [`Manifest`].
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use fragrs::{Fragmenter, FragmentConfig};
//!
//! let source = File::open("disk.img")?;
//! let fragmenter = Fragmenter::new("shards/", FragmentConfig::new(4 * 1024 * 1024)?)?;
//! let manifest = fragmenter.fragment(source)?;
//! manifest.save("shards/manifest.json")?;
//! # Ok::<(), fragrs::FragError>(())
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info};

use crate::buffer::Buffer;
use crate::config::FragmentConfig;
use crate::error::FragError;
use crate::hash::StreamHasher;
use crate::io::StagingFile;
use crate::manifest::{FragmentDescriptor, Manifest};

/// Stateful fragment writer for one source stream.
///
/// Every fragment except possibly the last holds exactly `chunk_size` bytes;
/// no fragment is empty. Fragment files are named
/// `<ordinal>-<hash prefix>.frag` and only appear under that name once fully
/// written and synced.
#[derive(Debug)]
pub struct Fragmenter {
    dir: PathBuf,
    config: FragmentConfig,
    global: StreamHasher,
    current: StreamHasher,
    remaining: u64,
    staging: Option<StagingFile>,
    fragments: Vec<FragmentDescriptor>,
}

impl Fragmenter {
    /// Creates a fragmenter writing into `dir` and opens the first staging file.
    ///
    /// # Errors
    ///
    /// - [`FragError::InvalidConfig`] if the configuration is invalid
    /// - [`FragError::IoAt`] if `dir` is missing, not a directory, or not writable
    pub fn new(dir: impl AsRef<Path>, config: FragmentConfig) -> Result<Self, FragError> {
        config.validate()?;
        let dir = dir.as_ref().to_path_buf();

        let meta = std::fs::metadata(&dir).map_err(FragError::at(&dir))?;
        if !meta.is_dir() {
            return Err(FragError::IoAt {
                path: dir,
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let mut fragmenter = Self {
            dir,
            config,
            global: StreamHasher::new(),
            current: StreamHasher::new(),
            remaining: config.chunk_size(),
            staging: None,
            fragments: Vec::new(),
        };
        fragmenter.open_staging()?;
        Ok(fragmenter)
    }

    /// Reads `reader` to end of stream, writing fragments, and returns the manifest.
    ///
    /// Each read asks for at most the bytes left in the current fragment, so
    /// a single read never crosses a fragment boundary.
    pub fn fragment<R: Read>(mut self, mut reader: R) -> Result<Manifest, FragError> {
        let mut buf = Buffer::take(self.config.buffer_size());

        loop {
            let want = (buf.len() as u64).min(self.remaining) as usize;
            let n = match reader.read(&mut buf[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.write_slice(&buf[..n])?;
        }

        self.finish()
    }

    /// Feeds a segment of the stream.
    ///
    /// Segments may be any size; fragments are cut at `chunk_size`
    /// regardless of how the stream was split.
    pub fn push(&mut self, data: impl Into<Bytes>) -> Result<(), FragError> {
        let data = data.into();
        self.write_slice(&data)
    }

    /// Closes the last fragment and returns the manifest.
    ///
    /// A fragment with no bytes (empty source, or a source ending exactly on
    /// a chunk boundary) is discarded and not listed.
    pub fn finish(mut self) -> Result<Manifest, FragError> {
        self.close_fragment()?;

        let manifest = Manifest::new(self.global.finalize(), self.fragments);
        info!(
            dir = %self.dir.display(),
            bytes = self.global.len(),
            fragments = manifest.len(),
            hash = %manifest.hash,
            "fragmented stream"
        );
        Ok(manifest)
    }

    /// Returns the number of source bytes consumed so far.
    pub fn bytes_written(&self) -> u64 {
        self.global.len()
    }

    /// Returns the number of fragments published so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Returns the directory fragments are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the configuration used by this fragmenter.
    pub fn config(&self) -> &FragmentConfig {
        &self.config
    }

    fn write_slice(&mut self, mut data: &[u8]) -> Result<(), FragError> {
        while !data.is_empty() {
            let take = (data.len() as u64).min(self.remaining) as usize;
            let (head, tail) = data.split_at(take);

            self.global.update(head);
            self.current.update(head);
            self.staging()?.append(head)?;
            self.remaining -= take as u64;

            if self.remaining == 0 {
                self.close_fragment()?;
                self.open_staging()?;
            }
            data = tail;
        }
        Ok(())
    }

    /// Returns the current staging file, opening one if none is open.
    fn staging(&mut self) -> Result<&mut StagingFile, FragError> {
        match self.staging.take() {
            Some(staging) => Ok(self.staging.insert(staging)),
            None => self.open_staging(),
        }
    }

    fn open_staging(&mut self) -> Result<&mut StagingFile, FragError> {
        let staging = StagingFile::create_in(&self.dir)?;
        debug!(path = %staging.path().display(), "opened staging fragment");
        Ok(self.staging.insert(staging))
    }

    fn close_fragment(&mut self) -> Result<(), FragError> {
        let Some(staging) = self.staging.take() else {
            return Ok(());
        };

        if self.current.is_empty() {
            debug!(path = %staging.path().display(), "discarding empty staging fragment");
            staging.discard()?;
        } else {
            let ordinal = self.fragments.len();
            let desc = FragmentDescriptor::new(ordinal, self.current.finalize());
            let len = staging.publish(self.dir.join(&desc.filename))?;
            debug!(ordinal, len, filename = %desc.filename, hash = %desc.hash, "published fragment");
            self.fragments.push(desc);
        }

        self.current.reset();
        self.remaining = self.config.chunk_size();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_opens_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let fragmenter = Fragmenter::new(dir.path(), FragmentConfig::new(8).unwrap()).unwrap();
        let names = listing(dir.path());
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with(".fragrs-"));
        drop(fragmenter);
        assert!(listing(dir.path()).is_empty());
    }

    #[test]
    fn test_new_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(Fragmenter::new(&missing, FragmentConfig::default()).is_err());
    }

    #[test]
    fn test_new_rejects_file_as_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            Fragmenter::new(&file, FragmentConfig::default()),
            Err(FragError::IoAt { .. })
        ));
    }

    #[test]
    fn test_push_splits_across_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let mut fragmenter = Fragmenter::new(dir.path(), FragmentConfig::new(4).unwrap()).unwrap();

        fragmenter.push(&b"ab"[..]).unwrap();
        fragmenter.push(&b"cdefghi"[..]).unwrap();
        assert_eq!(fragmenter.fragment_count(), 2);
        assert_eq!(fragmenter.bytes_written(), 9);

        fragmenter.push(Bytes::new()).unwrap();
        let manifest = fragmenter.finish().unwrap();

        let contents: Vec<Vec<u8>> = manifest
            .fragments
            .iter()
            .map(|d| fs::read(dir.path().join(&d.filename)).unwrap())
            .collect();
        assert_eq!(contents, vec![b"abcd".to_vec(), b"efgh".to_vec(), b"i".to_vec()]);
        assert_eq!(manifest.hash, StreamHasher::digest(b"abcdefghi"));
    }

    #[test]
    fn test_exact_boundary_discards_trailing_staging() {
        let dir = tempfile::tempdir().unwrap();
        let fragmenter = Fragmenter::new(dir.path(), FragmentConfig::new(3).unwrap()).unwrap();
        let manifest = fragmenter.fragment(&b"abcdef"[..]).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            listing(dir.path()),
            manifest
                .fragments
                .iter()
                .map(|d| d.filename.clone())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_small_buffer_does_not_change_output() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 31 % 256) as u8).collect();

        let a = tempfile::tempdir().unwrap();
        let big = Fragmenter::new(a.path(), FragmentConfig::new(100).unwrap())
            .unwrap()
            .fragment(&data[..])
            .unwrap();

        let b = tempfile::tempdir().unwrap();
        let config = FragmentConfig::new(100).unwrap().with_buffer_size(7);
        let small = Fragmenter::new(b.path(), config)
            .unwrap()
            .fragment(&data[..])
            .unwrap();

        assert_eq!(big, small);
    }
}
