//! Randomly named staging files published by rename.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, warn};

use crate::error::FragError;

/// Attempts at finding an unused staging name before giving up.
const CREATE_ATTEMPTS: usize = 8;

/// A file being written under a random temporary name.
///
/// Nothing under the final name exists until [`StagingFile::publish`]
/// renames the fully written, synced file into place. Dropping an
/// unpublished staging file removes it; a crash leaves it behind as
/// `.fragrs-<random>.tmp`.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    file: Option<File>,
    written: u64,
    armed: bool,
}

impl StagingFile {
    /// Creates a new staging file inside `dir`.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self, FragError> {
        let dir = dir.as_ref();
        let mut rng = rand::thread_rng();

        for _ in 0..CREATE_ATTEMPTS {
            let path = dir.join(format!(".fragrs-{:016x}.tmp", rng.r#gen::<u64>()));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Self {
                        path,
                        file: Some(file),
                        written: 0,
                        armed: true,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(FragError::IoAt { path, source: e }),
            }
        }

        Err(FragError::IoAt {
            path: dir.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "could not find an unused staging file name",
            ),
        })
    }

    /// Returns the temporary path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes all of `data`, naming this file in any error.
    pub fn append(&mut self, data: &[u8]) -> Result<(), FragError> {
        self.write_all(data).map_err(FragError::at(&self.path))
    }

    /// Flushes, syncs and renames the file to `dest`, returning its length.
    pub fn publish(mut self, dest: impl AsRef<Path>) -> Result<u64, FragError> {
        let dest = dest.as_ref();
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(FragError::at(&self.path))?;
            file.sync_all().map_err(FragError::at(&self.path))?;
        }

        fs::rename(&self.path, dest).map_err(FragError::at(dest))?;
        self.armed = false;
        Ok(self.written)
    }

    /// Closes and removes the file.
    pub fn discard(mut self) -> Result<(), FragError> {
        self.file.take();
        self.armed = false;
        fs::remove_file(&self.path).map_err(FragError::at(&self.path))
    }
}

impl Write for StagingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("staging file already closed"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.file.take();
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed unpublished staging file"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove staging file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_staging_name_is_hidden_temp() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingFile::create_in(dir.path()).unwrap();
        let name = staging.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".fragrs-"));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_two_staging_files_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let a = StagingFile::create_in(dir.path()).unwrap();
        let b = StagingFile::create_in(dir.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_publish_renames_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut staging = StagingFile::create_in(dir.path()).unwrap();
        staging.write_all(b"payload").unwrap();
        assert_eq!(staging.written(), 7);

        let dest = dir.path().join("0-abc.frag");
        assert_eq!(staging.publish(&dest).unwrap(), 7);

        assert_eq!(fs::read(&dest).unwrap(), b"payload");
        assert_eq!(entries(dir.path()), vec!["0-abc.frag".to_string()]);
    }

    #[test]
    fn test_append_error_names_staging_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut staging = StagingFile::create_in(dir.path()).unwrap();
        staging.append(b"ok").unwrap();
        assert_eq!(staging.written(), 2);

        staging.file.take();
        match staging.append(b"late").unwrap_err() {
            FragError::IoAt { path, .. } => assert_eq!(path, staging.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingFile::create_in(dir.path()).unwrap();
        staging.discard().unwrap();
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_drop_removes_unpublished_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut staging = StagingFile::create_in(dir.path()).unwrap();
            staging.write_all(b"partial").unwrap();
        }
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            StagingFile::create_in(&missing),
            Err(FragError::IoAt { .. })
        ));
    }
}
