//! Hashing adapters for `Read` and `Write`, and the whole-stream utilities.

use std::io::{self, Read, Write};

use tracing::debug;

use super::StreamHasher;
use crate::buffer::Buffer;
use crate::config::DEFAULT_BUFFER_SIZE;
use crate::error::FragError;
use crate::manifest::Digest;

/// A reader that hashes every byte it returns.
///
/// Only the `n` bytes a read reports are folded in, so short reads hash
/// exactly what the caller sees.
#[derive(Debug)]
pub struct HashingReader<R> {
    inner: R,
    hasher: StreamHasher,
}

impl<R: Read> HashingReader<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: StreamHasher::new(),
        }
    }

    /// Returns the digest of everything read so far.
    pub fn digest(&self) -> Digest {
        self.hasher.finalize()
    }

    /// Returns the number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.hasher.len()
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// A writer that hashes every byte the inner writer accepts.
#[derive(Debug)]
pub struct HashingWriter<W> {
    inner: W,
    hasher: StreamHasher,
}

impl<W: Write> HashingWriter<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: StreamHasher::new(),
        }
    }

    /// Returns the digest of everything written so far.
    pub fn digest(&self) -> Digest {
        self.hasher.finalize()
    }

    /// Returns the number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.hasher.len()
    }

    /// Unwraps the inner writer and the hasher.
    pub fn into_parts(self) -> (W, StreamHasher) {
        (self.inner, self.hasher)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Hashes `reader` to end of stream.
pub fn digest_reader<R: Read>(reader: R) -> Result<Digest, FragError> {
    let mut reader = HashingReader::new(reader);
    let mut buf = Buffer::take(DEFAULT_BUFFER_SIZE);
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    let digest = reader.digest();
    debug!(bytes = reader.bytes_read(), hash = %digest, "hashed stream");
    Ok(digest)
}

/// Hashes `reader` and compares it against `expected`.
///
/// `expected` is hex text as produced by the `hash` utility; surrounding
/// whitespace is ignored and either case is accepted.
pub fn verify_reader<R: Read>(reader: R, expected: &str) -> Result<Digest, FragError> {
    let expected: Digest = expected.trim().parse()?;
    let actual = digest_reader(reader)?;
    if actual != expected {
        return Err(FragError::DigestMismatch { expected, actual });
    }
    Ok(actual)
}
