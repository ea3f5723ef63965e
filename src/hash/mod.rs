//! Streaming digests.
//!
//! - [`StreamHasher`] - Incremental BLAKE3 accumulator
//! - [`HashingReader`] / [`HashingWriter`] - Hash bytes as they pass through
//! - [`digest_reader`] / [`verify_reader`] - Whole-stream hash and check

mod blake3;
mod io;

pub use self::blake3::StreamHasher;
pub use self::io::{HashingReader, HashingWriter, digest_reader, verify_reader};
