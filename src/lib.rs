//! fragrs
//!
//! Fixed-size fragmentation of byte streams with end-to-end digest checks.
//!
//! `fragrs` splits a byte stream into fragment files of at most `chunk_size`
//! bytes, each named after its BLAKE3 digest, and records them in a JSON
//! [`Manifest`] together with the digest of the whole stream. Reassembly
//! concatenates the fragments in manifest order and refuses to call the
//! result good unless its digest matches.
//!
//! The crate intentionally:
//! - does NOT deduplicate, compress or encrypt fragments
//! - does NOT chunk in parallel
//! - does NOT resume interrupted runs
//!
//! # Fragment
//!
//! ```no_run
//! use std::fs::File;
//! use fragrs::{FragError, FragmentConfig, Fragmenter};
//!
//! fn main() -> Result<(), FragError> {
//!     let source = File::open("backup.tar")?;
//!     let fragmenter = Fragmenter::new("out/", FragmentConfig::new(8 * 1024 * 1024)?)?;
//!     let manifest = fragmenter.fragment(source)?;
//!     manifest.save("out/manifest.json")?;
//!     println!("{} fragments, hash {}", manifest.len(), manifest.hash);
//!     Ok(())
//! }
//! ```
//!
//! # Reassemble
//!
//! ```no_run
//! use fragrs::{FragError, Manifest, defragment_to_path};
//!
//! fn main() -> Result<(), FragError> {
//!     let manifest = Manifest::load("out/manifest.json")?;
//!     defragment_to_path(&manifest, "out/", "restored.tar")?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod defragment;
mod error;
mod fragment;
mod hash;
mod manifest;

mod buffer; // internal (thread-local reuse)

pub mod io;

//
// Public surface
//

pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_MANIFEST_NAME, FRAGMENT_EXTENSION,
    FragmentConfig, HASH_PREFIX_LEN,
};
pub use defragment::{Defragmenter, defragment, defragment_to_path};
pub use error::FragError;
pub use fragment::{Fragmenter, fragment, fragment_to_dir};
pub use hash::{HashingReader, HashingWriter, StreamHasher, digest_reader, verify_reader};
pub use manifest::{Digest, FragmentDescriptor, Manifest, fragment_filename};
