//! Manifest types and JSON serialization.
//!
//! - [`Manifest`] - Whole-stream digest plus ordered fragment list
//! - [`FragmentDescriptor`] - One fragment's digest and file name
//! - [`Digest`] - 32-byte BLAKE3 digest, hex on the wire
//!
//! A manifest is written once per fragmentation run as pretty-printed JSON:
//!
//! ```json
//! {
//!   "hash": "<64 hex chars>",
//!   "fragments": [
//!     { "hash": "<64 hex chars>", "filename": "0-<20 hex chars>.frag" }
//!   ]
//! }
//! ```

mod digest;
mod fragment;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FragError;
use crate::io::StagingFile;

pub use digest::Digest;
pub use fragment::{FragmentDescriptor, fragment_filename};

/// Index of the fragments produced from one source stream.
///
/// Fragment order is the concatenation order: reading the files in this
/// order reproduces the source, whose digest is [`Manifest::hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Digest of the entire original stream.
    pub hash: Digest,

    /// Fragments in reconstruction order.
    pub fragments: Vec<FragmentDescriptor>,
}

impl Manifest {
    /// Creates a manifest from its parts.
    pub fn new(hash: Digest, fragments: Vec<FragmentDescriptor>) -> Self {
        Self { hash, fragments }
    }

    /// Returns the number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if the source was empty.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Checks that every file name is plain and unique.
    pub fn validate(&self) -> Result<(), FragError> {
        let mut seen = HashSet::with_capacity(self.fragments.len());
        for desc in &self.fragments {
            desc.validate()?;
            if !seen.insert(desc.filename.as_str()) {
                return Err(FragError::Manifest(format!(
                    "duplicate fragment filename '{}'",
                    desc.filename
                )));
            }
        }
        Ok(())
    }

    /// Parses and validates a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, FragError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parses and validates a manifest from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FragError> {
        let manifest: Self = serde_json::from_reader(reader)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Serializes the manifest as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FragError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the manifest as pretty-printed JSON followed by a newline.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), FragError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a manifest from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FragError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(FragError::at(path))?;
        let manifest = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), fragments = manifest.len(), "loaded manifest");
        Ok(manifest)
    }

    /// Writes the manifest to `path`, staging it next to the target and
    /// renaming it into place once complete.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FragError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staging = StagingFile::create_in(dir)?;
        self.to_writer(&mut staging)?;
        staging.publish(path)?;

        debug!(path = %path.display(), fragments = self.len(), "saved manifest");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let a = Digest::from(blake3::hash(b"first"));
        let b = Digest::from(blake3::hash(b"second"));
        let whole = Digest::from(blake3::hash(b"firstsecond"));
        Manifest::new(
            whole,
            vec![FragmentDescriptor::new(0, a), FragmentDescriptor::new(1, b)],
        )
    }

    #[test]
    fn test_json_has_two_top_level_fields() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj["hash"].is_string());
        assert_eq!(obj["fragments"].as_array().unwrap().len(), 2);
        assert!(obj["fragments"][0]["filename"].as_str().unwrap().starts_with("0-"));
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let manifest = sample();
        let compact = serde_json::to_string(&manifest).unwrap();
        let spaced = compact.replace(',', " ,\n\t ").replace(':', " :  ");

        assert_eq!(Manifest::from_json(&compact).unwrap(), manifest);
        assert_eq!(Manifest::from_json(&spaced).unwrap(), manifest);
    }

    #[test]
    fn test_parse_accepts_upper_case_hex() {
        let manifest = sample();
        let json = manifest.to_json().unwrap().replace(
            &manifest.hash.to_hex(),
            &manifest.hash.to_hex().to_uppercase(),
        );
        assert_eq!(Manifest::from_json(&json).unwrap().hash, manifest.hash);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::new(Digest::from(blake3::hash(b"")), Vec::new());
        assert!(manifest.is_empty());
        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"fragments\": []"));
        assert_eq!(Manifest::from_json(&json).unwrap(), manifest);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Manifest::from_json("{\"hash\": "),
            Err(FragError::Manifest(_))
        ));
        assert!(matches!(
            Manifest::from_json("{\"fragments\": []}"),
            Err(FragError::Manifest(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let json = format!(
            "{{\"hash\": \"{}\", \"fragments\": [], \"extra\": 1}}",
            "0".repeat(64)
        );
        assert!(Manifest::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_duplicate_filenames() {
        let mut manifest = sample();
        manifest.fragments[1].filename = manifest.fragments[0].filename.clone();
        let json = manifest.to_json().unwrap();
        assert!(matches!(
            Manifest::from_json(&json),
            Err(FragError::Manifest(msg)) if msg.contains("duplicate")
        ));
    }

    #[test]
    fn test_rejects_traversal_filename() {
        let mut manifest = sample();
        manifest.fragments[0].filename = "../escape.frag".to_string();
        let json = manifest.to_json().unwrap();
        assert!(Manifest::from_json(&json).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = sample();

        manifest.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), manifest);

        // Only the published manifest remains
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("manifest.json")]);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}
