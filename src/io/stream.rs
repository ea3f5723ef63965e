//! Opening byte streams by name, with `-` meaning stdin or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::error::FragError;

/// The name that selects standard input or standard output.
pub const STDIO_SENTINEL: &str = "-";

/// Returns true if `name` selects stdin or stdout.
pub fn is_stdio(name: &str) -> bool {
    name == STDIO_SENTINEL
}

/// Opens `name` for reading, or stdin for `-`.
pub fn open_input(name: &str) -> Result<Box<dyn Read>, FragError> {
    if is_stdio(name) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(name).map_err(FragError::at(Path::new(name)))?;
    Ok(Box::new(file))
}

/// Creates or truncates `name` for writing, or returns stdout for `-`.
///
/// The returned writer is buffered; callers must flush it.
pub fn open_output(name: &str) -> Result<Box<dyn Write>, FragError> {
    if is_stdio(name) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let file = File::create(name).map_err(FragError::at(Path::new(name)))?;
    Ok(Box::new(BufWriter::new(file)))
}
