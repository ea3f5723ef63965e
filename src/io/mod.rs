//! File and stream plumbing.
//!
//! - [`StagingFile`] - Write-then-rename publication of fragment and manifest files
//! - [`open_input`] / [`open_output`] - Open a path, or stdin/stdout for `-`

mod staging;
mod stream;

pub use staging::StagingFile;
pub use stream::{STDIO_SENTINEL, is_stdio, open_input, open_output};
