//! `fragrs` - split files into verified fragments and put them back together.
//!
//! # Usage
//!
//! ```text
//! fragrs fragment disk.img shards/ --chunk-size 4194304   # write shards/*.frag + shards/manifest.json
//! fragrs defragment shards/manifest.json disk.img          # reassemble and verify
//! fragrs defragment shards/manifest.json > disk.img        # same, through stdout
//! fragrs defragment shards/manifest.json --check-only      # verify fragments only
//! fragrs hash disk.img disk.img.b3                         # write the stream digest
//! fragrs verify disk.img disk.img.b3                       # compare against it
//! ```
//!
//! `-` as a source or destination means stdin or stdout. Logs go to stderr.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;

use fragrs::io::{STDIO_SENTINEL, is_stdio, open_input, open_output};
use fragrs::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_MANIFEST_NAME, Defragmenter, FragmentConfig,
    Manifest, defragment_to_path, digest_reader, fragment_to_dir, verify_reader,
};

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "fragrs",
    version,
    about = "Split a stream into content-hashed fragments and reassemble it with verification"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split SOURCE into fragment files inside DIR and write a manifest there.
    Fragment {
        /// File to split, or `-` for stdin.
        source: String,

        /// Existing directory to write fragments and the manifest into.
        dir: PathBuf,

        /// Maximum fragment size in bytes.
        #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: u64,

        /// Read buffer size in bytes.
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,

        /// Manifest file name inside DIR.
        #[arg(short, long, default_value = DEFAULT_MANIFEST_NAME)]
        manifest: String,
    },

    /// Reassemble the stream described by MANIFEST and verify its digest.
    Defragment {
        /// Manifest written by `fragrs fragment`.
        manifest: PathBuf,

        /// Destination file, or `-` for stdout.
        #[arg(default_value = STDIO_SENTINEL)]
        dest: String,

        /// Directory holding the fragments (defaults to the manifest's directory).
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Only check each fragment against its recorded digest.
        #[arg(long)]
        check_only: bool,
    },

    /// Write the hex digest of SOURCE to TARGET.
    Hash {
        /// Input, or `-` for stdin.
        source: String,

        /// Output, or `-` for stdout.
        #[arg(default_value = STDIO_SENTINEL)]
        target: String,
    },

    /// Check SOURCE against the hex digest stored in HASH_SOURCE.
    Verify {
        /// Input, or `-` for stdin.
        source: String,

        /// File holding the expected digest, or `-` for stdin.
        hash_source: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fragrs: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the `tracing` subscriber on stderr.
///
/// Respects `RUST_LOG` if set, otherwise derives the level from `-v`.
fn setup_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Fragment {
            source,
            dir,
            chunk_size,
            buffer_size,
            manifest,
        } => cmd_fragment(&source, &dir, chunk_size, buffer_size, &manifest),
        Commands::Defragment {
            manifest,
            dest,
            dir,
            check_only,
        } => cmd_defragment(&manifest, &dest, dir.as_deref(), check_only),
        Commands::Hash { source, target } => cmd_hash(&source, &target),
        Commands::Verify {
            source,
            hash_source,
        } => cmd_verify(&source, &hash_source),
    }
}

// -----------------------------------------------------------------------
// fragrs fragment
// -----------------------------------------------------------------------

fn cmd_fragment(
    source: &str,
    dir: &Path,
    chunk_size: u64,
    buffer_size: usize,
    manifest_name: &str,
) -> Result<()> {
    let config = FragmentConfig::new(chunk_size)?.with_buffer_size(buffer_size);
    config.validate()?;

    let reader = open_input(source)?;
    let (manifest, path) = fragment_to_dir(reader, dir, config, manifest_name)
        .with_context(|| format!("failed to fragment {source} into {}", dir.display()))?;

    debug!(fragments = manifest.len(), manifest = %path.display(), "fragment done");
    println!("{}", path.display());
    Ok(())
}

// -----------------------------------------------------------------------
// fragrs defragment
// -----------------------------------------------------------------------

fn cmd_defragment(
    manifest_path: &Path,
    dest: &str,
    dir: Option<&Path>,
    check_only: bool,
) -> Result<()> {
    // Parse before the destination is created or truncated.
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;

    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => manifest_dir(manifest_path),
    };

    if check_only {
        Defragmenter::new(&manifest, &dir).check_fragments()?;
        return Ok(());
    }

    if is_stdio(dest) {
        let out = open_output(dest)?;
        Defragmenter::new(&manifest, &dir).defragment(out)?;
    } else {
        defragment_to_path(&manifest, &dir, dest)
            .with_context(|| format!("failed to reassemble into {dest}"))?;
    }
    Ok(())
}

fn manifest_dir(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// -----------------------------------------------------------------------
// fragrs hash / verify
// -----------------------------------------------------------------------

fn cmd_hash(source: &str, target: &str) -> Result<()> {
    let digest = digest_reader(open_input(source)?)
        .with_context(|| format!("failed to hash {source}"))?;

    let mut out = open_output(target)?;
    writeln!(out, "{digest}").with_context(|| format!("failed to write {target}"))?;
    out.flush()?;
    Ok(())
}

fn cmd_verify(source: &str, hash_source: &str) -> Result<()> {
    let mut expected = String::new();
    open_input(hash_source)?
        .read_to_string(&mut expected)
        .with_context(|| format!("failed to read {hash_source}"))?;

    verify_reader(open_input(source)?, &expected)?;
    Ok(())
}
