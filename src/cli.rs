//! Command-line surface: argument parsing and input resolution.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Parser;

use crate::core::emit::backend::Target;

/// Polymorphic string obfuscator.
#[derive(Parser, Debug)]
#[command(name = "strobf", version, about)]
pub struct Args {
    /// Target language for the emitted decoder snippet.
    #[arg(long, value_enum)]
    pub target: Target,

    /// Minimum number of transforms in a generated chain.
    #[arg(long, default_value_t = 8)]
    pub min_ops: usize,

    /// Maximum number of transforms in a generated chain.
    #[arg(long, default_value_t = 10)]
    pub max_ops: usize,

    /// Bit width every intermediate value is kept inside.
    #[arg(long, default_value_t = 16)]
    pub max_bits: u32,

    /// Plaintext given directly on the command line.
    #[arg(long, group = "source")]
    pub input: Option<String>,

    /// Plaintext read from a file.
    #[arg(long, group = "source")]
    pub file: Option<String>,

    /// Plaintext read from standard input.
    #[arg(long, group = "source")]
    pub stdin: bool,

    /// Seeds the RNG for reproducible output; omit for a fresh chain every run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enables debug-level tracing of chain sampling and retries.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_validated() -> Result<Self> {
        let args = Args::parse();
        let source_count =
            args.input.is_some() as u8 + args.file.is_some() as u8 + args.stdin as u8;
        anyhow::ensure!(
            source_count == 1,
            "exactly one of --input, --file, --stdin must be given"
        );
        Ok(args)
    }
}

/// Resolves the configured input source to plaintext.
///
/// `--input` additionally treats its argument as a path when it names an
/// existing file on disk — a convenience confined to this CLI layer, not a
/// semantic of [`crate::core::engine::Engine::transform`] itself.
pub fn resolve_input(args: &Args) -> Result<String> {
    if let Some(input) = &args.input {
        if Path::new(input).is_file() {
            return fs::read_to_string(input).with_context(|| format!("reading {input}"));
        }
        return Ok(input.clone());
    }
    if let Some(file) = &args.file {
        return fs::read_to_string(file).with_context(|| format!("reading {file}"));
    }
    if args.stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    unreachable!("parse_validated guarantees exactly one source is set")
}
