use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "patch-review",
    about = "Apply unified diffs wholesale or hunk by hunk"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a patch to its target files non-interactively.
    Apply(ApplyArgs),
    /// Review a patch hunk by hunk in the interactive TUI.
    Review(ReviewArgs),
    /// Print a summary of a patch without touching any files.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the unified-diff file.
    pub patch: PathBuf,

    /// Directory the patch's file paths are resolved against.
    /// Defaults to the current directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Apply only these 1-based hunk numbers (e.g. "1,3-5"), per file.
    #[arg(long)]
    pub hunks: Option<String>,

    /// Print the patched content to stdout instead of writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Path to the unified-diff file.
    pub patch: PathBuf,

    /// Directory the patch's file paths are resolved against.
    /// Defaults to the current directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Review only this file from the patch.
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the unified-diff file.
    pub patch: PathBuf,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse a hunk selection like "1,3-5" into 0-based indices.
pub fn parse_hunk_selection(expr: &str) -> Result<HashSet<usize>> {
    let mut selected = HashSet::new();

    for part in expr.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((lo, hi)) = part.split_once('-') {
            let lo: usize = parse_hunk_number(lo)?;
            let hi: usize = parse_hunk_number(hi)?;
            if lo > hi {
                bail!("Invalid hunk range '{}': start is after end", part);
            }
            selected.extend(lo - 1..hi);
        } else {
            selected.insert(parse_hunk_number(part)? - 1);
        }
    }

    if selected.is_empty() {
        bail!("Empty hunk selection '{}'", expr);
    }
    Ok(selected)
}

fn parse_hunk_number(s: &str) -> Result<usize> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid hunk number '{}'", s))?;
    if n == 0 {
        bail!("Hunk numbers are 1-based");
    }
    Ok(n)
}
