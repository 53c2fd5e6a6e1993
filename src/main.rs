use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use patch_review::cli::{self, ApplyArgs, Commands, ReviewArgs, ShowArgs};
use patch_review::editor::LineBuffer;
use patch_review::engine;
use patch_review::model::{ChangeKind, FileDiff, FileDiffKind};
use patch_review::parser::parse_diff;
use patch_review::session::ReviewSession;
use patch_review::tui::run_review;

fn main() -> Result<()> {
    let args = cli::parse_args();

    match args.command {
        Commands::Apply(args) => handle_apply(&args),
        Commands::Review(args) => handle_review(&args),
        Commands::Show(args) => handle_show(&args),
    }
}

/// Read and parse a patch file, requiring at least one reviewable hunk.
fn load_patch(path: &Path) -> Result<Vec<FileDiff>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read patch file {}", path.display()))?;
    let files = parse_diff(&text)
        .with_context(|| format!("Failed to parse patch file {}", path.display()))?;

    if files.is_empty() {
        bail!("No hunks found in {}", path.display());
    }
    Ok(files)
}

/// Resolve a patch-relative file path against the chosen root directory.
fn target_path(root: Option<&Path>, diff_path: &Path) -> PathBuf {
    match root {
        Some(root) => root.join(diff_path),
        None => diff_path.to_path_buf(),
    }
}

/// Load the target file's current content. An added file starts from an
/// empty buffer and must not already exist.
fn read_target(path: &Path, kind: FileDiffKind) -> Result<String> {
    if kind == FileDiffKind::Added {
        if path.exists() {
            bail!("{} already exists but the patch creates it", path.display());
        }
        return Ok(String::new());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write the patched content back. A deleted file whose content is now
/// empty is removed from disk.
fn write_target(path: &Path, kind: FileDiffKind, text: &str) -> Result<()> {
    if kind == FileDiffKind::Deleted && text.is_empty() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Handle the apply command - whole-file batch patching.
fn handle_apply(args: &ApplyArgs) -> Result<()> {
    let files = load_patch(&args.patch)?;
    let selection = args
        .hunks
        .as_deref()
        .map(cli::parse_hunk_selection)
        .transpose()?;

    for file in &files {
        let target = target_path(args.dir.as_deref(), &file.path);
        let original = read_target(&target, file.kind)?;

        let (patched, applied) = match &selection {
            Some(set) => {
                let applied = set.iter().filter(|&&i| i < file.hunks.len()).count();
                (engine::apply_selected(&original, &file.hunks, set), applied)
            }
            None => (engine::apply_all(&original, &file.hunks), file.hunks.len()),
        };

        if args.dry_run {
            println!("--- {} ---", target.display());
            print!("{}", patched);
            if !patched.ends_with('\n') {
                println!();
            }
        } else {
            write_target(&target, file.kind, &patched)?;
            println!(
                "✓ {}: applied {}/{} hunks",
                target.display(),
                applied,
                file.hunks.len()
            );
        }
    }

    Ok(())
}

/// Handle the review command - one interactive session per file, in order.
fn handle_review(args: &ReviewArgs) -> Result<()> {
    let mut files = load_patch(&args.patch)?;

    if let Some(only) = &args.path {
        files.retain(|f| f.path == *only);
        if files.is_empty() {
            bail!("Patch has no hunks for {}", only.display());
        }
    }

    for file in files {
        let target = target_path(args.dir.as_deref(), &file.path);
        let kind = file.kind;
        let original = read_target(&target, kind)?;

        let session = ReviewSession::new(file, LineBuffer::from_text(&original));
        let session = run_review(session)?;

        let progress = session.progress();
        // Stopping with pending hunks means the user quit mid-review;
        // applied hunks are still kept.
        let stopped_early = progress.pending > 0;

        if progress.applied > 0 {
            let text = session.into_document().to_text();
            write_target(&target, kind, &text)?;
            println!(
                "✓ {}: applied {}/{} hunks",
                target.display(),
                progress.applied,
                progress.total
            );
        } else {
            println!("○ {}: no hunks applied", target.display());
        }

        if stopped_early {
            println!("Review stopped");
            break;
        }
    }

    Ok(())
}

/// Handle the show command - print a per-file hunk summary.
fn handle_show(args: &ShowArgs) -> Result<()> {
    let files = load_patch(&args.patch)?;

    println!("Patch summary for {}", args.patch.display());
    println!("─────────────────────────────────────");

    for file in &files {
        let marker = match file.kind {
            FileDiffKind::Added => "A",
            FileDiffKind::Deleted => "D",
            FileDiffKind::Modified => "M",
        };
        println!("{} {} ({} hunks)", marker, file.path.display(), file.hunks.len());

        for (i, hunk) in file.hunks.iter().enumerate() {
            let inserts = hunk
                .changes()
                .iter()
                .filter(|c| c.kind == ChangeKind::Insert)
                .count();
            let deletes = hunk
                .changes()
                .iter()
                .filter(|c| c.kind == ChangeKind::Delete)
                .count();
            println!(
                "    #{} @@ -{},{} +{},{} @@  (+{}/-{})",
                i + 1,
                hunk.old_start,
                hunk.old_count,
                hunk.new_start,
                hunk.new_count,
                inserts,
                deletes
            );
        }
    }

    Ok(())
}
