use crate::model::{Change, ChangeKind, FileDiff, FileDiffKind, Hunk, ModelError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing unified-diff text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed hunk header at line {line}: {header}")]
    MalformedHunkHeader { line: usize, header: String },
    #[error("hunk at line {line} disagrees with its header: {source}")]
    InvalidHunk {
        line: usize,
        #[source]
        source: ModelError,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse unified-diff text into structured `FileDiff` entries.
///
/// Accepts both `git diff` output (with `diff --git` file headers) and plain
/// unified diffs that start each file section at its `---`/`+++` pair. Each
/// change line is stripped of its marker character and tagged by kind.
/// Binary files are skipped. Files are classified added/deleted/modified via
/// the `/dev/null` sides of the header.
pub fn parse_diff(input: &str) -> Result<Vec<FileDiff>> {
    let mut files = Vec::new();
    let lines: Vec<&str> = input.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.starts_with("diff --git ") {
            i += 1;
            if let Some(file) = parse_file_section(&lines, &mut i)? {
                files.push(file);
            }
        } else if is_old_path_line(&lines, i) {
            if let Some(file) = parse_file_section(&lines, &mut i)? {
                files.push(file);
            }
        } else {
            i += 1;
        }
    }

    Ok(files)
}

/// A `---` line only opens a file section when a `+++` line follows it;
/// otherwise it is an ordinary deletion line inside some other context.
fn is_old_path_line(lines: &[&str], i: usize) -> bool {
    lines[i].starts_with("--- ") && lines.get(i + 1).is_some_and(|l| l.starts_with("+++ "))
}

/// Parse one file's header lines and hunks, starting just after a
/// `diff --git` line (or directly at a `---` line for plain diffs).
/// Returns `None` for binary files and header-only sections without hunks.
fn parse_file_section(lines: &[&str], i: &mut usize) -> Result<Option<FileDiff>> {
    let mut old_path: Option<&str> = None;
    let mut new_path: Option<&str> = None;

    // Scan extended header lines until the +++ line (or a binary marker).
    while *i < lines.len() {
        let current = lines[*i];

        if current.starts_with("Binary files ") {
            *i += 1;
            return Ok(None);
        }
        if current.starts_with("diff --git ") || current.starts_with("@@ ") {
            // Header ended without a +++ line; nothing reviewable here.
            break;
        }
        if current.starts_with("--- ") {
            old_path = current.strip_prefix("--- ");
            *i += 1;
            continue;
        }
        if current.starts_with("+++ ") {
            new_path = current.strip_prefix("+++ ");
            *i += 1;
            break;
        }

        *i += 1;
    }

    let (Some(old_path), Some(new_path)) = (old_path, new_path) else {
        return Ok(None);
    };

    let kind = if old_path == "/dev/null" {
        FileDiffKind::Added
    } else if new_path == "/dev/null" {
        FileDiffKind::Deleted
    } else {
        FileDiffKind::Modified
    };

    // Prefer the post-image path; fall back to the pre-image for deletions.
    let path_str = if new_path == "/dev/null" {
        old_path.strip_prefix("a/").unwrap_or(old_path)
    } else {
        new_path.strip_prefix("b/").unwrap_or(new_path)
    };
    let path = PathBuf::from(path_str);

    // Parse hunks for this file.
    let mut hunks = Vec::new();
    while *i < lines.len() {
        let current = lines[*i];

        if current.starts_with("diff --git ") || is_old_path_line(lines, *i) {
            break;
        }

        if current.starts_with("@@ ") {
            hunks.push(parse_hunk(lines, i)?);
        } else {
            *i += 1;
        }
    }

    if hunks.is_empty() {
        return Ok(None);
    }

    Ok(Some(FileDiff { path, kind, hunks }))
}

/// Parse a single hunk starting at the @@ line.
fn parse_hunk(lines: &[&str], i: &mut usize) -> Result<Hunk> {
    let header_line = *i + 1; // 1-based, for error messages
    let line = lines[*i];

    let malformed = || ParseError::MalformedHunkHeader {
        line: header_line,
        header: line.to_string(),
    };

    // Hunk header: @@ -old_start,old_count +new_start,new_count @@ [context]
    let header = line.strip_prefix("@@ ").ok_or_else(malformed)?;
    let header = match header.find(" @@") {
        Some(pos) => &header[..pos],
        None => return Err(malformed()),
    };
    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() < 2 {
        return Err(malformed());
    }

    let old_part = parts[0].strip_prefix('-').ok_or_else(malformed)?;
    let (old_start, old_count) = parse_range(old_part).ok_or_else(malformed)?;

    let new_part = parts[1].strip_prefix('+').ok_or_else(malformed)?;
    let (new_start, new_count) = parse_range(new_part).ok_or_else(malformed)?;

    // A zero-length range's header start names the line before the region;
    // normalize to the 1-based line of the region itself so `start - 1` is
    // always the splice index.
    let old_start = if old_count == 0 { old_start + 1 } else { old_start };
    let new_start = if new_count == 0 { new_start + 1 } else { new_start };

    // Collect the change lines, stopping once the declared counts are
    // satisfied so that a following file header is never read as content.
    let mut changes = Vec::new();
    let mut remaining_old = old_count;
    let mut remaining_new = new_count;
    *i += 1;

    while *i < lines.len() {
        let current = lines[*i];

        if current.starts_with('\\') {
            // "\ No newline at end of file" — metadata, not content.
            *i += 1;
            continue;
        }
        if remaining_old == 0 && remaining_new == 0 {
            break;
        }

        if let Some(text) = current.strip_prefix('+') {
            changes.push(Change::new(ChangeKind::Insert, text));
            remaining_new = remaining_new.saturating_sub(1);
        } else if let Some(text) = current.strip_prefix('-') {
            changes.push(Change::new(ChangeKind::Delete, text));
            remaining_old = remaining_old.saturating_sub(1);
        } else if let Some(text) = current.strip_prefix(' ') {
            changes.push(Change::new(ChangeKind::Context, text));
            remaining_old = remaining_old.saturating_sub(1);
            remaining_new = remaining_new.saturating_sub(1);
        } else if current.is_empty() {
            // Some tools emit a bare empty line for empty context lines.
            changes.push(Change::new(ChangeKind::Context, ""));
            remaining_old = remaining_old.saturating_sub(1);
            remaining_new = remaining_new.saturating_sub(1);
        } else {
            break;
        }
        *i += 1;
    }

    Hunk::new(old_start, old_count, new_start, new_count, changes).map_err(|source| {
        ParseError::InvalidHunk {
            line: header_line,
            source,
        }
    })
}

/// Parse a range like "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}
