//! Pure whole-buffer patch application. No session, no editor: text in,
//! text out.

use crate::model::Hunk;
use std::collections::HashSet;

/// Apply every hunk to `original` and return the patched text.
///
/// Hunks are spliced from the last to the first, so that mutating the
/// buffer for one hunk never moves the lines any remaining hunk targets —
/// all remaining work is strictly earlier in the buffer. Positioning reads
/// `new_start`, not `old_start`; keep it that way. The interactive path
/// reaches the same splice points through its measured-offset arithmetic,
/// and the two must stay in agreement.
///
/// A final trailing newline is preserved iff the original had one.
pub fn apply_all(original: &str, hunks: &[Hunk]) -> String {
    let mut lines: Vec<&str> = original.lines().collect();

    for hunk in hunks.iter().rev() {
        let start = hunk.new_start.saturating_sub(1) as usize;
        splice(&mut lines, start, hunk.old_count as usize, hunk);
    }

    join_lines(&lines, original.ends_with('\n'))
}

/// Apply only the hunks whose indices are in `selected`, positioning each
/// with its **pre-image** coordinates (`old_start`), last to first.
///
/// This variant is for selections made against the pristine buffer ("apply
/// these n hunks to unmodified content"). It must not be used on a buffer
/// that already has other hunks applied — pre-image coordinates are only
/// meaningful there.
pub fn apply_selected(original: &str, hunks: &[Hunk], selected: &HashSet<usize>) -> String {
    let mut lines: Vec<&str> = original.lines().collect();

    for (index, hunk) in hunks.iter().enumerate().rev() {
        if !selected.contains(&index) {
            continue;
        }
        let start = hunk.old_start.saturating_sub(1) as usize;
        splice(&mut lines, start, hunk.old_count as usize, hunk);
    }

    join_lines(&lines, original.ends_with('\n'))
}

/// Replace `removed` lines at `start` with the hunk's replacement lines.
/// Indices are clamped to the buffer: a stale hunk yields wrong output,
/// never a panic.
fn splice<'a>(lines: &mut Vec<&'a str>, start: usize, removed: usize, hunk: &'a Hunk) {
    let start = start.min(lines.len());
    let end = (start + removed).min(lines.len());
    lines.splice(start..end, hunk.replacement_lines());
}

fn join_lines(lines: &[&str], trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline && !lines.is_empty() {
        out.push('\n');
    }
    out
}
