//! The document mutation boundary used by the interactive review path.

use std::ops::Range;
use thiserror::Error;

/// Errors a document editor can report for a rejected edit.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("line range {start}..{end} is outside the document ({len} lines)")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("edit rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, EditorError>;

/// A live document the review session can mutate, one line-range
/// replacement at a time.
///
/// Contract: `replace_lines` is atomic — it either fully applies or fails
/// leaving the document untouched — and on success a subsequent
/// `line_count()` reflects the edit exactly. The session's offset
/// arithmetic is built on measured post-edit counts, so an editor that
/// batches or defers edits cannot back this trait.
pub trait DocumentEditor {
    fn line_count(&self) -> usize;

    /// Replace the 0-based line range with the given lines. `range` may be
    /// empty (pure insertion at `range.start`); `replacement` may be empty
    /// (pure deletion).
    fn replace_lines(&mut self, range: Range<usize>, replacement: &[String]) -> Result<()>;
}

/// In-memory line buffer, the editor used by the CLI shell and tests.
///
/// Remembers whether the source text ended with a newline so that
/// `to_text` round-trips unchanged content byte for byte.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl LineBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
            trailing_newline: text.ends_with('\n'),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl DocumentEditor for LineBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn replace_lines(&mut self, range: Range<usize>, replacement: &[String]) -> Result<()> {
        if range.start > range.end || range.end > self.lines.len() {
            return Err(EditorError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.lines.len(),
            });
        }
        self.lines.splice(range, replacement.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn from_text_splits_lines_and_counts() {
        let buf = LineBuffer::from_text("a\nb\nc\n");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.lines(), &["a", "b", "c"]);
    }

    #[test]
    fn to_text_round_trips_with_and_without_trailing_newline() {
        for text in ["a\nb\nc\n", "a\nb\nc", ""] {
            assert_eq!(LineBuffer::from_text(text).to_text(), text);
        }
    }

    #[test]
    fn replace_lines_swaps_a_range() {
        let mut buf = LineBuffer::from_text("a\nb\nc\n");
        buf.replace_lines(1..2, &owned(&["B"])).unwrap();
        assert_eq!(buf.to_text(), "a\nB\nc\n");
    }

    #[test]
    fn replace_lines_inserts_at_empty_range() {
        let mut buf = LineBuffer::from_text("a\nc\n");
        buf.replace_lines(1..1, &owned(&["b"])).unwrap();
        assert_eq!(buf.to_text(), "a\nb\nc\n");
        assert_eq!(buf.line_count(), 3);
    }

    #[test]
    fn replace_lines_deletes_with_empty_replacement() {
        let mut buf = LineBuffer::from_text("a\nb\nc\n");
        buf.replace_lines(1..2, &[]).unwrap();
        assert_eq!(buf.to_text(), "a\nc\n");
    }

    #[test]
    fn replace_lines_at_end_appends() {
        let mut buf = LineBuffer::from_text("a\n");
        buf.replace_lines(1..1, &owned(&["b"])).unwrap();
        assert_eq!(buf.to_text(), "a\nb\n");
    }

    #[test]
    fn out_of_bounds_range_is_rejected_without_mutation() {
        let mut buf = LineBuffer::from_text("a\nb\n");
        let err = buf.replace_lines(1..5, &owned(&["x"])).unwrap_err();
        assert!(matches!(
            err,
            EditorError::RangeOutOfBounds {
                start: 1,
                end: 5,
                len: 2
            }
        ));
        assert_eq!(buf.to_text(), "a\nb\n");
    }

    #[test]
    fn empty_buffer_accepts_insertion_at_zero() {
        let mut buf = LineBuffer::from_text("");
        buf.replace_lines(0..0, &owned(&["first"])).unwrap();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.to_text(), "first");
    }
}
