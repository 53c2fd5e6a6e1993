use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when constructing diff model values.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("hunk declares {declared} old lines but contains {counted}")]
    OldCountMismatch { declared: u32, counted: u32 },
    #[error("hunk declares {declared} new lines but contains {counted}")]
    NewCountMismatch { declared: u32, counted: u32 },
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// What a single line inside a hunk does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Context,
    Insert,
    Delete,
}

/// One line of a hunk. `text` carries the line content without the
/// leading diff marker character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub text: String,
}

impl Change {
    pub fn new(kind: ChangeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A contiguous edit region of a unified diff.
///
/// `old_start`/`new_start` are 1-based lines in the pre- and post-image.
/// For a zero-length range the diff header names the line *before* the
/// region; the parser normalizes such starts to the line of the region
/// itself, so `start - 1` is always a valid 0-based splice index.
///
/// Hunks within a file are ordered by ascending `old_start` and assumed
/// non-overlapping in the pre-image. Neither property is validated here;
/// a diff that breaks them produces wrong output, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    changes: Vec<Change>,
}

impl Hunk {
    /// Build a hunk, rejecting a change list that disagrees with the
    /// declared line counts.
    pub fn new(
        old_start: u32,
        old_count: u32,
        new_start: u32,
        new_count: u32,
        changes: Vec<Change>,
    ) -> Result<Self> {
        let counted_old = changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Context | ChangeKind::Delete))
            .count() as u32;
        let counted_new = changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Context | ChangeKind::Insert))
            .count() as u32;

        if counted_old != old_count {
            return Err(ModelError::OldCountMismatch {
                declared: old_count,
                counted: counted_old,
            });
        }
        if counted_new != new_count {
            return Err(ModelError::NewCountMismatch {
                declared: new_count,
                counted: counted_new,
            });
        }

        Ok(Self {
            old_start,
            old_count,
            new_start,
            new_count,
            changes,
        })
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The post-image of the hunk region: `Context` and `Insert` lines in
    /// order. Empty for a pure deletion.
    pub fn replacement_lines(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Context | ChangeKind::Insert))
            .map(|c| c.text.as_str())
    }

    /// Line-count shift this hunk claims to introduce. Display only — the
    /// review session measures the real shift from the live document.
    pub fn declared_delta(&self) -> i64 {
        self.new_count as i64 - self.old_count as i64
    }
}

/// Classification of a file-level diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDiffKind {
    Added,
    Deleted,
    Modified,
}

/// The full ordered set of hunks for one logical file.
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: PathBuf,
    pub kind: FileDiffKind,
    pub hunks: Vec<Hunk>,
}
