//! Interactive hunk-by-hunk review against a live document.
//!
//! A [`ReviewSession`] owns one [`FileDiff`] and one document editor. Hunks
//! move from `Pending` to `Applied` or `Skipped`, never back, and the
//! session tracks the net line shift each applied hunk actually caused so
//! that every remaining hunk's position in the partially-patched document
//! can be derived without re-diffing.

use crate::editor::{DocumentEditor, EditorError};
use crate::model::FileDiff;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no hunk at index {0}")]
    InvalidHunkIndex(usize),
    #[error("hunk {index} is already {state:?}")]
    HunkNotPending { index: usize, state: HunkState },
    #[error("review session is finished")]
    Finished,
    #[error("editor rejected the edit for hunk {index}: {source}")]
    EditRejected {
        index: usize,
        #[source]
        source: EditorError,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Review status of a single hunk. `Applied` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkState {
    Pending,
    Applied,
    Skipped,
}

impl HunkState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, HunkState::Pending)
    }
}

/// Review progress summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewProgress {
    pub total: usize,
    pub applied: usize,
    pub skipped: usize,
    pub pending: usize,
}

/// Per-hunk net line deltas and the prefix-sum arithmetic over them.
///
/// A delta is recorded only when its hunk is applied; unrecorded hunks
/// (pending or skipped) contribute nothing. Because hunks are
/// non-overlapping and ordered, only predecessors *by index* can move a
/// hunk's region, so the shift is a sum by index regardless of the order
/// hunks were actually applied in.
#[derive(Debug, Clone)]
pub struct OffsetTracker {
    deltas: Vec<Option<i64>>,
}

impl OffsetTracker {
    pub fn new(len: usize) -> Self {
        Self {
            deltas: vec![None; len],
        }
    }

    /// Record the measured net line delta for one hunk.
    pub fn record(&mut self, index: usize, delta: i64) {
        self.deltas[index] = Some(delta);
    }

    pub fn delta(&self, index: usize) -> Option<i64> {
        self.deltas.get(index).copied().flatten()
    }

    /// Sum of all recorded deltas strictly before `index`.
    pub fn shift_before(&self, index: usize) -> i64 {
        let end = index.min(self.deltas.len());
        self.deltas[..end].iter().flatten().sum()
    }
}

/// The review state for one open diff against one live document.
///
/// The session is an ordinary owned value: create it to start a review,
/// drop it (or call [`discard_all`](Self::discard_all)) to stop. Keeping at
/// most one session per document is the caller's responsibility.
pub struct ReviewSession<E: DocumentEditor> {
    diff: FileDiff,
    editor: E,
    states: Vec<HunkState>,
    offsets: OffsetTracker,
    active: Option<usize>,
    finished: bool,
}

impl<E: DocumentEditor> ReviewSession<E> {
    /// Start a review of `diff` against the document behind `editor`.
    /// Every hunk starts `Pending`; nothing is previewed until
    /// [`preview_hunk`](Self::preview_hunk).
    pub fn new(diff: FileDiff, editor: E) -> Self {
        let count = diff.hunks.len();
        Self {
            offsets: OffsetTracker::new(count),
            states: vec![HunkState::Pending; count],
            finished: count == 0,
            active: None,
            diff,
            editor,
        }
    }

    pub fn diff(&self) -> &FileDiff {
        &self.diff
    }

    pub fn hunk_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, index: usize) -> Option<HunkState> {
        self.states.get(index).copied()
    }

    pub fn states(&self) -> &[HunkState] {
        &self.states
    }

    /// The hunk currently being previewed, if any.
    pub fn active_hunk(&self) -> Option<usize> {
        self.active
    }

    /// Measured net line delta of an applied hunk; `None` while pending or
    /// skipped.
    pub fn net_line_delta(&self, index: usize) -> Option<i64> {
        self.offsets.delta(index)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress(&self) -> ReviewProgress {
        let mut progress = ReviewProgress {
            total: self.states.len(),
            ..ReviewProgress::default()
        };
        for state in &self.states {
            match state {
                HunkState::Applied => progress.applied += 1,
                HunkState::Skipped => progress.skipped += 1,
                HunkState::Pending => progress.pending += 1,
            }
        }
        progress
    }

    pub fn document(&self) -> &E {
        &self.editor
    }

    /// Give the (possibly partially patched) document back to the caller.
    pub fn into_document(self) -> E {
        self.editor
    }

    /// Mark a pending hunk as the one being previewed. Presentation only;
    /// the document is untouched.
    pub fn preview_hunk(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        self.ensure_pending(index)?;
        self.active = Some(index);
        Ok(())
    }

    /// Where the hunk's old region currently sits in the live document,
    /// as a 0-based line: `old_start - 1` plus the measured shift from
    /// every applied predecessor. Skipped hunks shift nothing.
    pub fn adjusted_start_line(&self, index: usize) -> Result<usize> {
        let hunk = self
            .diff
            .hunks
            .get(index)
            .ok_or(SessionError::InvalidHunkIndex(index))?;
        let shifted = hunk.old_start as i64 - 1 + self.offsets.shift_before(index);
        Ok(shifted.max(0) as usize)
    }

    /// Apply one pending hunk to the live document as a single atomic edit.
    ///
    /// On success the hunk becomes `Applied` and its net line delta is
    /// recorded as measured from the document's reported line counts, not
    /// from the hunk's declared counts — a drifted document still keeps the
    /// offset arithmetic consistent with reality. On failure the hunk stays
    /// `Pending` and the session stays open so the caller can retry or skip.
    pub fn apply_hunk(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        self.ensure_pending(index)?;

        let start = self.adjusted_start_line(index)?;
        let hunk = &self.diff.hunks[index];
        let end = start + hunk.old_count as usize;
        let replacement: Vec<String> = hunk.replacement_lines().map(str::to_owned).collect();

        let before = self.editor.line_count();
        self.editor
            .replace_lines(start..end, &replacement)
            .map_err(|source| SessionError::EditRejected { index, source })?;
        let after = self.editor.line_count();

        self.states[index] = HunkState::Applied;
        self.offsets.record(index, after as i64 - before as i64);
        self.advance_active(index);
        Ok(())
    }

    /// Mark a hunk as skipped: its lines stay untouched and nothing
    /// downstream moves. Rejected for already-applied hunks.
    pub fn skip_hunk(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        let state = self
            .state(index)
            .ok_or(SessionError::InvalidHunkIndex(index))?;
        if state == HunkState::Applied {
            return Err(SessionError::HunkNotPending { index, state });
        }

        self.states[index] = HunkState::Skipped;
        self.advance_active(index);
        Ok(())
    }

    /// Apply every pending hunk in index order, halting at the first
    /// failure. The failing hunk and everything after it stay `Pending`
    /// and the session stays open for inspection and retry.
    pub fn apply_all_remaining(&mut self) -> Result<()> {
        self.ensure_open()?;
        for index in 0..self.states.len() {
            if self.states[index] == HunkState::Pending {
                self.apply_hunk(index)?;
            }
        }
        Ok(())
    }

    /// Stop reviewing. Pending hunks are left unapplied and applied hunks
    /// are not rolled back.
    pub fn discard_all(&mut self) {
        self.finished = true;
        self.active = None;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        Ok(())
    }

    fn ensure_pending(&self, index: usize) -> Result<()> {
        let state = self
            .state(index)
            .ok_or(SessionError::InvalidHunkIndex(index))?;
        if state != HunkState::Pending {
            return Err(SessionError::HunkNotPending { index, state });
        }
        Ok(())
    }

    /// Move the preview cursor to the next pending hunk after `from`,
    /// wrapping around; finish the session once every hunk is terminal.
    fn advance_active(&mut self, from: usize) {
        if self.states.iter().all(|s| s.is_terminal()) {
            self.finished = true;
            self.active = None;
            return;
        }
        let count = self.states.len();
        self.active = (1..=count)
            .map(|step| (from + step) % count)
            .find(|&i| self.states[i] == HunkState::Pending);
    }
}
