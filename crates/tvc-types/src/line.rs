//! Line-level diff representation attached to value changes.
//!
//! The types here only describe a diff; computing one lives in `tvc-diff`.

use serde::{Deserialize, Serialize};

/// The result of diffing two translation values line by line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old value.
    pub old_lines: usize,
    /// Total number of lines in the new value.
    pub new_lines: usize,
}

impl LineDiff {
    /// Returns `true` if the two values are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    /// Line number in the old value where this hunk starts (1-based).
    pub old_start: usize,
    /// Number of lines from the old value in this hunk.
    pub old_count: usize,
    /// Line number in the new value where this hunk starts (1-based).
    pub new_start: usize,
    /// Number of lines from the new value in this hunk.
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}
