//! Value-level diff: line-by-line comparison of translation strings.
//!
//! Uses the `similar` crate (Myers diff algorithm) to produce structured
//! hunks with context lines.

use similar::{ChangeTag, TextDiff};
use tvc_types::{Change, DiffHunk, DiffLine, LineDiff};

/// Lines of context kept around each hunk.
const CONTEXT_LINES: usize = 3;

/// Compute a line-by-line diff between two values.
pub fn diff_values(old: &str, new: &str) -> LineDiff {
    let old_lines = old.lines().count();
    let new_lines = new.lines().count();

    if old == new {
        return LineDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        };
    }

    let text_diff = TextDiff::from_lines(old, new);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut hunk = DiffHunk {
            old_start: first.old_range().start + 1,
            old_count: 0,
            new_start: first.new_range().start + 1,
            new_count: 0,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        hunk.lines.push(DiffLine::Context(text));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    ChangeTag::Delete => {
                        hunk.lines.push(DiffLine::Removed(text));
                        hunk.old_count += 1;
                    }
                    ChangeTag::Insert => {
                        hunk.lines.push(DiffLine::Added(text));
                        hunk.new_count += 1;
                    }
                }
            }
        }

        hunks.push(hunk);
    }

    LineDiff {
        hunks,
        old_lines,
        new_lines,
    }
}

/// Attach a line diff to an `Add` or `Modify` change.
///
/// Deletions are returned untouched; an added value is diffed against the
/// empty string.
pub fn annotate(change: Change) -> Change {
    match &change.new_value {
        Some(new) => {
            let diff = diff_values(change.old_value.as_deref().unwrap_or(""), new);
            change.with_diff(diff)
        }
        None => change,
    }
}
