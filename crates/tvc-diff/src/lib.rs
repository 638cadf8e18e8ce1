//! Diff engine for translation version control.
//!
//! Computes line-level diffs between translation values and change sets
//! between whole translation trees.
//!
//! # Key Types
//!
//! - [`diff_values`] -- Line-level value diff producing a [`tvc_types::LineDiff`]
//! - [`TreeDiff`] / [`diff_trees`] -- Tree-level change set (added/modified/deleted keys)

pub mod tree_diff;
pub mod value_diff;

pub use tree_diff::{diff_trees, TreeDiff};
pub use value_diff::{annotate, diff_values};
