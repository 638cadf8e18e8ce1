//! Merge engine for translation version control.
//!
//! Classifies merges (up to date, fast-forward, three-way), merges
//! translation trees key by key with conflict detection, tracks conflict
//! resolution, and replays change lists for cherry-pick and rebase.

pub mod analysis;
pub mod conflict;
pub mod error;
pub mod replay;
pub mod three_way;

pub use analysis::{analyze, MergeAnalysis};
pub use conflict::{ConflictSet, MergeConflict};
pub use error::{MergeError, MergeResult};
pub use replay::{force_changes, replay_changes, Replay};
pub use three_way::{merge_trees, MergeStrategy, TreeMerge};
