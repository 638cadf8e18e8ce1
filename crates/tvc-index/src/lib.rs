//! Working tree, staging area, and stash stack for translation version
//! control.
//!
//! # Key Types
//!
//! - [`Index`] -- The working tree plus its deduplicated staging area
//! - [`StagePattern`] -- `locale` / `locale:key` selector with `*` wildcards
//! - [`StashStack`] / [`Stash`] -- Saved-but-uncommitted change sets

pub mod error;
pub mod index;
pub mod pattern;
pub mod stash;

pub use error::{IndexError, IndexResult};
pub use index::Index;
pub use pattern::StagePattern;
pub use stash::{Stash, StashStack};
