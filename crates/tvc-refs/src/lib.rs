//! Reference management for translation version control.
//!
//! Named references (branches, tags, HEAD) point at commits in the commit
//! graph. They are the human-readable entry points into history.
//!
//! # Architecture
//!
//! - **Branches** are mutable pointers to commit-chain tips. They advance as
//!   commits, merges and rebases land.
//! - **Tags** are immutable pointers to specific commits. Once created, a tag
//!   cannot be moved.
//! - **HEAD** names the current branch, or is detached and points directly
//!   at a commit hash.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- Core ref types: [`Ref`], [`Branch`], [`Tag`], [`Head`]
//! - [`names`] -- Branch/tag/remote name validation
//! - [`store`] -- The [`RefStore`] holding every branch, tag and HEAD

pub mod error;
pub mod names;
pub mod store;
pub mod types;

pub use error::{RefError, Result};
pub use names::{validate_branch_name, validate_remote_name, validate_tag_name};
pub use store::RefStore;
pub use types::{Branch, Head, Ref, Tag};
