//! Foundation types for translation version control (TVC).
//!
//! Every other TVC crate depends on `tvc-types`.
//!
//! # Key Types
//!
//! - [`ObjectHash`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`Change`] / [`ChangeKind`] -- One add/modify/delete of a `(locale, key)` slot
//! - [`LineDiff`] -- Line-level diff attached to a change
//! - [`TranslationTree`] -- Ordered `locale → key → value` snapshot

pub mod change;
pub mod error;
pub mod line;
pub mod object;
pub mod temporal;
pub mod tree;

pub use change::{Change, ChangeKind};
pub use error::TypeError;
pub use line::{DiffHunk, DiffLine, LineDiff};
pub use object::ObjectHash;
pub use temporal::{format_ms, now_ms};
pub use tree::TranslationTree;
