//! Content hashing for translation version control.
//!
//! Provides domain-separated BLAKE3 hashing. Commits, trees, and stashes are
//! hashed under distinct domain tags so identical bytes of different object
//! types never collide.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
