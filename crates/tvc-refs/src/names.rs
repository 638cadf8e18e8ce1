//! Ref name validation following git-style conventions.
//!
//! Valid branch and tag names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not start or end with `.` or `/`
//! - Must not end with `.lock`
//! - Path components between slashes must be non-empty and must not start
//!   with `.`
//!
//! Remote names follow the same character rules but may not contain `/`,
//! since `<remote>/<branch>` is how remote-tracking refs are addressed.

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Substrings that are forbidden anywhere in a ref name.
const FORBIDDEN_SEQUENCES: &[(&str, &str)] = &[
    ("..", "must not contain '..'"),
    ("@{", "must not contain '@{'"),
    ("//", "must not contain consecutive slashes '//'"),
];

fn invalid(kind: &'static str, name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn check_ref_name(kind: &'static str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(kind, name, "must not be empty"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(kind, name, format!("contains forbidden character {ch:?}")));
    }
    if let Some((_, reason)) = FORBIDDEN_SEQUENCES.iter().find(|(seq, _)| name.contains(seq)) {
        return Err(invalid(kind, name, *reason));
    }
    if name.starts_with(['.', '/']) || name.ends_with(['.', '/']) {
        return Err(invalid(kind, name, "must not start or end with '.' or '/'"));
    }
    if name.ends_with(".lock") {
        return Err(invalid(kind, name, "must not end with '.lock'"));
    }
    if name.split('/').any(|component| component.starts_with('.')) {
        return Err(invalid(kind, name, "components must not start with '.'"));
    }
    Ok(())
}

/// Validate a branch name.
///
/// # Examples
///
/// ```
/// use tvc_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/de-translations").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    check_ref_name("branch", name)
}

/// Validate a tag name. Same rules as branch names.
pub fn validate_tag_name(name: &str) -> Result<()> {
    check_ref_name("tag", name)
}

/// Validate a remote name: ref rules, plus no slashes.
pub fn validate_remote_name(name: &str) -> Result<()> {
    check_ref_name("remote", name)?;
    if name.contains('/') {
        return Err(invalid("remote", name, "must not contain '/'"));
    }
    Ok(())
}
