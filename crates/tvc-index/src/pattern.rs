//! Selectors for `reset`: `locale` or `locale:key`, where either part may
//! contain `*` wildcards.

use std::fmt;
use std::str::FromStr;

use crate::error::IndexError;

/// Matches staged changes by locale and, optionally, key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagePattern {
    locale: String,
    key: Option<String>,
}

impl StagePattern {
    /// A pattern matching every change.
    pub fn all() -> Self {
        Self {
            locale: "*".to_string(),
            key: None,
        }
    }

    /// Parse `locale` or `locale:key`.
    pub fn parse(pattern: &str) -> Result<Self, IndexError> {
        let (locale, key) = match pattern.split_once(':') {
            Some((locale, key)) => (locale, Some(key)),
            None => (pattern, None),
        };
        if locale.is_empty() || key.is_some_and(str::is_empty) {
            return Err(IndexError::InvalidPattern(pattern.to_string()));
        }
        Ok(Self {
            locale: locale.to_string(),
            key: key.map(str::to_string),
        })
    }

    /// Returns `true` if `(locale, key)` is selected.
    pub fn matches(&self, locale: &str, key: &str) -> bool {
        glob_match(&self.locale, locale)
            && self.key.as_deref().map_or(true, |k| glob_match(k, key))
    }
}

impl FromStr for StagePattern {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}:{}", self.locale, key),
            None => write!(f, "{}", self.locale),
        }
    }
}

/// `*` matches any run of characters (including none); everything else is
/// literal.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all.
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
