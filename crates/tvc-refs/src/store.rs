//! The in-memory reference table.
//!
//! [`RefStore`] keeps branches and tags in ordered maps so listings and
//! exports come out sorted by name. Every branch head and HEAD must point at
//! an existing commit; the store does not see the commit graph, so callers
//! check existence before moving refs.

use std::collections::BTreeMap;

use tracing::debug;
use tvc_types::ObjectHash;

use crate::error::{RefError, Result};
use crate::names::{validate_branch_name, validate_tag_name};
use crate::types::{Branch, Head, Ref, Tag};

/// Branches, tags, and HEAD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefStore {
    branches: BTreeMap<String, Branch>,
    tags: BTreeMap<String, Tag>,
    head: Head,
}

impl RefStore {
    /// Create a store with a single branch, checked out.
    pub fn new(initial: Branch) -> Result<Self> {
        validate_branch_name(&initial.name)?;
        let head = Head::Symbolic(initial.name.clone());
        let mut branches = BTreeMap::new();
        branches.insert(initial.name.clone(), initial);
        Ok(Self {
            branches,
            tags: BTreeMap::new(),
            head,
        })
    }

    /// Rebuild a store from exported parts. Names are validated and an
    /// attached HEAD must name one of `branches`.
    pub fn from_parts(
        branches: impl IntoIterator<Item = Branch>,
        tags: impl IntoIterator<Item = Tag>,
        head: Head,
    ) -> Result<Self> {
        let mut store = Self {
            branches: BTreeMap::new(),
            tags: BTreeMap::new(),
            head,
        };
        for branch in branches {
            store.create_branch(branch)?;
        }
        for tag in tags {
            store.create_tag(tag)?;
        }
        if let Head::Symbolic(name) = &store.head {
            store.branch_or_err(name)?;
        }
        Ok(store)
    }

    // ---------------------------------------------------------------
    // HEAD
    // ---------------------------------------------------------------

    pub fn head(&self) -> &Head {
        &self.head
    }

    /// The commit HEAD points at.
    pub fn head_commit(&self) -> Result<ObjectHash> {
        match &self.head {
            Head::Symbolic(name) => Ok(self.branch_or_err(name)?.head),
            Head::Detached(hash) => Ok(*hash),
        }
    }

    /// Name of the checked-out branch, if HEAD is attached.
    pub fn current_branch(&self) -> Option<&str> {
        self.head.branch()
    }

    /// Name of the checked-out branch, failing with `DetachedHead`.
    pub fn require_branch(&self) -> Result<&str> {
        self.current_branch().ok_or(RefError::DetachedHead)
    }

    /// Attach HEAD to an existing branch.
    pub fn attach(&mut self, name: &str) -> Result<()> {
        self.branch_or_err(name)?;
        self.head = Head::Symbolic(name.to_string());
        Ok(())
    }

    /// Detach HEAD at `commit`.
    pub fn detach(&mut self, commit: ObjectHash) {
        self.head = Head::Detached(commit);
    }

    /// Move whatever HEAD points at to `commit`: the current branch when
    /// attached, HEAD itself when detached.
    pub fn advance(&mut self, commit: ObjectHash) -> Result<()> {
        match self.head.clone() {
            Head::Symbolic(name) => self.set_branch_head(&name, commit),
            Head::Detached(_) => {
                self.head = Head::Detached(commit);
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------
    // Branches
    // ---------------------------------------------------------------

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    pub fn branch_or_err(&self, name: &str) -> Result<&Branch> {
        self.branches.get(name).ok_or_else(|| RefError::BranchNotFound {
            name: name.to_string(),
        })
    }

    /// All branches, ordered by name.
    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.values()
    }

    pub fn create_branch(&mut self, branch: Branch) -> Result<&Branch> {
        validate_branch_name(&branch.name)?;
        if self.branches.contains_key(&branch.name) {
            return Err(RefError::BranchExists { name: branch.name });
        }
        debug!(branch = %branch.name, head = %branch.head.short_hex(), "created branch");
        let name = branch.name.clone();
        Ok(&*self.branches.entry(name).or_insert(branch))
    }

    pub fn set_branch_head(&mut self, name: &str, commit: ObjectHash) -> Result<()> {
        let branch = self
            .branches
            .get_mut(name)
            .ok_or_else(|| RefError::BranchNotFound {
                name: name.to_string(),
            })?;
        debug!(branch = name, head = %commit.short_hex(), "moved branch");
        branch.head = commit;
        Ok(())
    }

    pub fn set_upstream(&mut self, name: &str, upstream: Option<String>) -> Result<()> {
        let branch = self
            .branches
            .get_mut(name)
            .ok_or_else(|| RefError::BranchNotFound {
                name: name.to_string(),
            })?;
        branch.upstream = upstream;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Tags
    // ---------------------------------------------------------------

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    /// All tags, ordered by name.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn create_tag(&mut self, tag: Tag) -> Result<&Tag> {
        validate_tag_name(&tag.name)?;
        if self.tags.contains_key(&tag.name) {
            return Err(RefError::TagExists { name: tag.name });
        }
        debug!(tag = %tag.name, commit = %tag.commit.short_hex(), "created tag");
        let name = tag.name.clone();
        Ok(&*self.tags.entry(name).or_insert(tag))
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Resolve a local name: branches win over tags.
    pub fn lookup(&self, name: &str) -> Option<(Ref, ObjectHash)> {
        if let Some(branch) = self.branches.get(name) {
            return Some((Ref::Branch(name.to_string()), branch.head));
        }
        self.tags
            .get(name)
            .map(|tag| (Ref::Tag(name.to_string()), tag.commit))
    }
}
