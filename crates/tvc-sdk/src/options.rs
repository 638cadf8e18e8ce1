//! Option builders for repository operations.

use tvc_dag::LogFilter;
use tvc_merge::MergeStrategy;

#[derive(Clone, Debug, Default)]
pub struct CommitOptions {
    /// Replace HEAD's commit instead of adding a child.
    pub amend: bool,
    pub author: Option<String>,
    pub email: Option<String>,
}

impl CommitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amend(mut self) -> Self {
        self.amend = true;
        self
    }

    pub fn with_author(mut self, author: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self.email = Some(email.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct BranchOptions {
    /// Start point revision. Defaults to HEAD.
    pub from: Option<String>,
    pub checkout: bool,
    pub description: Option<String>,
    /// Local branch or `<remote>/<branch>` used for ahead/behind.
    pub upstream: Option<String>,
}

impl BranchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, revision: impl Into<String>) -> Self {
        self.from = Some(revision.into());
        self
    }

    pub fn checkout(mut self) -> Self {
        self.checkout = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_upstream(mut self, upstream: impl Into<String>) -> Self {
        self.upstream = Some(upstream.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CheckoutOptions {
    /// Discard staged changes and any pending merge.
    pub force: bool,
    /// Create the target as a new branch at HEAD first.
    pub create_new: bool,
}

impl CheckoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn create_new(mut self) -> Self {
        self.create_new = true;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct TagOptions {
    /// Tagged revision. Defaults to HEAD.
    pub commit: Option<String>,
    pub message: Option<String>,
}

impl TagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, revision: impl Into<String>) -> Self {
        self.commit = Some(revision.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct MergeOptions {
    pub strategy: MergeStrategy,
    /// Stage the merge result but leave committing to the caller.
    pub no_commit: bool,
    /// Merge commit message. Defaults to `Merge branch '<source>' into <current>`.
    pub message: Option<String>,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn no_commit(mut self) -> Self {
        self.no_commit = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    /// Revision to walk from. Defaults to HEAD.
    pub revision: Option<String>,
    pub filter: LogFilter,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.filter = self.filter.limit(limit);
        self
    }

    pub fn since_ms(mut self, since_ms: i64) -> Self {
        self.filter = self.filter.since_ms(since_ms);
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.filter = self.filter.author(author);
        self
    }
}
