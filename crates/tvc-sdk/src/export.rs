//! Whole-repository export and import.
//!
//! An export carries the commit graph, refs and config. Staging, stashes,
//! pending merges and remotes are session state and are not exported.

use serde::{Deserialize, Serialize};
use tracing::info;

use tvc_dag::{Commit, CommitGraph};
use tvc_index::Index;
use tvc_refs::{Branch, Head, RefStore, Tag};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

/// Serializable snapshot of a repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoExport {
    pub version: u32,
    /// Every commit, parents before children.
    pub commits: Vec<Commit>,
    pub branches: Vec<Branch>,
    pub tags: Vec<Tag>,
    pub head: Head,
    pub config: RepoConfig,
}

impl RepoExport {
    pub fn to_json(&self) -> RepoResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> RepoResult<Self> {
        serde_json::from_str(json).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> RepoResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| RepoError::Serialization(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> RepoResult<Self> {
        bincode::deserialize(data).map_err(|e| RepoError::Serialization(e.to_string()))
    }
}

impl Repository {
    pub fn export(&self) -> RepoResult<RepoExport> {
        Ok(RepoExport {
            version: EXPORT_VERSION,
            commits: self.graph.topological_order().into_iter().cloned().collect(),
            branches: self.refs.branches().cloned().collect(),
            tags: self.refs.tags().cloned().collect(),
            head: self.refs.head().clone(),
            config: self.config.clone(),
        })
    }

    /// Build a new repository from an export.
    pub fn from_export(data: RepoExport) -> RepoResult<Self> {
        let mut repo = Repository::builder().config(data.config.clone()).build()?;
        repo.import(data)?;
        Ok(repo)
    }

    /// Replace all state with `data`.
    ///
    /// The graph and every ref are validated first; on error nothing
    /// changes. Staging, stashes, the pending merge and all remotes are
    /// dropped, and the default branch is checked out when it exists.
    pub fn import(&mut self, data: RepoExport) -> RepoResult<()> {
        if data.version != EXPORT_VERSION {
            return Err(RepoError::InvalidImport(format!(
                "unsupported export version {} (expected {EXPORT_VERSION})",
                data.version
            )));
        }
        let graph = CommitGraph::from_commits(data.commits)
            .map_err(|e| RepoError::InvalidImport(e.to_string()))?;
        if graph.is_empty() {
            return Err(RepoError::InvalidImport("export has no commits".into()));
        }
        let dangling = data
            .branches
            .iter()
            .map(|b| (&b.name, b.head))
            .chain(data.tags.iter().map(|t| (&t.name, t.commit)))
            .find(|(_, hash)| !graph.contains(hash));
        if let Some((name, hash)) = dangling {
            return Err(RepoError::InvalidImport(format!(
                "ref {name} points at unknown commit {}",
                hash.short_hex()
            )));
        }

        let head = if data
            .branches
            .iter()
            .any(|b| b.name == data.config.default_branch)
        {
            Head::Symbolic(data.config.default_branch.clone())
        } else {
            data.head
        };
        if let Head::Detached(hash) = &head {
            if !graph.contains(hash) {
                return Err(RepoError::InvalidImport(format!(
                    "HEAD points at unknown commit {}",
                    hash.short_hex()
                )));
            }
        }
        let refs = RefStore::from_parts(data.branches, data.tags, head)
            .map_err(|e| RepoError::InvalidImport(e.to_string()))?;
        let tree = graph.reconstruct(&refs.head_commit()?)?;

        self.remotes.clear()?;
        self.graph = graph;
        self.refs = refs;
        self.index = Index::from_tree(tree);
        self.stashes.clear();
        self.merge = None;
        self.config = data.config;

        info!(
            commits = self.graph.len(),
            branches = self.refs.branches().count(),
            head = ?self.refs.head(),
            "imported repository"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::options::{BranchOptions, CheckoutOptions, CommitOptions, LogOptions, TagOptions};
    use crate::testing::{init_tracing, repo};

    fn populated() -> Repository {
        let mut r = repo();
        r.set_translation("en", "greeting", "Hello");
        r.set_translation("fr", "greeting", "Bonjour");
        r.commit("seed", CommitOptions::new()).unwrap();
        r.tag("v1", TagOptions::new().with_message("first release")).unwrap();
        r.branch("feature", BranchOptions::new().checkout()).unwrap();
        r.set_translation("de", "greeting", "Hallo");
        r.commit("add de", CommitOptions::new()).unwrap();
        r.checkout("main", CheckoutOptions::new()).unwrap();
        r.set_translation("en", "farewell", "Bye");
        r.commit("add farewell", CommitOptions::new()).unwrap();
        r
    }

    fn messages(r: &Repository) -> Vec<String> {
        r.log(LogOptions::new())
            .unwrap()
            .map(|c| c.message.clone())
            .collect()
    }

    fn assert_same(a: &Repository, b: &Repository) {
        assert_eq!(a.status().unwrap(), b.status().unwrap());
        assert_eq!(messages(a), messages(b));
        assert_eq!(a.tree_at("HEAD").unwrap(), b.tree_at("HEAD").unwrap());
        assert_eq!(a.graph().len(), b.graph().len());
        assert_eq!(a.branches(), b.branches());
        assert_eq!(a.tags(), b.tags());
    }

    #[test]
    fn json_round_trip() {
        init_tracing();
        let r = populated();
        let json = r.export().unwrap().to_json().unwrap();
        let restored = Repository::from_export(RepoExport::from_json(&json).unwrap()).unwrap();
        assert_same(&r, &restored);
        assert_eq!(restored.get_translation("en", "farewell"), Some("Bye"));
    }

    #[test]
    fn binary_round_trip() {
        let r = populated();
        let bytes = r.export().unwrap().to_bytes().unwrap();
        let restored = Repository::from_export(RepoExport::from_bytes(&bytes).unwrap()).unwrap();
        assert_same(&r, &restored);
    }

    #[test]
    fn export_lists_parents_first() {
        let export = populated().export().unwrap();
        assert!(export.commits[0].is_root());
        for (i, commit) in export.commits.iter().enumerate() {
            for parent in commit.parentage.parents() {
                assert!(export.commits[..i].iter().any(|c| c.hash == parent));
            }
        }
    }

    #[test]
    fn import_clears_session_state_and_checks_out_default_branch() {
        let source = populated();
        let mut r = repo();
        r.checkout("side", CheckoutOptions::new().create_new()).unwrap();
        r.set_translation("en", "wip", "x");
        r.stash(None).unwrap();
        r.set_translation("en", "staged", "y");
        r.add_remote("origin", "mem://origin").unwrap();

        r.import(source.export().unwrap()).unwrap();
        assert_eq!(r.current_branch(), Some("main"));
        assert!(r.staged().is_empty());
        assert!(r.stash_list().is_empty());
        assert!(r.remotes().unwrap().is_empty());
        assert!(r.get_branch("side").is_none());
        assert_eq!(r.get_translation("en", "farewell"), Some("Bye"));
    }

    #[test]
    fn import_rejects_wrong_version() {
        let mut export = populated().export().unwrap();
        export.version = 99;
        assert!(matches!(
            repo().import(export),
            Err(RepoError::InvalidImport(_))
        ));
    }

    #[test]
    fn import_rejects_dangling_refs_and_leaves_state() {
        let source = populated();
        let mut export = source.export().unwrap();
        // Drop the tip of `feature`.
        let feature = source.get_branch("feature").unwrap().head;
        export.commits.retain(|c| c.hash != feature);

        let mut r = repo();
        r.set_translation("en", "kept", "yes");
        let before = r.status().unwrap();
        assert!(matches!(r.import(export), Err(RepoError::InvalidImport(_))));
        assert_eq!(r.status().unwrap(), before);
        assert_eq!(r.get_translation("en", "kept"), Some("yes"));
    }

    #[test]
    fn import_rejects_tampered_commits() {
        let mut export = populated().export().unwrap();
        let last = export.commits.len() - 1;
        export.commits[last].message.push_str(" (edited)");
        assert!(matches!(
            repo().import(export),
            Err(RepoError::InvalidImport(_))
        ));
    }

    #[test]
    fn import_rejects_empty_graph() {
        let mut export = populated().export().unwrap();
        export.commits.clear();
        export.branches.clear();
        export.tags.clear();
        assert!(matches!(
            repo().import(export),
            Err(RepoError::InvalidImport(_))
        ));
    }

    #[test]
    fn garbage_input_is_a_serialization_error() {
        assert!(matches!(
            RepoExport::from_json("{not json"),
            Err(RepoError::Serialization(_))
        ));
        assert!(matches!(
            RepoExport::from_bytes(&[1, 2, 3]),
            Err(RepoError::Serialization(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn round_trip_preserves_any_history(
            edits in prop::collection::vec(
                (0..3usize, 0..4usize, prop::option::of("[a-z]{1,6}")),
                1..24,
            )
        ) {
            let mut r = repo();
            for (i, (locale, key, value)) in edits.iter().enumerate() {
                let locale = ["en", "fr", "de"][*locale];
                let key = format!("k{key}");
                match value {
                    Some(v) => r.set_translation(locale, &key, v),
                    None => {
                        r.delete_translation(locale, &key);
                    }
                }
                if i % 3 == 2 && !r.staged().is_empty() {
                    r.commit(&format!("edit {i}"), CommitOptions::new()).unwrap();
                }
            }
            if !r.staged().is_empty() {
                r.commit("final", CommitOptions::new()).unwrap();
            }

            let bytes = r.export().unwrap().to_bytes().unwrap();
            let restored = Repository::from_export(RepoExport::from_bytes(&bytes).unwrap()).unwrap();
            prop_assert_eq!(restored.tree_at("HEAD").unwrap(), r.tree_at("HEAD").unwrap());
            prop_assert_eq!(messages(&restored), messages(&r));
            prop_assert_eq!(restored.working_tree(), r.working_tree());
        }
    }
}
