//! Classifying a merge before touching any tree.

use tracing::debug;

use tvc_dag::CommitGraph;
use tvc_types::ObjectHash;

use crate::error::{MergeError, MergeResult};

/// What merging `theirs` into `ours` requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeAnalysis {
    /// `theirs` is already contained in `ours`.
    UpToDate,
    /// `ours` is an ancestor of `theirs`: move the pointer.
    FastForward { target: ObjectHash },
    /// Histories diverged since `base`.
    ThreeWay { base: ObjectHash },
}

/// Decide how to merge `theirs` into `ours`.
pub fn analyze(graph: &CommitGraph, ours: &ObjectHash, theirs: &ObjectHash) -> MergeResult<MergeAnalysis> {
    graph.commit(ours)?;
    graph.commit(theirs)?;

    if graph.is_ancestor(theirs, ours) {
        return Ok(MergeAnalysis::UpToDate);
    }

    let base = graph
        .common_ancestor(ours, theirs)
        .ok_or(MergeError::DisjointHistories {
            ours: *ours,
            theirs: *theirs,
        })?;

    let analysis = if base == *ours {
        MergeAnalysis::FastForward { target: *theirs }
    } else {
        MergeAnalysis::ThreeWay { base }
    };
    debug!(
        ours = %ours.short_hex(),
        theirs = %theirs.short_hex(),
        base = %base.short_hex(),
        ?analysis,
        "analyzed merge"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvc_dag::{CommitDraft, Parentage};
    use tvc_types::Change;

    fn commit(graph: &mut CommitGraph, parentage: Parentage, key: &str) -> ObjectHash {
        let mut tree = parentage
            .parent()
            .map(|p| graph.reconstruct(&p).unwrap())
            .unwrap_or_default();
        let changes = vec![Change::add("en", key, key)];
        tree.apply_all(&changes);
        let commit = CommitDraft::new(parentage, key)
            .author("Ada", "ada@example.com")
            .changes(changes)
            .seal(&tree)
            .unwrap();
        graph.add_commit(commit).unwrap()
    }

    /// root -> a -> b (main), a -> c (feature)
    fn fork() -> (CommitGraph, ObjectHash, ObjectHash, ObjectHash) {
        let mut graph = CommitGraph::new();
        let root = commit(&mut graph, Parentage::Root, "root");
        let a = commit(&mut graph, Parentage::Normal(root), "a");
        let b = commit(&mut graph, Parentage::Normal(a), "b");
        let c = commit(&mut graph, Parentage::Normal(a), "c");
        (graph, a, b, c)
    }

    #[test]
    fn up_to_date_when_theirs_is_ancestor() {
        let (graph, a, b, _) = fork();
        assert_eq!(analyze(&graph, &b, &a).unwrap(), MergeAnalysis::UpToDate);
        assert_eq!(analyze(&graph, &b, &b).unwrap(), MergeAnalysis::UpToDate);
    }

    #[test]
    fn fast_forward_when_ours_is_base() {
        let (graph, a, b, _) = fork();
        assert_eq!(
            analyze(&graph, &a, &b).unwrap(),
            MergeAnalysis::FastForward { target: b }
        );
    }

    #[test]
    fn three_way_when_diverged() {
        let (graph, a, b, c) = fork();
        assert_eq!(analyze(&graph, &b, &c).unwrap(), MergeAnalysis::ThreeWay { base: a });
    }

    #[test]
    fn disjoint_histories_are_an_error() {
        let (mut graph, _, b, _) = fork();
        let other = commit(&mut graph, Parentage::Root, "other");
        assert!(matches!(
            analyze(&graph, &b, &other),
            Err(MergeError::DisjointHistories { .. })
        ));
    }

    #[test]
    fn unknown_commit_is_reported() {
        let (graph, _, b, _) = fork();
        let missing = ObjectHash::from_hash([0xee; 32]);
        assert!(matches!(analyze(&graph, &b, &missing), Err(MergeError::Dag(_))));
    }
}
