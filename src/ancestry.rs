//! Ancestry computation over the commit DAG.
//!
//! Commits form an arena of sealed records addressed by id; parent links
//! are id references, so traversal takes the commit table plus a starting
//! id and never mutates shared state.

use std::collections::{HashSet, VecDeque};

use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::store::ObjectTable;
use crate::types::CommitId;

/// The set of `start` and every commit reachable through first- or
/// second-parent links. Always contains `start` itself.
pub fn ancestors(commits: &ObjectTable, start: &CommitId) -> Result<HashSet<CommitId>> {
    let mut seen = HashSet::new();
    let mut stack = vec![start.clone()];
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        let commit = Commit::load(commits, &id)?;
        if let Some(parent) = commit.parent() {
            stack.push(parent.clone());
        }
        if let Some(parent) = commit.second_parent() {
            stack.push(parent.clone());
        }
    }
    Ok(seen)
}

/// The merge base of `ours` and `theirs`.
///
/// Breadth-first from `theirs`, expanding first-parent before second-parent
/// at every node; the first node that is also an ancestor of `ours` wins.
/// Among multiple common ancestors this picks the one closest (by edge
/// count, parent-first) to `theirs`.
pub fn split_point(commits: &ObjectTable, ours: &CommitId, theirs: &CommitId) -> Result<Commit> {
    let our_ancestors = ancestors(commits, ours)?;

    let mut queue = VecDeque::new();
    let mut visited = HashSet::new();
    queue.push_back(theirs.clone());
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let commit = Commit::load(commits, &id)?;
        if our_ancestors.contains(&id) {
            return Ok(commit);
        }
        if let Some(parent) = commit.parent() {
            queue.push_back(parent.clone());
        }
        if let Some(parent) = commit.second_parent() {
            queue.push_back(parent.clone());
        }
    }

    // Unreachable in a single-rooted repository.
    Err(Error::DisjointHistory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn arena() -> (TempDir, ObjectTable) {
        let dir = TempDir::new().unwrap();
        let commits = ObjectTable::create(dir.path().join("commits")).unwrap();
        (dir, commits)
    }

    fn save(commits: &ObjectTable, commit: &Commit) -> CommitId {
        commit.save(commits).unwrap();
        commit.id().clone()
    }

    #[test]
    fn ancestors_contains_self_and_is_closed_under_parents() {
        let (_dir, commits) = arena();
        let root = Commit::root();
        let a = root.child("a");
        let b = a.child("b");
        let root_id = save(&commits, &root);
        let a_id = save(&commits, &a);
        let b_id = save(&commits, &b);

        let set = ancestors(&commits, &b_id).unwrap();
        assert!(set.contains(&b_id));
        assert!(set.contains(&a_id));
        assert!(set.contains(&root_id));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn ancestors_follows_second_parent_links() {
        let (_dir, commits) = arena();
        let root = Commit::root();
        let left = root.child("left");
        let right = root.child("right");
        let merged = left.merge_child(&right, "main", "feat");
        save(&commits, &root);
        let left_id = save(&commits, &left);
        let right_id = save(&commits, &right);
        let merged_id = save(&commits, &merged);

        let set = ancestors(&commits, &merged_id).unwrap();
        assert!(set.contains(&left_id));
        assert!(set.contains(&right_id));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn split_point_of_a_commit_with_itself_is_itself() {
        let (_dir, commits) = arena();
        let root = Commit::root();
        let a = root.child("a");
        save(&commits, &root);
        let a_id = save(&commits, &a);

        let split = split_point(&commits, &a_id, &a_id).unwrap();
        assert_eq!(split.id(), &a_id);
    }

    #[test]
    fn split_point_of_diverged_branches_is_the_fork() {
        let (_dir, commits) = arena();
        let root = Commit::root();
        let fork = root.child("fork");
        let ours = fork.child("ours work");
        let theirs = fork.child("theirs work");
        save(&commits, &root);
        let fork_id = save(&commits, &fork);
        let ours_id = save(&commits, &ours);
        let theirs_id = save(&commits, &theirs);

        let split = split_point(&commits, &ours_id, &theirs_id).unwrap();
        assert_eq!(split.id(), &fork_id);
        assert_ne!(split.id(), &ours_id);
        assert_ne!(split.id(), &theirs_id);
    }

    #[test]
    fn split_point_detects_fast_forward_shape() {
        let (_dir, commits) = arena();
        let root = Commit::root();
        let base = root.child("base");
        let ahead = base.child("ahead");
        save(&commits, &root);
        let base_id = save(&commits, &base);
        let ahead_id = save(&commits, &ahead);

        // ours is an ancestor of theirs: split == ours
        let split = split_point(&commits, &base_id, &ahead_id).unwrap();
        assert_eq!(split.id(), &base_id);
    }

    #[test]
    fn split_point_prefers_the_ancestor_nearest_to_theirs() {
        // A merge on theirs' side makes the fork reachable twice; BFS from
        // theirs must return theirs' nearer ancestor, not the root.
        let (_dir, commits) = arena();
        let root = Commit::root();
        let fork = root.child("fork");
        let ours = fork.child("ours work");
        let side = fork.child("side work");
        let theirs = side.merge_child(&fork, "feat", "main");
        save(&commits, &root);
        let fork_id = save(&commits, &fork);
        let ours_id = save(&commits, &ours);
        save(&commits, &side);
        let theirs_id = save(&commits, &theirs);

        let split = split_point(&commits, &ours_id, &theirs_id).unwrap();
        assert_eq!(split.id(), &fork_id);
    }
}
