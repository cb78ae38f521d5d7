//! Branch references.
//!
//! The branch table maps branch names to commit ids and carries the
//! reserved `HEAD` pointer for the currently checked-out commit. HEAD and
//! the current branch's entry are kept equal on every mutation; the table
//! is serialized inside the repository state record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::CommitId;

/// Reserved name for the checked-out-commit pointer.
pub const HEAD: &str = "HEAD";

/// Branch created by `init`.
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTable {
    branches: BTreeMap<String, CommitId>,
    current: String,
}

impl BranchTable {
    /// A fresh table: HEAD and the default branch both at the root commit.
    pub fn new(root: CommitId) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(HEAD.to_string(), root.clone());
        branches.insert(DEFAULT_BRANCH.to_string(), root);
        Self {
            branches,
            current: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn head(&self) -> &CommitId {
        &self.branches[HEAD]
    }

    pub fn current_branch(&self) -> &str {
        &self.current
    }

    /// Head commit of the current branch. Equal to [`Self::head`] by
    /// invariant.
    pub fn current_commit_id(&self) -> &CommitId {
        &self.branches[&self.current]
    }

    pub fn exists(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Look up a branch head by name. The reserved HEAD entry is not a
    /// branch and never resolves.
    pub fn resolve(&self, name: &str) -> Option<&CommitId> {
        if name == HEAD {
            return None;
        }
        self.branches.get(name)
    }

    /// Create a branch pointing at the current HEAD.
    pub fn create(&mut self, name: &str) -> Result<()> {
        if self.exists(name) {
            return Err(Error::BranchExists);
        }
        let head = self.head().clone();
        self.branches.insert(name.to_string(), head);
        Ok(())
    }

    /// Delete a branch. The active branch can never be deleted, and the
    /// reserved HEAD entry is not deletable at all.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if name == HEAD || !self.exists(name) {
            return Err(Error::BranchMissing);
        }
        if name == self.current {
            return Err(Error::CannotRemoveCurrentBranch);
        }
        self.branches.remove(name);
        Ok(())
    }

    /// Point HEAD and the current branch at a new commit.
    pub fn advance(&mut self, id: CommitId) {
        self.branches.insert(HEAD.to_string(), id.clone());
        self.branches.insert(self.current.clone(), id);
    }

    /// Make `name` current and move HEAD to its head commit. The caller
    /// has already validated that the branch exists; the reserved HEAD
    /// entry is ignored.
    pub fn switch(&mut self, name: &str) {
        if name == HEAD {
            return;
        }
        if let Some(id) = self.branches.get(name).cloned() {
            self.branches.insert(HEAD.to_string(), id);
            self.current = name.to_string();
        }
    }

    /// Branch names in alphabetical order, HEAD excluded.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.branches
            .keys()
            .map(String::as_str)
            .filter(|name| *name != HEAD)
    }
}
