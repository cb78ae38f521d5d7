//! Commit records and history metadata.
//!
//! A commit is a full snapshot of the tracked-file mapping (path → blob id,
//! never a delta) plus lineage: message, timestamp, a first parent, and for
//! merge commits a second parent. Once sealed a commit never changes; the
//! commit table stores its JSON record keyed by id.
//!
//! Identity is derived from (formatted timestamp, message, first-parent id).
//! The root commit pins its timestamp to the epoch so every repository's
//! root is bit-identical.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::ObjectTable;
use crate::types::{BlobId, CommitId};

/// Message of every repository's root commit.
pub const ROOT_MESSAGE: &str = "initial commit";

const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// An immutable snapshot of the tracked files plus lineage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    id: CommitId,
    message: String,
    timestamp: DateTime<Utc>,
    parent: Option<CommitId>,
    second_parent: Option<CommitId>,
    // BTreeMap keeps the serialized record deterministic.
    files: BTreeMap<String, BlobId>,
}

impl Commit {
    fn new(
        message: String,
        timestamp: DateTime<Utc>,
        parent: Option<CommitId>,
        second_parent: Option<CommitId>,
        files: BTreeMap<String, BlobId>,
    ) -> Self {
        let id = CommitId::derive(
            &timestamp.format(DATE_FORMAT).to_string(),
            &message,
            parent.as_ref(),
        );
        Self {
            id,
            message,
            timestamp,
            parent,
            second_parent,
            files,
        }
    }

    /// The root commit: no parent, epoch timestamp, empty mapping.
    pub fn root() -> Self {
        Self::new(
            ROOT_MESSAGE.to_string(),
            DateTime::UNIX_EPOCH,
            None,
            None,
            BTreeMap::new(),
        )
    }

    /// A child of this commit. The file mapping is copied verbatim; the
    /// caller applies staged additions and removals before saving.
    pub fn child(&self, message: impl Into<String>) -> Self {
        Self::new(
            message.into(),
            Utc::now(),
            Some(self.id.clone()),
            None,
            self.files.clone(),
        )
    }

    /// A merge child: first parent is this commit, second parent is the
    /// other branch's head, message auto-generated from the branch names.
    pub fn merge_child(&self, other: &Commit, current_branch: &str, other_branch: &str) -> Self {
        let message = format!("Merged {} into {}.", other_branch, current_branch);
        Self::new(
            message,
            Utc::now(),
            Some(self.id.clone()),
            Some(other.id.clone()),
            self.files.clone(),
        )
    }

    pub fn id(&self) -> &CommitId {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parent(&self) -> Option<&CommitId> {
        self.parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&CommitId> {
        self.second_parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_merge(&self) -> bool {
        self.second_parent.is_some()
    }

    pub fn tracks(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Blob id of the tracked version of `path`, if any.
    pub fn file_at(&self, path: &str) -> Option<&BlobId> {
        self.files.get(path)
    }

    pub fn tracked_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &BlobId)> {
        self.files.iter().map(|(path, id)| (path.as_str(), id))
    }

    /// Record a staged addition or modification.
    pub fn put_file(&mut self, path: String, blob: BlobId) {
        self.files.insert(path, blob);
    }

    /// Apply a queued deletion. A no-op if the path is untracked.
    pub fn remove_file(&mut self, path: &str) {
        self.files.remove(path);
    }

    /// True when both commits track the same version of `path`: equal blob
    /// ids, or both untracked.
    pub fn same_version(&self, other: &Commit, path: &str) -> bool {
        self.files.get(path) == other.files.get(path)
    }

    /// Persist into the commit table, keyed by id. Idempotent.
    pub fn save(&self, commits: &ObjectTable) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        commits.write(self.id.as_str(), &bytes)
    }

    /// Load a commit record by id, verifying that the stored record agrees
    /// with the key it was filed under.
    pub fn load(commits: &ObjectTable, id: &CommitId) -> Result<Self> {
        let bytes = commits.read(id.as_str())?;
        let commit: Commit = serde_json::from_slice(&bytes)?;
        if commit.id != *id {
            return Err(Error::CorruptObject {
                id: id.to_string(),
                reason: format!("record carries id {}", commit.id),
            });
        }
        Ok(commit)
    }
}

impl fmt::Display for Commit {
    /// Renders one log entry: id line, merge parents for merge commits,
    /// date line, then the message.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "commit {}", self.id)?;
        if let (Some(first), Some(second)) = (&self.parent, &self.second_parent) {
            writeln!(f, "Merge: {} {}", first.short(), second.short())?;
        }
        writeln!(f, "Date: {}", self.timestamp.format(DATE_FORMAT))?;
        writeln!(f, "{}", self.message)
    }
}
