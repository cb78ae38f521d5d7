//! The repository aggregate.
//!
//! Owns the branch table, staging index, and deletion set, and exposes
//! every mutating operation. Durable state is three things under the data
//! directory: the commit table, the blob table, and one JSON state record
//! holding branches plus both staging areas. Each operation validates its
//! preconditions against in-memory state, writes objects (append-only), and
//! saves the whole state record exactly once on success; a failed
//! precondition leaves the record untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ancestry;
use crate::blob::Blob;
use crate::commit::Commit;
use crate::error::{Error, Result};
use crate::merge::{self, MergeAction, MergeOutcome};
use crate::refs::BranchTable;
use crate::store::ObjectTable;
use crate::types::{BlobId, CommitId};
use crate::workdir::WorkingDir;

/// Name of the repository data directory.
pub const REPO_DIR: &str = ".snapvc";

const COMMITS_DIR: &str = "commits";
const BLOBS_DIR: &str = "blobs";
const STATE_FILE: &str = "state";

#[derive(Deserialize)]
struct StateRecord {
    branches: BranchTable,
    staging: BTreeMap<String, BlobId>,
    deletions: BTreeSet<String>,
}

#[derive(Serialize)]
struct StateRecordRef<'a> {
    branches: &'a BranchTable,
    staging: &'a BTreeMap<String, BlobId>,
    deletions: &'a BTreeSet<String>,
}

/// A checked-out repository: working directory plus durable state.
pub struct Repository {
    workdir: WorkingDir,
    commits: ObjectTable,
    blobs: ObjectTable,
    state_path: PathBuf,
    branches: BranchTable,
    staging: BTreeMap<String, BlobId>,
    deletions: BTreeSet<String>,
}

impl Repository {
    /// Create a new repository at `root`: data directory, root commit, and
    /// the initial state record (HEAD and the default branch at the root).
    pub fn init(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let data = root.join(REPO_DIR);
        if data.exists() {
            return Err(Error::AlreadyInitialized);
        }
        fs::create_dir_all(&data)?;
        let commits = ObjectTable::create(data.join(COMMITS_DIR))?;
        let blobs = ObjectTable::create(data.join(BLOBS_DIR))?;

        let root_commit = Commit::root();
        root_commit.save(&commits)?;

        let repo = Self {
            workdir: WorkingDir::new(root),
            commits,
            blobs,
            state_path: data.join(STATE_FILE),
            branches: BranchTable::new(root_commit.id().clone()),
            staging: BTreeMap::new(),
            deletions: BTreeSet::new(),
        };
        repo.save_state()?;
        Ok(repo)
    }

    /// Open an existing repository at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let data = root.join(REPO_DIR);
        if !data.is_dir() {
            return Err(Error::NotInitialized);
        }
        let state_path = data.join(STATE_FILE);
        let state: StateRecord = serde_json::from_slice(&fs::read(&state_path)?)?;
        Ok(Self {
            workdir: WorkingDir::new(root),
            commits: ObjectTable::open(data.join(COMMITS_DIR)),
            blobs: ObjectTable::open(data.join(BLOBS_DIR)),
            state_path,
            branches: state.branches,
            staging: state.staging,
            deletions: state.deletions,
        })
    }

    pub fn is_initialized(root: impl AsRef<Path>) -> bool {
        root.as_ref().join(REPO_DIR).is_dir()
    }

    fn save_state(&self) -> Result<()> {
        let record = StateRecordRef {
            branches: &self.branches,
            staging: &self.staging,
            deletions: &self.deletions,
        };
        fs::write(&self.state_path, serde_json::to_vec_pretty(&record)?)?;
        Ok(())
    }

    pub fn head_id(&self) -> &CommitId {
        self.branches.head()
    }

    pub fn current_branch(&self) -> &str {
        self.branches.current_branch()
    }

    fn current_commit(&self) -> Result<Commit> {
        Commit::load(&self.commits, self.branches.current_commit_id())
    }

    fn head_commit(&self) -> Result<Commit> {
        Commit::load(&self.commits, self.branches.head())
    }

    /// Stage a working-directory file for the next commit.
    ///
    /// Un-queues a pending deletion; re-staging a file whose content already
    /// matches the current commit clears its entry instead. The blob is
    /// persisted in every case.
    pub fn stage(&mut self, path: &str) -> Result<()> {
        if !self.workdir.exists(path) {
            return Err(Error::FileDoesNotExist);
        }
        let blob = Blob::new(self.workdir.read(path)?);
        let current = self.current_commit()?;

        if self.deletions.remove(path) {
            // un-queued; tracking resumes at the committed version
        } else if current.file_at(path) == Some(blob.id()) {
            self.staging.remove(path);
        } else {
            self.staging.insert(path.to_string(), blob.id().clone());
        }

        blob.save(&self.blobs)?;
        self.save_state()
    }

    /// Seal the staged changes into a new commit on the current branch.
    pub fn commit(&mut self, message: &str) -> Result<CommitId> {
        if self.staging.is_empty() && self.deletions.is_empty() {
            return Err(Error::NothingStaged);
        }
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }

        let mut child = self.current_commit()?.child(message);
        apply_changes(&mut child, &self.staging, &self.deletions);
        let id = child.id().clone();
        child.save(&self.commits)?;

        self.branches.advance(id.clone());
        self.staging.clear();
        self.deletions.clear();
        self.save_state()?;
        Ok(id)
    }

    /// Un-stage a file, and if it is tracked, queue it for deletion and
    /// remove it from the working directory.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let current = self.current_commit()?;
        if !self.staging.contains_key(path) && !current.tracks(path) {
            return Err(Error::NoReasonToRemove);
        }

        self.staging.remove(path);
        if current.tracks(path) {
            self.deletions.insert(path.to_string());
            self.workdir.delete(path)?;
        }
        self.save_state()
    }

    /// History of the current HEAD, following first-parent links only.
    pub fn log(&self) -> Result<String> {
        let mut out = String::new();
        let mut next = Some(self.branches.head().clone());
        while let Some(id) = next {
            let commit = Commit::load(&self.commits, &id)?;
            out.push_str("===\n");
            out.push_str(&commit.to_string());
            out.push('\n');
            next = commit.parent().cloned();
        }
        Ok(out)
    }

    /// Every stored commit, in id order.
    pub fn global_log(&self) -> Result<String> {
        let mut out = String::new();
        for key in self.commits.keys()? {
            let commit = Commit::load(&self.commits, &CommitId::from_hex(key))?;
            out.push_str("===\n");
            out.push_str(&commit.to_string());
            out.push('\n');
        }
        Ok(out)
    }

    /// Ids of every commit whose message is exactly `message`.
    pub fn find(&self, message: &str) -> Result<Vec<CommitId>> {
        let mut matches = Vec::new();
        for key in self.commits.keys()? {
            let commit = Commit::load(&self.commits, &CommitId::from_hex(key))?;
            if commit.message() == message {
                matches.push(commit.id().clone());
            }
        }
        Ok(matches)
    }

    /// Branches (current starred), staged files, and removed files, each
    /// alphabetical.
    pub fn status(&self) -> String {
        let mut out = String::from("=== Branches ===\n");
        for name in self.branches.names() {
            if name == self.branches.current_branch() {
                out.push('*');
            }
            out.push_str(name);
            out.push('\n');
        }
        out.push('\n');

        out.push_str("=== Staged Files ===\n");
        for path in self.staging.keys() {
            out.push_str(path);
            out.push('\n');
        }
        out.push('\n');

        out.push_str("=== Removed Files ===\n");
        for path in &self.deletions {
            out.push_str(path);
            out.push('\n');
        }
        out.push('\n');

        out.push_str("=== Modifications Not Staged For Commit ===\n\n");
        out.push_str("=== Untracked Files ===\n\n");
        out
    }

    /// Overwrite one working file with HEAD's version.
    pub fn checkout_file_from_head(&self, path: &str) -> Result<()> {
        let head = self.head_commit()?;
        self.restore_file(&head, path)
    }

    /// Overwrite one working file with the version in the given commit.
    /// The id may be abbreviated to a unique prefix.
    pub fn checkout_file(&self, id_prefix: &str, path: &str) -> Result<()> {
        let id = self.resolve_commit(id_prefix)?;
        let commit = Commit::load(&self.commits, &id)?;
        self.restore_file(&commit, path)
    }

    /// Check out a branch: materialize its head's files, drop files tracked
    /// only by the old head, clear both staging areas, switch HEAD.
    pub fn checkout_branch(&mut self, name: &str) -> Result<()> {
        let head = self.head_commit()?;
        for file in self.workdir.list()? {
            if !head.tracks(&file) {
                return Err(Error::UntrackedFile);
            }
        }
        let target_id = self
            .branches
            .resolve(name)
            .ok_or(Error::NoSuchBranch)?
            .clone();
        if name == self.branches.current_branch() {
            return Err(Error::AlreadyOnBranch);
        }

        let target = Commit::load(&self.commits, &target_id)?;
        self.materialize(&target, &head)?;
        self.staging.clear();
        self.deletions.clear();
        self.branches.switch(name);
        self.save_state()
    }

    /// Create a branch at the current HEAD.
    pub fn branch(&mut self, name: &str) -> Result<()> {
        self.branches.create(name)?;
        self.save_state()
    }

    /// Delete a branch table entry. Never the active branch.
    pub fn remove_branch(&mut self, name: &str) -> Result<()> {
        self.branches.delete(name)?;
        self.save_state()
    }

    /// Move the current branch (and HEAD) to an arbitrary commit,
    /// materializing its snapshot.
    pub fn reset(&mut self, id_prefix: &str) -> Result<()> {
        let id = self.resolve_commit(id_prefix)?;
        self.assert_no_untracked_files()?;

        let target = Commit::load(&self.commits, &id)?;
        for (path, blob_id) in target.files() {
            let blob = Blob::load(&self.blobs, blob_id)?;
            self.workdir.write(path, blob.content())?;
        }
        for file in self.workdir.list()? {
            if !target.tracks(&file) {
                self.workdir.delete(&file)?;
            }
        }

        self.staging.clear();
        self.deletions.clear();
        self.branches.advance(id);
        self.save_state()
    }

    /// Merge another branch into the current one.
    pub fn merge(&mut self, other_branch: &str) -> Result<MergeOutcome> {
        if !self.staging.is_empty() || !self.deletions.is_empty() {
            return Err(Error::UncommittedChanges);
        }
        let other_id = self
            .branches
            .resolve(other_branch)
            .ok_or(Error::BranchMissing)?
            .clone();
        if other_branch == self.branches.current_branch() {
            return Err(Error::MergeWithSelf);
        }
        self.assert_no_untracked_files()?;

        let ours = self.current_commit()?;
        let theirs = Commit::load(&self.commits, &other_id)?;
        let split = ancestry::split_point(&self.commits, ours.id(), theirs.id())?;

        if split.id() == ours.id() {
            self.checkout_branch(other_branch)?;
            return Ok(MergeOutcome::FastForwarded);
        }
        if split.id() == theirs.id() {
            return Err(Error::AncestorMerge);
        }

        // Staging is empty by precondition; accumulate the merge's changes
        // locally so a late failure leaves no half-staged state behind.
        let mut adds: BTreeMap<String, BlobId> = BTreeMap::new();
        let mut removals: BTreeSet<String> = BTreeSet::new();
        let mut conflicted = false;

        let mut paths: BTreeSet<String> = BTreeSet::new();
        for commit in [&split, &ours, &theirs] {
            paths.extend(commit.tracked_paths().map(str::to_string));
        }

        for path in &paths {
            match merge::classify(&split, &ours, &theirs, path) {
                MergeAction::TakeTheirs => {
                    if let Some(blob_id) = theirs.file_at(path) {
                        let blob = Blob::load(&self.blobs, blob_id)?;
                        self.workdir.write(path, blob.content())?;
                        adds.insert(path.clone(), blob_id.clone());
                    }
                }
                MergeAction::Remove => {
                    removals.insert(path.clone());
                    self.workdir.delete(path)?;
                }
                MergeAction::Conflict => {
                    conflicted = true;
                    let our_bytes = self.tracked_content(&ours, path)?;
                    let their_bytes = self.tracked_content(&theirs, path)?;
                    let contents =
                        merge::conflict_contents(our_bytes.as_deref(), their_bytes.as_deref());
                    let blob = Blob::new(contents);
                    blob.save(&self.blobs)?;
                    self.workdir.write(path, blob.content())?;
                    adds.insert(path.clone(), blob.id().clone());
                }
                MergeAction::KeepOurs | MergeAction::NoOp => {}
            }
        }

        if adds.is_empty() && removals.is_empty() {
            return Err(Error::NothingStaged);
        }

        let mut commit =
            ours.merge_child(&theirs, self.branches.current_branch(), other_branch);
        apply_changes(&mut commit, &adds, &removals);
        let id = commit.id().clone();
        commit.save(&self.commits)?;

        self.branches.advance(id.clone());
        self.save_state()?;
        Ok(MergeOutcome::Merged { id, conflicted })
    }

    fn restore_file(&self, commit: &Commit, path: &str) -> Result<()> {
        let blob_id = commit.file_at(path).ok_or(Error::FileNotInCommit)?;
        let blob = Blob::load(&self.blobs, blob_id)?;
        self.workdir.write(path, blob.content())
    }

    fn resolve_commit(&self, prefix: &str) -> Result<CommitId> {
        self.commits
            .resolve_prefix(prefix)?
            .map(CommitId::from_hex)
            .ok_or(Error::CommitMissing)
    }

    /// Write the target snapshot over the working directory and delete
    /// files tracked by the old head but absent from the target.
    fn materialize(&self, target: &Commit, old: &Commit) -> Result<()> {
        for (path, blob_id) in target.files() {
            let blob = Blob::load(&self.blobs, blob_id)?;
            self.workdir.write(path, blob.content())?;
        }
        for path in old.tracked_paths() {
            if !target.tracks(path) {
                self.workdir.delete(path)?;
            }
        }
        Ok(())
    }

    fn assert_no_untracked_files(&self) -> Result<()> {
        let current = self.current_commit()?;
        for file in self.workdir.list()? {
            if !current.tracks(&file) && !self.staging.contains_key(&file) {
                return Err(Error::UntrackedFile);
            }
        }
        Ok(())
    }

    fn tracked_content(&self, commit: &Commit, path: &str) -> Result<Option<Vec<u8>>> {
        match commit.file_at(path) {
            Some(blob_id) => Ok(Some(Blob::load(&self.blobs, blob_id)?.into_content())),
            None => Ok(None),
        }
    }
}

fn apply_changes(
    commit: &mut Commit,
    adds: &BTreeMap<String, BlobId>,
    removals: &BTreeSet<String>,
) {
    for (path, blob) in adds {
        commit.put_file(path.clone(), blob.clone());
    }
    for path in removals {
        commit.remove_file(path);
    }
}
