//! Error types for the version-control engine.
//!
//! Two kinds of failure exist: user errors (bad path, unknown branch,
//! conflicting state) which abort only the current operation with a one-line
//! message, and store-level failures (a missing or corrupt object) which
//! indicate repository corruption and are not recoverable.

use thiserror::Error;

/// The main error type for repository operations.
#[derive(Debug, Error)]
pub enum Error {
    /// `add` named a file that is not in the working directory.
    #[error("File does not exist.")]
    FileDoesNotExist,

    /// `commit` was given an empty message.
    #[error("Please enter a commit message")]
    EmptyMessage,

    /// `commit` (or a merge) had nothing staged and nothing queued for deletion.
    #[error("No changes added to the commit.")]
    NothingStaged,

    /// `rm` named a file that is neither staged nor tracked.
    #[error("No reason to remove this file.")]
    NoReasonToRemove,

    /// `checkout` named a branch that does not exist.
    #[error("No such branch exists.")]
    NoSuchBranch,

    /// `checkout` named the branch that is already current.
    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch,

    /// `branch` would shadow an existing branch.
    #[error("A branch with that name already exists.")]
    BranchExists,

    /// `rm-branch` or `merge` named a branch that does not exist.
    #[error("A branch with that name does not exist.")]
    BranchMissing,

    /// `rm-branch` named the active branch.
    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch,

    /// No stored commit matches the given (possibly abbreviated) id.
    #[error("No commit with that id exists.")]
    CommitMissing,

    /// The named commit does not track the requested file.
    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    /// An untracked working-directory file would be clobbered.
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFile,

    /// `merge` requires a clean staging area.
    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    /// `merge` was given the current branch.
    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    /// The given branch is already contained in the current branch's history.
    #[error("Given branch is an ancestor of the current branch")]
    AncestorMerge,

    /// `init` ran inside an existing repository.
    #[error("A snapvc repository already exists in the current directory.")]
    AlreadyInitialized,

    /// A command other than `init` ran outside a repository.
    #[error("Not in an initialized snapvc repository.")]
    NotInitialized,

    /// No command was given on the command line.
    #[error("Please enter a command.")]
    NoCommand,

    /// Wrong number or shape of command-line operands.
    #[error("Incorrect operands.")]
    BadOperands,

    /// Unrecognized command name.
    #[error("No command with that name exists.")]
    UnknownCommand,

    /// An object that should exist was not found in the store.
    #[error("object not found in store: {0}")]
    ObjectMissing(String),

    /// A stored object failed an integrity check.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: String, reason: String },

    /// Two commits share no history. Cannot happen in a single-rooted
    /// repository; seeing this means the commit table is damaged.
    #[error("commits share no common ancestor")]
    DisjointHistory,

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem-level failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for caller-induced errors: the operation aborted but the
    /// repository is intact and usable.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Error::ObjectMissing(_)
                | Error::CorruptObject { .. }
                | Error::DisjointHistory
                | Error::Serialization(_)
                | Error::Io(_)
        )
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_are_classified() {
        assert!(Error::NothingStaged.is_user_error());
        assert!(Error::BranchMissing.is_user_error());
        assert!(!Error::ObjectMissing("abc".to_string()).is_user_error());
        assert!(!Error::DisjointHistory.is_user_error());
    }

    #[test]
    fn messages_are_single_line() {
        let errors = [
            Error::FileDoesNotExist,
            Error::EmptyMessage,
            Error::NothingStaged,
            Error::UntrackedFile,
            Error::AncestorMerge,
        ];
        for e in errors {
            assert!(!e.to_string().contains('\n'));
        }
    }
}
