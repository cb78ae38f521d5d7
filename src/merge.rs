//! Three-way merge classification.
//!
//! Every path tracked by any of {split, ours, theirs} maps to exactly one
//! [`MergeAction`]. The decision is a single total function over six
//! predicates (tracked-by and same-version for each pair), evaluated in a
//! fixed priority order; the arms are mutually exclusive for any split
//! point produced by a valid DAG, and anything outside that space falls
//! through to `NoOp`.

use crate::commit::Commit;

/// What the merge does with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// Check out and stage the other branch's version.
    TakeTheirs,
    /// Keep the current branch's version untouched.
    KeepOurs,
    /// Stage the path for removal, mirroring the other branch's deletion.
    Remove,
    /// Both sides changed the path since the split, differently: write a
    /// marker file interleaving both versions and stage it.
    Conflict,
    /// Nothing to do; the working tree already matches the outcome.
    NoOp,
}

/// Classify one path against the split point's view of it.
pub fn classify(split: &Commit, ours: &Commit, theirs: &Commit, path: &str) -> MergeAction {
    let in_split = split.tracks(path);
    let in_ours = ours.tracks(path);
    let in_theirs = theirs.tracks(path);
    let unchanged_ours = split.same_version(ours, path);
    let unchanged_theirs = split.same_version(theirs, path);
    let sides_agree = ours.same_version(theirs, path);

    match (in_split, in_ours, in_theirs) {
        // Tracked everywhere: the side that changed it wins.
        (true, true, true) if unchanged_ours => MergeAction::TakeTheirs,
        (true, true, true) if unchanged_theirs => MergeAction::KeepOurs,
        // Changed on our side (possibly deleted): identical changes merge
        // silently, diverging changes conflict.
        (true, _, _) if !unchanged_ours && sides_agree => MergeAction::NoOp,
        (true, _, _) if !unchanged_ours && !unchanged_theirs && !sides_agree => {
            MergeAction::Conflict
        }
        // Absent at the split: an addition on one side only.
        (false, _, false) => MergeAction::NoOp,
        (false, false, _) => MergeAction::TakeTheirs,
        // Deleted on one side, untouched on the other.
        (true, true, false) if unchanged_ours => MergeAction::Remove,
        (true, false, true) if unchanged_theirs => MergeAction::NoOp,
        // Inconsistent with a valid split point; leave the path alone.
        _ => MergeAction::NoOp,
    }
}

/// Synthesize the contents of a conflicted file. A side that deleted the
/// path contributes an empty section.
pub fn conflict_contents(ours: Option<&[u8]>, theirs: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    if let Some(bytes) = ours {
        out.extend_from_slice(bytes);
    }
    out.extend_from_slice(b"=======\n");
    if let Some(bytes) = theirs {
        out.extend_from_slice(bytes);
    }
    out.extend_from_slice(b">>>>>>>\n");
    out
}

/// How a merge finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A merge commit was created.
    Merged {
        id: crate::types::CommitId,
        conflicted: bool,
    },
    /// The current branch was an ancestor of the target; the merge
    /// degenerated to a checkout of the other branch.
    FastForwarded,
}

impl MergeOutcome {
    pub fn is_conflicted(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicted: true, .. })
    }
}
