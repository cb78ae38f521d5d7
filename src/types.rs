//! Type-safe id wrappers for the object store.
//!
//! Blob and commit ids are both hex-encoded SHA-256 digests, but they key
//! different tables and are never interchangeable; the newtypes keep a blob
//! id from being passed where a commit id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of leading hex characters shown in abbreviated ids.
pub const SHORT_ID_LEN: usize = 7;

/// Identity of a commit record.
///
/// Derived from the commit's formatted timestamp, message, and first-parent
/// id; file contents are deliberately excluded (the id fixes the commit's
/// DAG position and metadata, not its tree).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Compute the id for a commit with the given header fields.
    pub fn derive(timestamp: &str, message: &str, parent: Option<&CommitId>) -> Self {
        // A root commit hashes the literal "null" in place of a parent id,
        // so all repositories agree on the root's identity.
        let parent_part = parent.map(CommitId::as_str).unwrap_or("null");
        Self(sha256_hex(&[
            timestamp.as_bytes(),
            message.as_bytes(),
            parent_part.as_bytes(),
        ]))
    }

    /// Wrap an already-computed hex digest (e.g. a key read back from the
    /// commit table).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form of the id.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_ID_LEN.min(self.0.len())]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a blob: the digest of its content, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    /// Compute the content address for raw bytes.
    pub fn for_content(content: &[u8]) -> Self {
        Self(sha256_hex(&[content]))
    }

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded SHA-256 over the concatenation of `parts`.
fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_id_is_deterministic() {
        let a = BlobId::for_content(b"hello");
        let b = BlobId::for_content(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, BlobId::for_content(b"world"));
    }

    #[test]
    fn blob_id_is_hex_sha256() {
        let id = BlobId::for_content(b"");
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn commit_id_depends_on_all_header_fields() {
        let base = CommitId::derive("Thu Jan 01 00:00:00 1970 +0000", "initial commit", None);
        let other_message =
            CommitId::derive("Thu Jan 01 00:00:00 1970 +0000", "something else", None);
        let other_parent = CommitId::derive(
            "Thu Jan 01 00:00:00 1970 +0000",
            "initial commit",
            Some(&base),
        );
        assert_ne!(base, other_message);
        assert_ne!(base, other_parent);
    }

    #[test]
    fn root_commit_id_is_stable_across_repositories() {
        let a = CommitId::derive("Thu Jan 01 00:00:00 1970 +0000", "initial commit", None);
        let b = CommitId::derive("Thu Jan 01 00:00:00 1970 +0000", "initial commit", None);
        assert_eq!(a, b);
    }

    #[test]
    fn short_id_is_a_prefix() {
        let id = CommitId::derive("d", "m", None);
        assert_eq!(id.short().len(), SHORT_ID_LEN);
        assert!(id.as_str().starts_with(id.short()));
    }
}
