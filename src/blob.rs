//! File snapshots.
//!
//! A blob is one file's bytes, frozen, identified by the digest of that
//! content. Staging the same content twice produces the same blob, which
//! the append-only table dedupes for free.

use crate::error::Result;
use crate::store::ObjectTable;
use crate::types::BlobId;

/// An immutable content-addressed snapshot of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    id: BlobId,
    content: Vec<u8>,
}

impl Blob {
    /// Wrap raw content, binding its digest as identity.
    pub fn new(content: Vec<u8>) -> Self {
        let id = BlobId::for_content(&content);
        Self { id, content }
    }

    pub fn id(&self) -> &BlobId {
        &self.id
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Persist into the blob table. Idempotent.
    pub fn save(&self, blobs: &ObjectTable) -> Result<()> {
        blobs.write(self.id.as_str(), &self.content)
    }

    /// Load a blob by id. Fails with `ObjectMissing` if the id was never
    /// stored, which for a tracked blob means store corruption.
    pub fn load(blobs: &ObjectTable, id: &BlobId) -> Result<Self> {
        let content = blobs.read(id.as_str())?;
        Ok(Self {
            id: id.clone(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn equal_content_means_equal_identity() {
        let a = Blob::new(b"same".to_vec());
        let b = Blob::new(b"same".to_vec());
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), Blob::new(b"other".to_vec()).id());
    }

    #[test]
    fn save_then_load_restores_content() {
        let dir = TempDir::new().unwrap();
        let blobs = ObjectTable::create(dir.path().join("blobs")).unwrap();

        let blob = Blob::new(b"file contents\n".to_vec());
        blob.save(&blobs).unwrap();
        blob.save(&blobs).unwrap(); // second save is a no-op

        let loaded = Blob::load(&blobs, blob.id()).unwrap();
        assert_eq!(loaded.content(), b"file contents\n");
        assert_eq!(loaded.id(), blob.id());
    }

    #[test]
    fn load_of_unknown_id_fails() {
        let dir = TempDir::new().unwrap();
        let blobs = ObjectTable::create(dir.path().join("blobs")).unwrap();
        let missing = BlobId::for_content(b"never stored");
        assert!(matches!(
            Blob::load(&blobs, &missing),
            Err(Error::ObjectMissing(_))
        ));
    }
}
