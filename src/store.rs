//! Append-only object table.
//!
//! One directory, one file per object, keyed by hex digest. Writes are
//! idempotent (storing the same key twice is a no-op), nothing is ever
//! updated or deleted, and a read miss for a key that should exist means
//! the store is corrupt.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A directory-backed key → bytes table.
///
/// The repository keeps two of these: a blob table keyed by content digest
/// and a commit table keyed by commit id. Both are opaque byte records to
/// external tools.
#[derive(Debug)]
pub struct ObjectTable {
    dir: PathBuf,
}

impl ObjectTable {
    /// Create the backing directory (if needed) and open the table.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open an existing table without touching the filesystem.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Store bytes under `key`. A no-op if the key already exists: objects
    /// are content- or identity-addressed, so equal keys mean equal bytes.
    pub fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(key);
        if path.exists() {
            return Ok(());
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Fetch the bytes stored under `key`.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key);
        if !path.exists() {
            return Err(Error::ObjectMissing(key.to_string()));
        }
        Ok(fs::read(path)?)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.object_path(key).exists()
    }

    /// All keys in the table, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Resolve an abbreviated key to a full one, or `None` when nothing
    /// matches. With multiple matches the lexicographically first wins.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Option<String>> {
        for key in self.keys()? {
            if key.starts_with(prefix) {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}
