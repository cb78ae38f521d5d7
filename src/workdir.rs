//! Working-directory accessor.
//!
//! All file I/O outside the repository data directory goes through this
//! type. Only plain files directly under the root are visible; directories
//! (the data directory included) are ignored, matching the tracking model.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct WorkingDir {
    root: PathBuf,
}

impl WorkingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.file_path(name))?)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.file_path(name), bytes)?;
        Ok(())
    }

    /// Delete a file. Already-absent files are not an error: deletions are
    /// replayed from the tracked set, which may be ahead of the disk.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if path.is_file() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Names of the plain files directly under the root, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_read_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let workdir = WorkingDir::new(dir.path());

        workdir.write("a.txt", b"hello").unwrap();
        assert!(workdir.exists("a.txt"));
        assert_eq!(workdir.read("a.txt").unwrap(), b"hello");

        workdir.delete("a.txt").unwrap();
        assert!(!workdir.exists("a.txt"));
        workdir.delete("a.txt").unwrap(); // absent is fine
    }

    #[test]
    fn list_skips_directories() {
        let dir = TempDir::new().unwrap();
        let workdir = WorkingDir::new(dir.path());

        workdir.write("b.txt", b"b").unwrap();
        workdir.write("a.txt", b"a").unwrap();
        fs::create_dir(dir.path().join(".snapvc")).unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        assert_eq!(workdir.list().unwrap(), vec!["a.txt", "b.txt"]);
    }
}
