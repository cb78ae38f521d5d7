//! snapvc - a snapshot version-control engine
//!
//! This crate implements a local version-control system over whole-file
//! snapshots: a content-addressed object store holds blobs and commits,
//! a staging index collects additions and deletions, and a branch table
//! tracks named heads plus the checked-out HEAD. Histories merge through
//! an eight-rule three-way classification against the branches' split
//! point.
//!
//! # Example
//!
//! ```no_run
//! use snapvc::Repository;
//!
//! let mut repo = Repository::init("./project").unwrap();
//! std::fs::write("./project/notes.txt", "hello\n").unwrap();
//! repo.stage("notes.txt").unwrap();
//! repo.commit("add notes").unwrap();
//! ```

pub mod ancestry;
pub mod blob;
pub mod commit;
pub mod error;
pub mod merge;
pub mod refs;
pub mod repository;
pub mod store;
pub mod types;
pub mod workdir;

pub use error::{Error, Result};
pub use merge::{MergeAction, MergeOutcome};
pub use repository::Repository;
pub use types::{BlobId, CommitId};
