//! Content snapshot storage for docver.
//!
//! This crate provides a [`Storage`] trait for read-only access to one
//! version's content snapshot. The indexer only ever lists directories and
//! reads files through it, which enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Snapshot selection** per version without the indexer knowing where
//!   a snapshot lives
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list()` and `read()` methods
//! - [`FsStorage`] implementation rooted at a directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use docver_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("src/content/docs"));
//! for entry in storage.list("guides")? {
//!     println!("{} ({:?})", entry.name, entry.kind);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind, join_path};
