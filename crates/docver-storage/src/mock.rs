//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::storage::{Entry, EntryKind, Storage, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// In-memory content snapshot for testing.
///
/// Directories are implied by file paths; empty directories can be added
/// with [`MockStorage::with_dir`]. The root directory exists only once
/// something has been added.
///
/// # Example
///
/// ```ignore
/// use docver_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("start/intro.md", "---\ntitle: Introduction\n---\n")
///     .with_file("start/setup.md", "");
///
/// let entries = storage.list("start").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<String, String>>,
    dirs: RwLock<BTreeSet<String>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add a directory (and its ancestors).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<String>) -> Self {
        self.add_dir_chain(&path.into());
        self
    }

    /// Insert or replace a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let parent = path.rsplit_once('/').map_or("", |(dir, _)| dir).to_owned();
        self.add_dir_chain(&parent);
        self.files.write().unwrap().insert(path, content.into());
    }

    fn add_dir_chain(&self, dir: &str) {
        let mut dirs = self.dirs.write().unwrap();
        dirs.insert(String::new());
        let mut current = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            dirs.insert(current.clone());
        }
    }
}

/// Return the direct child name of `dir` for `path`, if `path` lies inside `dir`.
fn child_name<'a>(dir: &str, path: &'a str) -> Option<&'a str> {
    let rest = if dir.is_empty() {
        path
    } else {
        path.strip_prefix(dir)?.strip_prefix('/')?
    };
    (!rest.is_empty()).then(|| rest.split('/').next().unwrap_or(rest))
}

impl Storage for MockStorage {
    fn list(&self, dir: &str) -> Result<Vec<Entry>, StorageError> {
        let dirs = self.dirs.read().unwrap();
        if !dirs.contains(dir) {
            return Err(StorageError::not_found(dir).with_backend(BACKEND));
        }

        let files = self.files.read().unwrap();
        let mut children: BTreeMap<&str, EntryKind> = BTreeMap::new();
        for path in dirs.iter().filter(|d| !d.is_empty()) {
            if let Some(name) = child_name(dir, path) {
                children.insert(name, EntryKind::Directory);
            }
        }
        for path in files.keys() {
            if let Some(name) = child_name(dir, path) {
                children.entry(name).or_insert(EntryKind::File);
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| Entry {
                name: name.to_owned(),
                kind,
            })
            .collect())
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn describe(&self) -> String {
        "mock".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageErrorKind;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_mock_has_no_root() {
        let storage = MockStorage::new();
        let err = storage.list("").unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
    }

    #[test]
    fn test_list_implied_directories() {
        let storage = MockStorage::new()
            .with_file("index.md", "")
            .with_file("start/intro.md", "")
            .with_file("start/deep/more.md", "");

        assert_eq!(
            storage.list("").unwrap(),
            vec![Entry::file("index.md"), Entry::dir("start")]
        );
        assert_eq!(
            storage.list("start").unwrap(),
            vec![Entry::dir("deep"), Entry::file("intro.md")]
        );
    }

    #[test]
    fn test_list_does_not_match_name_prefixes() {
        let storage = MockStorage::new()
            .with_file("start/intro.md", "")
            .with_file("starter/other.md", "");

        assert_eq!(storage.list("start").unwrap(), vec![Entry::file("intro.md")]);
    }

    #[test]
    fn test_empty_directory() {
        let storage = MockStorage::new().with_dir("empty/nested");
        assert_eq!(storage.list("empty").unwrap(), vec![Entry::dir("nested")]);
        assert!(storage.list("empty/nested").unwrap().is_empty());
    }

    #[test]
    fn test_read_and_mutate() {
        let storage = MockStorage::new().with_file("a.md", "one");
        assert_eq!(storage.read("a.md").unwrap(), "one");

        storage.set_file("a.md", "two");
        assert_eq!(storage.read("a.md").unwrap(), "two");
    }
}
