//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading a content snapshot from a local directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a snapshot directory.
///
/// Symlinks are reported as files and never followed, so a listing walk
/// cannot loop.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use docver_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("src/content/docs"));
/// let entries = storage.list("")?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory of the snapshot.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    ///
    /// # Arguments
    ///
    /// * `root` - Snapshot root directory
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate that a path doesn't escape the snapshot root.
    ///
    /// Rejects parent directory components (`..`) and absolute paths.
    fn validate_path(path: &str) -> Result<(), StorageError> {
        let escapes = Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        Self::validate_path(path)?;
        Ok(if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        })
    }
}

impl Storage for FsStorage {
    fn list(&self, dir: &str) -> Result<Vec<Entry>, StorageError> {
        let full_path = self.resolve(dir)?;
        let read_dir = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry =
                entry.map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            // DirEntry::file_type does not follow symlinks
            let kind = if entry.file_type().is_ok_and(|t| t.is_dir()) {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(Entry { name, kind });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path)).with_backend(BACKEND))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(FsStorage: Send, Sync);

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_list_root_sorted() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("zeta.md"), "# Zeta").unwrap();
        fs::write(temp_dir.path().join("alpha.md"), "# Alpha").unwrap();
        fs::create_dir(temp_dir.path().join("guides")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list("").unwrap();

        assert_eq!(
            entries,
            vec![
                Entry::file("alpha.md"),
                Entry::dir("guides"),
                Entry::file("zeta.md"),
            ]
        );
    }

    #[test]
    fn test_list_nested_dir() {
        let temp_dir = create_test_dir();
        let guides = temp_dir.path().join("guides").join("advanced");
        fs::create_dir_all(&guides).unwrap();
        fs::write(guides.join("tuning.md"), "").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert_eq!(
            storage.list("guides/advanced").unwrap(),
            vec![Entry::file("tuning.md")]
        );
    }

    #[test]
    fn test_list_missing_root() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent/docver/content"));
        let err = storage.list("").unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_read_existing_file() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("start")).unwrap();
        fs::write(temp_dir.path().join("start/intro.md"), "# Intro").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert_eq!(storage.read("start/intro.md").unwrap(), "# Intro");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let err = storage.read("missing.md").unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
    }

    #[test]
    fn test_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().join("docs"));

        for path in ["../secret.md", "guides/../../secret.md", "/etc/passwd"] {
            let err = storage.read(path).unwrap_err();
            assert_eq!(err.kind(), &StorageErrorKind::InvalidPath, "path {path:?}");
        }
        let err = storage.list("..").unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::InvalidPath);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_listed_as_file() {
        let temp_dir = create_test_dir();
        let docs = temp_dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        std::os::unix::fs::symlink(&docs, docs.join("loop")).unwrap();

        let storage = FsStorage::new(docs);

        assert_eq!(storage.list("").unwrap(), vec![Entry::file("loop")]);
    }
}
