//! Content indexing.
//!
//! [`ContentIndexer`] walks one version's snapshot through its [`Storage`]
//! and builds the [`ContentNode`] tree. Each version is indexed from its own
//! storage only; nothing is shared between versions.
//!
//! # Content Files
//!
//! Files with a `.md`, `.mdx` or `.mdoc` extension become pages. A page's
//! label comes from its YAML front matter (`sidebar.label`, then `title`).
//! A directory's label comes from its `meta.yaml` file using the same keys.
//! Hidden entries (starting with `.`), other files and paths matching an
//! exclude pattern are skipped. Empty directories are kept as empty groups.
//!
//! Identifier segments are lowercased and whitespace becomes `-`, so
//! `Getting Started/Intro.md` is indexed as `getting-started/intro`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use docver_config::normalize_segment;
use docver_storage::{Entry, Storage, StorageError, StorageErrorKind, join_path};
use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::Deserialize;

use crate::content::ContentNode;

/// File extensions indexed as pages.
const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx", "mdoc"];

/// Directory metadata filename.
const META_FILENAME: &str = "meta.yaml";

/// YAML front matter delimited by `---` lines at the very start of a file.
static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
        .expect("front matter regex is valid")
});

/// Exclude patterns match path separators literally, so `*` stays within one segment.
const EXCLUDE_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Content indexing error.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The snapshot root doesn't exist.
    #[error("Content root of version {version} not found: {location}")]
    ContentRootMissing {
        /// Version slug.
        version: String,
        /// Snapshot location.
        location: String,
    },
    /// Two siblings normalize to the same identifier.
    #[error(
        "Duplicate content node '{id}' in version {version}: '{first}' and '{second}' map to the same identifier"
    )]
    DuplicateContentNode {
        /// Version slug.
        version: String,
        /// Shared identifier.
        id: String,
        /// First entry name.
        first: String,
        /// Second entry name.
        second: String,
    },
    /// No snapshot registered for the version.
    #[error("No content snapshot for version {0}")]
    UnknownVersion(String),
    /// Reading the snapshot failed.
    #[error("Failed to read content of version {version}: {source}")]
    Storage {
        /// Version slug.
        version: String,
        /// Storage error.
        #[source]
        source: StorageError,
    },
}

/// Page or directory metadata.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeMeta {
    title: Option<String>,
    sidebar: SidebarMeta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SidebarMeta {
    label: Option<String>,
    hidden: bool,
}

impl NodeMeta {
    fn parse(yaml: &str, path: &str) -> Self {
        if yaml.trim().is_empty() {
            return Self::default();
        }
        serde_yaml::from_str(yaml).unwrap_or_else(|e| {
            tracing::warn!(path, error = %e, "Ignoring malformed metadata");
            Self::default()
        })
    }

    fn from_front_matter(content: &str, path: &str) -> Self {
        FRONT_MATTER
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map_or_else(Self::default, |m| Self::parse(m.as_str(), path))
    }

    fn apply(self, node: ContentNode) -> ContentNode {
        let label = self
            .sidebar
            .label
            .or(self.title)
            .filter(|label| !label.trim().is_empty());
        let node = ContentNode { label, ..node };
        if self.sidebar.hidden { node.hidden() } else { node }
    }
}

/// Builds content trees from version snapshots.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use docver_storage::FsStorage;
/// use docver_site::ContentIndexer;
///
/// let indexer = ContentIndexer::new()
///     .with_snapshot("1.0", Arc::new(FsStorage::new("src/content/docs".into())));
/// let tree = indexer.index("1.0")?;
/// ```
#[derive(Default)]
pub struct ContentIndexer {
    snapshots: BTreeMap<String, Arc<dyn Storage>>,
    exclude: Vec<Pattern>,
}

impl ContentIndexer {
    /// Create an indexer with no snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the snapshot of a version.
    #[must_use]
    pub fn with_snapshot(mut self, version: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        self.snapshots.insert(version.into(), storage);
        self
    }

    /// Skip content paths matching any of the glob patterns.
    ///
    /// Invalid patterns are ignored with a warning.
    #[must_use]
    pub fn with_exclude(mut self, patterns: &[String]) -> Self {
        self.exclude = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!(pattern = %p, error = %e, "Ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();
        self
    }

    /// Index one version's snapshot.
    ///
    /// The result depends only on the snapshot content: indexing the same
    /// snapshot twice yields equal trees.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the version has no snapshot, the snapshot
    /// root is missing, a file can't be read, or two siblings collide.
    pub fn index(&self, version: &str) -> Result<ContentNode, IndexError> {
        let storage = self
            .snapshots
            .get(version)
            .ok_or_else(|| IndexError::UnknownVersion(version.to_owned()))?;
        let walker = Walker {
            storage: storage.as_ref(),
            version,
            exclude: &self.exclude,
        };

        let entries = match storage.list("") {
            Err(e) if e.kind() == &StorageErrorKind::NotFound => {
                return Err(IndexError::ContentRootMissing {
                    version: version.to_owned(),
                    location: storage.describe(),
                });
            }
            result => result.map_err(|e| walker.storage_error(e))?,
        };

        let mut root = walker.group("", "", entries)?;
        root.sort_children();

        tracing::debug!(
            version,
            location = %storage.describe(),
            pages = root.pages().len(),
            "Indexed content snapshot"
        );
        Ok(root)
    }
}

/// Recursive walk over one snapshot.
struct Walker<'a> {
    storage: &'a dyn Storage,
    version: &'a str,
    exclude: &'a [Pattern],
}

impl Walker<'_> {
    fn group(&self, dir: &str, id: &str, entries: Vec<Entry>) -> Result<ContentNode, IndexError> {
        let mut children = Vec::new();
        let mut sources: HashMap<String, String> = HashMap::new();
        let mut meta = NodeMeta::default();

        for entry in entries {
            if entry.name.starts_with('.') {
                continue;
            }
            let path = join_path(dir, &entry.name);
            if self.is_excluded(&path) {
                tracing::trace!(version = self.version, path = %path, "Excluded content path");
                continue;
            }

            let node = if entry.is_dir() {
                let Some(segment) = normalize_segment(&entry.name) else {
                    continue;
                };
                let entries = self
                    .storage
                    .list(&path)
                    .map_err(|e| self.storage_error(e))?;
                self.group(&path, &join_path(id, &segment), entries)?
            } else if entry.name == META_FILENAME {
                let yaml = self.storage.read(&path).map_err(|e| self.storage_error(e))?;
                meta = NodeMeta::parse(&yaml, &path);
                continue;
            } else if let Some(stem) = content_stem(&entry.name) {
                let Some(segment) = normalize_segment(stem) else {
                    continue;
                };
                let content = self.storage.read(&path).map_err(|e| self.storage_error(e))?;
                NodeMeta::from_front_matter(&content, &path)
                    .apply(ContentNode::page(join_path(id, &segment), None))
            } else {
                continue;
            };

            if let Some(first) = sources.insert(node.id.clone(), entry.name.clone()) {
                return Err(IndexError::DuplicateContentNode {
                    version: self.version.to_owned(),
                    id: node.id,
                    first,
                    second: entry.name,
                });
            }
            children.push(node);
        }

        Ok(meta.apply(ContentNode::group(id, None, children)))
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude
            .iter()
            .any(|p| p.matches_with(path, EXCLUDE_OPTIONS))
    }

    fn storage_error(&self, source: StorageError) -> IndexError {
        IndexError::Storage {
            version: self.version.to_owned(),
            source,
        }
    }
}

/// File stem if the name has a content extension.
fn content_stem(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    let is_content = CONTENT_EXTENSIONS
        .iter()
        .any(|c| ext.eq_ignore_ascii_case(c));
    (is_content && !stem.is_empty()).then_some(stem)
}
