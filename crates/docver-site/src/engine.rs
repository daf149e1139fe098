//! Build pipeline.
//!
//! [`Engine`] drives every declared version through the same stages:
//!
//! ```text
//! Validated -> Indexed -> SidebarResolved -> Overlaid -> Published
//! ```
//!
//! Versions are independent: each reads only its own snapshot and they are
//! built in parallel. Results are always reported in declaration order, so
//! the output doesn't depend on thread scheduling. What happens when one
//! version fails is governed by [`FailurePolicy`].

use std::fmt;
use std::sync::Arc;

use docver_config::{
    FailurePolicy, PluginDescriptor, SiteMetadata, ValidatedConfig, VersionDescriptor,
};
use docver_storage::{FsStorage, Storage};
use rayon::prelude::*;
use serde::Serialize;

use crate::indexer::{ContentIndexer, IndexError};
use crate::overlay::VersionOverlay;
use crate::sidebar::{ResolveError, ResolvedSidebar, SidebarResolver};

/// Lifecycle stage of a version build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Configuration loaded but not checked.
    Unvalidated,
    /// Configuration passed validation.
    Validated,
    /// Content tree built.
    Indexed,
    /// Sidebar resolved against the content tree.
    SidebarResolved,
    /// Version routing applied.
    Overlaid,
    /// Handed to the renderer.
    Published,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unvalidated => "unvalidated",
            Self::Validated => "validated",
            Self::Indexed => "indexed",
            Self::SidebarResolved => "sidebar-resolved",
            Self::Overlaid => "overlaid",
            Self::Published => "published",
        };
        f.write_str(name)
    }
}

/// Failure of a single version.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// Content indexing failed.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// Sidebar resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl VersionError {
    /// Last stage the version reached before failing.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Index(_) => Stage::Validated,
            Self::Resolve(_) => Stage::Indexed,
        }
    }
}

/// Build error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A version failed under [`FailurePolicy::AbortAll`].
    #[error("Version {slug} failed: {source}")]
    Version {
        /// Version slug.
        slug: String,
        /// Underlying failure.
        #[source]
        source: VersionError,
    },
    /// The requested version isn't declared.
    #[error("Unknown version: {0}")]
    UnknownVersion(String),
}

/// Navigation of one published version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishedVersion {
    /// Version slug.
    pub slug: String,
    /// Display label.
    pub label: String,
    /// Whether the version is served at the site root.
    pub canonical: bool,
    /// Route prefix (`/<slug>`), absent for the canonical version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Number of indexed pages.
    pub pages: usize,
    /// Version-prefixed sidebar.
    pub sidebar: ResolvedSidebar,
}

/// A version left out of the output under [`FailurePolicy::Continue`].
#[derive(Debug, Serialize)]
pub struct VersionFailure {
    /// Version slug.
    pub slug: String,
    /// Last stage reached.
    pub stage: Stage,
    /// What went wrong.
    #[serde(serialize_with = "serialize_error")]
    pub error: VersionError,
}

fn serialize_error<S: serde::Serializer>(error: &VersionError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Everything the renderer needs, for all published versions.
#[derive(Debug, Serialize)]
pub struct SiteOutput {
    /// Site metadata, passed through unchanged.
    pub site: SiteMetadata,
    /// Plugin descriptors in declaration order.
    pub plugins: Vec<PluginDescriptor>,
    /// Published versions in declaration order.
    pub versions: Vec<PublishedVersion>,
    /// Versions that failed, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<VersionFailure>,
}

impl SiteOutput {
    /// Published version by slug.
    #[must_use]
    pub fn version(&self, slug: &str) -> Option<&PublishedVersion> {
        self.versions.iter().find(|v| v.slug == slug)
    }

    /// Whether every declared version was published.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Versioned navigation build engine.
///
/// # Example
///
/// ```ignore
/// use docver_config::Config;
/// use docver_site::Engine;
///
/// let config = Config::load(None, None)?.validate()?;
/// let output = Engine::new(config).build()?;
/// ```
pub struct Engine {
    config: ValidatedConfig,
    indexer: ContentIndexer,
    resolver: SidebarResolver,
}

impl Engine {
    /// Create an engine reading each version's snapshot from the filesystem.
    #[must_use]
    pub fn new(config: ValidatedConfig) -> Self {
        let overlay = VersionOverlay::new(config.registry());
        let snapshots: Vec<(String, Arc<dyn Storage>)> = config
            .registry()
            .all()
            .iter()
            .map(|version| {
                let root = overlay.snapshot_root(version, config.docs());
                tracing::debug!(version = %version.slug, root = %root.display(), "Using snapshot");
                let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(root));
                (version.slug.clone(), storage)
            })
            .collect();
        Self::with_snapshots(config, snapshots)
    }

    /// Create an engine with explicit snapshot storages.
    ///
    /// Versions without a snapshot fail with [`IndexError::UnknownVersion`].
    #[must_use]
    pub fn with_snapshots(
        config: ValidatedConfig,
        snapshots: impl IntoIterator<Item = (String, Arc<dyn Storage>)>,
    ) -> Self {
        let indexer = snapshots.into_iter().fold(
            ContentIndexer::new().with_exclude(&config.docs().exclude),
            |indexer, (slug, storage)| indexer.with_snapshot(slug, storage),
        );
        let resolver = SidebarResolver::new().with_max_depth(config.build().max_depth);
        Self {
            config,
            indexer,
            resolver,
        }
    }

    /// Validated configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Build all declared versions.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::AbortAll`], returns the first failed version in
    /// declaration order and discards every other result. Under
    /// [`FailurePolicy::Continue`] this never fails; failures are listed in
    /// [`SiteOutput::failures`].
    pub fn build(&self) -> Result<SiteOutput, BuildError> {
        let versions = self.config.registry().all();
        tracing::info!(versions = versions.len(), "Building versions");

        let results: Vec<_> = versions
            .par_iter()
            .map(|version| (version, self.publish(version)))
            .collect();

        let mut published = Vec::new();
        let mut failures = Vec::new();
        for (version, result) in results {
            match result {
                Ok(output) => published.push(output),
                Err(error) => {
                    tracing::error!(
                        version = %version.slug,
                        stage = %error.stage(),
                        error = %error,
                        "Version failed"
                    );
                    failures.push(VersionFailure {
                        slug: version.slug.clone(),
                        stage: error.stage(),
                        error,
                    });
                }
            }
        }

        if self.config.build().failure_policy == FailurePolicy::AbortAll && !failures.is_empty() {
            let first = failures.remove(0);
            return Err(BuildError::Version {
                slug: first.slug,
                source: first.error,
            });
        }

        tracing::info!(
            published = published.len(),
            failed = failures.len(),
            "Build finished"
        );
        Ok(SiteOutput {
            site: self.config.site().clone(),
            plugins: self.config.plugins().to_vec(),
            versions: published,
            failures,
        })
    }

    /// Build a single version, ignoring every other one.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownVersion`] for an undeclared slug, or
    /// [`BuildError::Version`] if the version fails.
    pub fn build_version(&self, slug: &str) -> Result<PublishedVersion, BuildError> {
        let version = self
            .config
            .registry()
            .lookup(slug)
            .ok_or_else(|| BuildError::UnknownVersion(slug.to_owned()))?;
        self.publish(version).map_err(|source| BuildError::Version {
            slug: slug.to_owned(),
            source,
        })
    }

    fn publish(&self, version: &VersionDescriptor) -> Result<PublishedVersion, VersionError> {
        let slug = version.slug.as_str();

        let tree = self.indexer.index(slug)?;
        tracing::debug!(version = slug, stage = %Stage::Indexed, "Stage reached");

        let sidebar = self.resolver.resolve(slug, self.config.sidebar(), &tree)?;
        tracing::debug!(version = slug, stage = %Stage::SidebarResolved, "Stage reached");

        let overlay = VersionOverlay::new(self.config.registry());
        let sidebar = overlay.overlay(slug, sidebar);
        tracing::debug!(version = slug, stage = %Stage::Overlaid, "Stage reached");

        Ok(PublishedVersion {
            slug: version.slug.clone(),
            label: version.label().to_owned(),
            canonical: self.config.registry().is_canonical(slug),
            prefix: overlay.prefix(slug),
            pages: tree.pages().len(),
            sidebar,
        })
    }
}
