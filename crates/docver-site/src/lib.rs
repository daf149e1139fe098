//! Versioned navigation for docver.
//!
//! This crate provides:
//! - [`ContentIndexer`]: Content tree of one version snapshot
//! - [`SidebarResolver`]: Sidebar groups resolved against a content tree
//! - [`VersionOverlay`]: Version routing of resolved sidebars
//! - [`Engine`]: Parallel build of every declared version
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use docver_config::Config;
//! use docver_site::Engine;
//!
//! let config = Config::load(Some(Path::new("docver.toml")), None)?.validate()?;
//! let output = Engine::new(config).build()?;
//!
//! for version in &output.versions {
//!     println!("{}: {} groups", version.slug, version.sidebar.groups.len());
//! }
//! # Ok(())
//! # }
//! ```

pub(crate) mod content;
pub(crate) mod engine;
pub(crate) mod indexer;
pub(crate) mod overlay;
pub(crate) mod sidebar;

pub use content::{ContentNode, NodeKind, numeric_prefix, sibling_order, slug_label};
pub use engine::{
    BuildError, Engine, PublishedVersion, SiteOutput, Stage, VersionError, VersionFailure,
};
pub use indexer::{ContentIndexer, IndexError};
pub use overlay::VersionOverlay;
pub use sidebar::{
    ResolveError, ResolvedSidebar, SidebarEntry, SidebarGroup, SidebarLink, SidebarResolver,
};
