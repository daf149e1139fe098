//! Sidebar resolution.
//!
//! [`SidebarResolver`] combines the validated sidebar groups with one
//! version's content tree. Explicit entries are checked against the tree's
//! pages; autogenerated groups mirror a content directory. Hrefs produced
//! here are site-rooted and unprefixed; [`crate::VersionOverlay`] adds the
//! version segment afterwards.

use std::collections::HashMap;

use docver_config::{SidebarEntrySpec, SidebarGroupSpec, SidebarSourceMode};
use serde::Serialize;

use crate::content::{ContentNode, NodeKind};

/// Sidebar of one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedSidebar {
    /// Groups in declaration order.
    pub groups: Vec<SidebarGroup>,
}

impl ResolvedSidebar {
    /// All links in the sidebar, depth-first.
    #[must_use]
    pub fn links(&self) -> Vec<&SidebarLink> {
        fn collect<'a>(entries: &'a [SidebarEntry], out: &mut Vec<&'a SidebarLink>) {
            for entry in entries {
                match entry {
                    SidebarEntry::Link(link) => out.push(link),
                    SidebarEntry::Group(group) => collect(&group.entries, out),
                }
            }
        }

        let mut out = Vec::new();
        for group in &self.groups {
            collect(&group.entries, &mut out);
        }
        out
    }
}

/// Labeled group of sidebar entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarGroup {
    /// Display label.
    pub label: String,
    /// Whether the renderer should show the group collapsed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
    /// Ordered entries.
    pub entries: Vec<SidebarEntry>,
}

/// Entry of a sidebar group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarEntry {
    /// Link to a page or an external URL.
    Link(SidebarLink),
    /// Nested group.
    Group(SidebarGroup),
}

/// Sidebar link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarLink {
    /// Display label.
    pub label: String,
    /// Site-rooted path (`/start/intro`) or absolute external URL.
    pub href: String,
    /// Whether the link leaves the site.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

/// Sidebar resolution error.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// An explicit link doesn't match any page.
    #[error("Sidebar link '/{link}' in group '{group}' ({field}) matches no page in version {version}")]
    DanglingSidebarLink {
        /// Version slug.
        version: String,
        /// Group label.
        group: String,
        /// Link path as configured (normalized).
        link: String,
        /// Configuration field of the entry.
        field: String,
    },
    /// An autogenerate directory doesn't exist or isn't a directory.
    #[error(
        "Autogenerate directory '{directory}' of group '{group}' ({field}) is not a content directory in version {version}"
    )]
    MissingAutogenerateDirectory {
        /// Version slug.
        version: String,
        /// Group label.
        group: String,
        /// Directory identifier.
        directory: String,
        /// Configuration field of the group.
        field: String,
    },
}

/// Resolves sidebar groups against a content tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct SidebarResolver {
    max_depth: Option<usize>,
}

impl SidebarResolver {
    /// Create a resolver with unlimited nesting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the nesting of autogenerated sub-groups.
    ///
    /// Directories below the limit are flattened into the deepest allowed
    /// group, keeping their pages in tree order.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve every group for one version.
    ///
    /// # Errors
    ///
    /// Returns the first dangling explicit link or missing autogenerate
    /// directory, in declaration order.
    pub fn resolve(
        &self,
        version: &str,
        groups: &[SidebarGroupSpec],
        tree: &ContentNode,
    ) -> Result<ResolvedSidebar, ResolveError> {
        let pages: HashMap<&str, &ContentNode> =
            tree.pages().into_iter().map(|p| (p.url_path(), p)).collect();

        let groups = groups
            .iter()
            .enumerate()
            .map(|(index, spec)| -> Result<SidebarGroup, ResolveError> {
                let field = format!("sidebar[{index}]");
                let entries = match &spec.source {
                    SidebarSourceMode::Explicit(items) => {
                        explicit_entries(version, spec, items, &pages, &field)?
                    }
                    SidebarSourceMode::Autogenerate { directory } => {
                        let dir = tree.find(directory).filter(|n| n.is_group()).ok_or_else(|| {
                            ResolveError::MissingAutogenerateDirectory {
                                version: version.to_owned(),
                                group: spec.label.clone(),
                                directory: directory.clone(),
                                field: format!("{field}.autogenerate.directory"),
                            }
                        })?;
                        self.directory_entries(dir, 1, spec.collapsed)
                    }
                };
                Ok(SidebarGroup {
                    label: spec.label.clone(),
                    collapsed: spec.collapsed,
                    entries,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(version, groups = groups.len(), "Resolved sidebar");
        Ok(ResolvedSidebar { groups })
    }

    /// Entries mirroring a directory, `depth` levels below the top-level group.
    fn directory_entries(&self, dir: &ContentNode, depth: usize, collapsed: bool) -> Vec<SidebarEntry> {
        let mut entries = Vec::new();
        for child in dir.children.iter().filter(|c| !c.hidden) {
            match child.kind {
                NodeKind::Page => entries.push(SidebarEntry::Link(page_link(child, None))),
                NodeKind::Group if self.max_depth.is_none_or(|max| depth <= max) => {
                    let nested = self.directory_entries(child, depth + 1, collapsed);
                    if !nested.is_empty() {
                        entries.push(SidebarEntry::Group(SidebarGroup {
                            label: child.display_label().into_owned(),
                            collapsed,
                            entries: nested,
                        }));
                    }
                }
                NodeKind::Group => {
                    entries.extend(self.directory_entries(child, depth + 1, collapsed));
                }
            }
        }
        entries
    }
}

fn explicit_entries(
    version: &str,
    spec: &SidebarGroupSpec,
    items: &[SidebarEntrySpec],
    pages: &HashMap<&str, &ContentNode>,
    field: &str,
) -> Result<Vec<SidebarEntry>, ResolveError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            SidebarEntrySpec::Internal { label, path } => pages
                .get(path.as_str())
                .map(|page| SidebarEntry::Link(page_link(page, label.clone())))
                .ok_or_else(|| ResolveError::DanglingSidebarLink {
                    version: version.to_owned(),
                    group: spec.label.clone(),
                    link: path.clone(),
                    field: format!("{field}.items[{index}]"),
                }),
            SidebarEntrySpec::External { label, url } => Ok(SidebarEntry::Link(SidebarLink {
                label: label.clone(),
                href: url.clone(),
                external: true,
            })),
        })
        .collect()
}

fn page_link(page: &ContentNode, label: Option<String>) -> SidebarLink {
    SidebarLink {
        label: label.unwrap_or_else(|| page.display_label().into_owned()),
        href: format!("/{}", page.url_path()),
        external: false,
    }
}
