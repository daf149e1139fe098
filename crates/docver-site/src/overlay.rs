//! Version overlay.
//!
//! The canonical version (first declared) is served at the site root. Every
//! other version is served under `/<slug>`, so its internal sidebar links
//! are rewritten with that prefix. External links are never touched.
//!
//! | Version   | Source link    | Published href       |
//! |-----------|----------------|----------------------|
//! | canonical | `/start/intro` | `/start/intro`       |
//! | `0.0.0`   | `/start/intro` | `/0.0.0/start/intro` |
//! | `0.0.0`   | `/`            | `/0.0.0`             |

use std::path::PathBuf;

use docver_config::{DocsConfig, VersionDescriptor, VersionRegistry};

use crate::sidebar::{ResolvedSidebar, SidebarEntry, SidebarGroup};

/// Applies version routing to resolved sidebars.
#[derive(Clone, Copy, Debug)]
pub struct VersionOverlay<'a> {
    registry: &'a VersionRegistry,
}

impl<'a> VersionOverlay<'a> {
    /// Create an overlay for the declared versions.
    #[must_use]
    pub fn new(registry: &'a VersionRegistry) -> Self {
        Self { registry }
    }

    /// URL prefix of a version, `None` for the canonical version.
    #[must_use]
    pub fn prefix(&self, version: &str) -> Option<String> {
        (!self.registry.is_canonical(version)).then(|| format!("/{version}"))
    }

    /// Rewrite a sidebar's internal hrefs for the version's route.
    ///
    /// Group structure, labels and order are preserved.
    #[must_use]
    pub fn overlay(&self, version: &str, sidebar: ResolvedSidebar) -> ResolvedSidebar {
        let Some(prefix) = self.prefix(version) else {
            return sidebar;
        };
        ResolvedSidebar {
            groups: sidebar
                .groups
                .into_iter()
                .map(|group| prefix_group(group, &prefix))
                .collect(),
        }
    }

    /// Location of a version's content snapshot.
    ///
    /// An explicit `content_dir` on the version wins. Otherwise the canonical
    /// version reads `docs.content_dir` and the others read
    /// `<docs.versions_dir>/<slug>`.
    #[must_use]
    pub fn snapshot_root(&self, version: &VersionDescriptor, docs: &DocsConfig) -> PathBuf {
        if let Some(dir) = &version.content_dir {
            dir.clone()
        } else if self.registry.is_canonical(&version.slug) {
            docs.content_dir.clone()
        } else {
            docs.versions_dir.join(&version.slug)
        }
    }
}

fn prefix_group(group: SidebarGroup, prefix: &str) -> SidebarGroup {
    SidebarGroup {
        entries: group
            .entries
            .into_iter()
            .map(|entry| match entry {
                SidebarEntry::Link(mut link) if !link.external => {
                    link.href = if link.href == "/" {
                        prefix.to_owned()
                    } else {
                        format!("{prefix}{}", link.href)
                    };
                    SidebarEntry::Link(link)
                }
                SidebarEntry::Link(link) => SidebarEntry::Link(link),
                SidebarEntry::Group(nested) => SidebarEntry::Group(prefix_group(nested, prefix)),
            })
            .collect(),
        ..group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use pretty_assertions::assert_eq;

    use crate::sidebar::SidebarLink;

    fn registry() -> VersionRegistry {
        VersionRegistry::register(vec![
            VersionDescriptor::new("1.0"),
            VersionDescriptor::new("0.0.0"),
            VersionDescriptor::new("0.9").with_content_dir("/archive/0.9"),
        ])
        .unwrap()
    }

    fn link(href: &str, external: bool) -> SidebarEntry {
        SidebarEntry::Link(SidebarLink {
            label: "Page".to_owned(),
            href: href.to_owned(),
            external,
        })
    }

    fn sidebar() -> ResolvedSidebar {
        ResolvedSidebar {
            groups: vec![SidebarGroup {
                label: "Start Here".to_owned(),
                collapsed: true,
                entries: vec![
                    link("/start/intro", false),
                    link("/", false),
                    link("https://example.com/", true),
                    SidebarEntry::Group(SidebarGroup {
                        label: "Nested".to_owned(),
                        collapsed: true,
                        entries: vec![link("/start/deep/page", false)],
                    }),
                ],
            }],
        }
    }

    #[test]
    fn test_canonical_version_unchanged() {
        let registry = registry();
        let overlay = VersionOverlay::new(&registry);

        assert_eq!(overlay.prefix("1.0"), None);
        assert_eq!(overlay.overlay("1.0", sidebar()), sidebar());
    }

    #[test]
    fn test_non_canonical_version_prefixed() {
        let registry = registry();
        let overlay = VersionOverlay::new(&registry);

        let result = overlay.overlay("0.0.0", sidebar());

        let expected = ResolvedSidebar {
            groups: vec![SidebarGroup {
                label: "Start Here".to_owned(),
                collapsed: true,
                entries: vec![
                    link("/0.0.0/start/intro", false),
                    link("/0.0.0", false),
                    link("https://example.com/", true),
                    SidebarEntry::Group(SidebarGroup {
                        label: "Nested".to_owned(),
                        collapsed: true,
                        entries: vec![link("/0.0.0/start/deep/page", false)],
                    }),
                ],
            }],
        };
        assert_eq!(result, expected);
    }

    #[test]
    fn test_snapshot_root() {
        let registry = registry();
        let overlay = VersionOverlay::new(&registry);
        let docs = DocsConfig {
            content_dir: "/site/src/content/docs".into(),
            versions_dir: "/site/src/content/versions".into(),
            exclude: Vec::new(),
        };

        let roots: Vec<_> = registry
            .all()
            .iter()
            .map(|v| overlay.snapshot_root(v, &docs))
            .collect();

        assert_eq!(
            roots,
            vec![
                Path::new("/site/src/content/docs").to_path_buf(),
                Path::new("/site/src/content/versions/0.0.0").to_path_buf(),
                Path::new("/archive/0.9").to_path_buf(),
            ]
        );
    }
}
