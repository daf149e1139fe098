//! Sidebar group declarations.
//!
//! [`SidebarGroupRaw`] mirrors the TOML shape, where a group may carry either
//! an `items` list or an `autogenerate` table. Validation turns it into a
//! [`SidebarGroupSpec`] whose [`SidebarSourceMode`] holds exactly one of them.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Sidebar group as declared in TOML.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SidebarGroupRaw {
    /// Group label.
    pub label: String,
    /// Explicit entries.
    pub items: Option<Vec<SidebarEntryRaw>>,
    /// Autogenerate source.
    pub autogenerate: Option<AutogenerateRaw>,
    /// Whether the renderer should show the group collapsed.
    pub collapsed: bool,
}

/// Explicit sidebar entry as declared in TOML.
///
/// Either a bare link (`"guides/setup"`) or a table with a link and label.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SidebarEntryRaw {
    /// Bare link; the label comes from the content.
    Link(String),
    /// Link with an explicit label.
    Labeled {
        /// Display label.
        #[serde(default)]
        label: Option<String>,
        /// Content path or absolute URL.
        link: String,
    },
}

/// Autogenerate source as declared in TOML.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AutogenerateRaw {
    /// Content directory relative to the snapshot root.
    pub directory: String,
}

/// Validated sidebar group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarGroupSpec {
    /// Group label.
    pub label: String,
    /// Where the group's entries come from.
    pub source: SidebarSourceMode,
    /// Whether the renderer should show the group collapsed.
    pub collapsed: bool,
}

/// Source of a sidebar group's entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarSourceMode {
    /// Entries listed in the configuration, in order.
    Explicit(Vec<SidebarEntrySpec>),
    /// Entries derived from a content directory.
    Autogenerate {
        /// Normalized directory identifier (e.g., "guides/advanced").
        directory: String,
    },
}

/// Validated explicit sidebar entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SidebarEntrySpec {
    /// Link to a content page, checked against the content tree at resolution.
    Internal {
        /// Explicit label; the page label is used when absent.
        label: Option<String>,
        /// Normalized page URL path ("" for the home page).
        path: String,
    },
    /// Link outside the site. Never checked against content or version-prefixed.
    External {
        /// Display label.
        label: String,
        /// Absolute URL.
        url: String,
    },
}

impl SidebarGroupRaw {
    /// Validate the group declared at `sidebar[index]`.
    pub(crate) fn to_spec(&self, index: usize) -> Result<SidebarGroupSpec, ConfigError> {
        let field = format!("sidebar[{index}]");

        if self.label.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("{field}.label"),
                "sidebar group label cannot be empty",
            ));
        }

        let source = match (&self.items, &self.autogenerate) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    field,
                    "sidebar group must declare either `items` or `autogenerate`, not both",
                ));
            }
            (None, None) => {
                return Err(ConfigError::invalid(
                    field,
                    "sidebar group must declare `items` or `autogenerate`",
                ));
            }
            (Some(items), None) => SidebarSourceMode::Explicit(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| item.to_spec(&format!("{field}.items[{i}]")))
                    .collect::<Result<_, _>>()?,
            ),
            (None, Some(auto)) => {
                let dir_field = format!("{field}.autogenerate.directory");
                let directory = normalize_relative_path(&auto.directory, &dir_field)?;
                if directory.is_empty() {
                    return Err(ConfigError::invalid(
                        dir_field,
                        "autogenerate directory cannot be empty",
                    ));
                }
                SidebarSourceMode::Autogenerate { directory }
            }
        };

        Ok(SidebarGroupSpec {
            label: self.label.clone(),
            source,
            collapsed: self.collapsed,
        })
    }
}

impl SidebarEntryRaw {
    fn to_spec(&self, field: &str) -> Result<SidebarEntrySpec, ConfigError> {
        let (label, link) = match self {
            Self::Link(link) => (None, link),
            Self::Labeled { label, link } => (label.clone(), link),
        };

        if let Some(label) = &label
            && label.trim().is_empty()
        {
            return Err(ConfigError::invalid(
                format!("{field}.label"),
                "sidebar entry label cannot be empty",
            ));
        }

        if is_external(link) {
            let label = label.ok_or_else(|| {
                ConfigError::invalid(
                    format!("{field}.label"),
                    "external sidebar links require a label",
                )
            })?;
            crate::validate::require_http_url(link, &format!("{field}.link"))?;
            return Ok(SidebarEntrySpec::External {
                label,
                url: link.clone(),
            });
        }

        // Site-rooted links ("/guides/setup/") are content paths too
        let path = normalize_relative_path(link.trim_start_matches('/'), &format!("{field}.link"))?;
        Ok(SidebarEntrySpec::Internal { label, path })
    }
}

/// Whether a link points outside the site.
fn is_external(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// Normalize a file or directory name into a content identifier segment.
///
/// Whitespace runs become `-` and the result is lowercased, so
/// `Getting Started` becomes `getting-started`. Returns `None` for a blank name.
#[must_use]
pub fn normalize_segment(name: &str) -> Option<String> {
    let segment = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    (!segment.is_empty()).then_some(segment)
}

/// Normalize a content-relative path, rejecting anything that could leave the content root.
///
/// Empty and `.` segments are dropped and every other segment goes through
/// [`normalize_segment`], so `./Guides//Getting Started/` becomes
/// `guides/getting-started`. Absolute paths, `..` segments and backslashes
/// are errors.
pub(crate) fn normalize_relative_path(path: &str, field: &str) -> Result<String, ConfigError> {
    if path.starts_with('/') {
        return Err(ConfigError::invalid(
            field,
            format!("'{path}' must be relative to the content root"),
        ));
    }
    if path.contains('\\') {
        return Err(ConfigError::invalid(
            field,
            format!("'{path}' must use '/' as the path separator"),
        ));
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{path}' must not contain '..'"),
                ));
            }
            s => segments.extend(normalize_segment(s)),
        }
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn autogenerate(label: &str, directory: &str) -> SidebarGroupRaw {
        SidebarGroupRaw {
            label: label.to_owned(),
            autogenerate: Some(AutogenerateRaw {
                directory: directory.to_owned(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_relative_path() {
        assert_eq!(normalize_relative_path("start", "f").unwrap(), "start");
        assert_eq!(
            normalize_relative_path("./guides//setup/", "f").unwrap(),
            "guides/setup"
        );
        assert_eq!(normalize_relative_path("", "f").unwrap(), "");
    }

    #[test]
    fn test_normalize_matches_content_identifiers() {
        assert_eq!(normalize_segment("Getting  Started"), Some("getting-started".to_owned()));
        assert_eq!(normalize_segment(" \t"), None);
        assert_eq!(
            normalize_relative_path("./Guides//Getting Started/", "f").unwrap(),
            "guides/getting-started"
        );
        assert_eq!(
            normalize_relative_path("reference/API", "f").unwrap(),
            "reference/api"
        );
    }

    #[test]
    fn test_normalize_rejects_traversal() {
        for path in ["..", "../outside", "guides/../../etc", "/etc", "a\\b"] {
            let err = normalize_relative_path(path, "sidebar[0].autogenerate.directory")
                .unwrap_err();
            assert_eq!(
                err.field(),
                Some("sidebar[0].autogenerate.directory"),
                "path {path:?}"
            );
        }
    }

    #[test]
    fn test_autogenerate_group_to_spec() {
        let spec = autogenerate("Start Here", "start/").to_spec(0).unwrap();
        assert_eq!(
            spec,
            SidebarGroupSpec {
                label: "Start Here".to_owned(),
                source: SidebarSourceMode::Autogenerate {
                    directory: "start".to_owned()
                },
                collapsed: false,
            }
        );
    }

    #[test]
    fn test_autogenerate_empty_directory_rejected() {
        let err = autogenerate("Root", "./").to_spec(3).unwrap_err();
        assert_eq!(err.field(), Some("sidebar[3].autogenerate.directory"));
    }

    #[test]
    fn test_group_requires_exactly_one_source() {
        let neither = SidebarGroupRaw {
            label: "Empty".to_owned(),
            ..Default::default()
        };
        assert_eq!(neither.to_spec(0).unwrap_err().field(), Some("sidebar[0]"));

        let both = SidebarGroupRaw {
            items: Some(Vec::new()),
            ..autogenerate("Both", "start")
        };
        let err = both.to_spec(1).unwrap_err();
        assert_eq!(err.field(), Some("sidebar[1]"));
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_group_label_required() {
        let err = autogenerate("  ", "start").to_spec(2).unwrap_err();
        assert_eq!(err.field(), Some("sidebar[2].label"));
    }

    #[test]
    fn test_explicit_entries_to_spec() {
        let toml = r#"
label = "Reference"
collapsed = true
items = [
    "/reference/api/",
    { label = "Config", link = "reference/config" },
    { label = "Changelog", link = "https://example.com/changelog" },
]
"#;
        let raw: SidebarGroupRaw = toml::from_str(toml).unwrap();
        let spec = raw.to_spec(0).unwrap();

        assert!(spec.collapsed);
        assert_eq!(
            spec.source,
            SidebarSourceMode::Explicit(vec![
                SidebarEntrySpec::Internal {
                    label: None,
                    path: "reference/api".to_owned(),
                },
                SidebarEntrySpec::Internal {
                    label: Some("Config".to_owned()),
                    path: "reference/config".to_owned(),
                },
                SidebarEntrySpec::External {
                    label: "Changelog".to_owned(),
                    url: "https://example.com/changelog".to_owned(),
                },
            ])
        );
    }

    #[test]
    fn test_external_entry_requires_label() {
        let raw = SidebarGroupRaw {
            label: "Links".to_owned(),
            items: Some(vec![SidebarEntryRaw::Link(
                "https://example.com".to_owned(),
            )]),
            ..Default::default()
        };
        let err = raw.to_spec(0).unwrap_err();
        assert_eq!(err.field(), Some("sidebar[0].items[0].label"));
    }

    #[test]
    fn test_internal_entry_traversal_rejected() {
        let raw = SidebarGroupRaw {
            label: "Links".to_owned(),
            items: Some(vec![
                SidebarEntryRaw::Link("Guides/Setup".to_owned()),
                SidebarEntryRaw::Link("../secrets".to_owned()),
            ]),
            ..Default::default()
        };
        let err = raw.to_spec(0).unwrap_err();
        assert_eq!(err.field(), Some("sidebar[0].items[1].link"));
    }
}
