//! Content tree of one version snapshot.
//!
//! A [`ContentNode`] is either a page (a content file) or a group (a
//! directory). Identifiers are normalized relative paths without file
//! extensions, `""` for the snapshot root.
//!
//! # Sibling Ordering
//!
//! Siblings whose name starts with a numeric prefix (`2-setup`, `10_intro`)
//! come first, in ascending numeric order. The rest follow in lexicographic
//! order of their display label. Ties fall back to the identifier, so the
//! order is total and identical on every run.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Numeric ordering prefix: digits, then `-` or `_`, then the rest of the name.
static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[-_](.+)$").expect("numeric prefix regex is valid"));

/// Kind of a content node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Content file.
    Page,
    /// Directory.
    Group,
}

/// Node of a version's content tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentNode {
    /// Normalized relative path without extension (e.g., "start/intro").
    pub id: String,
    /// Page or group.
    pub kind: NodeKind,
    /// Explicit display label from front matter or `meta.yaml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Left out of autogenerated sidebars.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Ordered children (groups only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a page node.
    #[must_use]
    pub fn page(id: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Page,
            label,
            hidden: false,
            children: Vec::new(),
        }
    }

    /// Create a group node with children in the given order.
    #[must_use]
    pub fn group(id: impl Into<String>, label: Option<String>, children: Vec<ContentNode>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Group,
            label,
            hidden: false,
            children,
        }
    }

    /// Mark the node as hidden from autogenerated sidebars.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether this node is a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// Last identifier segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }

    /// Explicit label, or one derived from the name.
    #[must_use]
    pub fn display_label(&self) -> Cow<'_, str> {
        match &self.label {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(slug_label(self.name())),
        }
    }

    /// URL path of the node, without leading slash.
    ///
    /// A trailing `index` segment maps to its directory:
    /// - `index` -> `""`
    /// - `guides/index` -> `"guides"`
    /// - `guides/setup` -> `"guides/setup"`
    #[must_use]
    pub fn url_path(&self) -> &str {
        if self.kind == NodeKind::Group {
            return &self.id;
        }
        if self.id == "index" {
            ""
        } else {
            self.id.strip_suffix("/index").unwrap_or(&self.id)
        }
    }

    /// Find a descendant (or this node) by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ContentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| {
            let is_ancestor = id
                .strip_prefix(child.id.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
            if child.id == id || is_ancestor {
                child.find(id)
            } else {
                None
            }
        })
    }

    /// All pages in the subtree, depth-first in sibling order.
    #[must_use]
    pub fn pages(&self) -> Vec<&ContentNode> {
        fn collect<'a>(node: &'a ContentNode, out: &mut Vec<&'a ContentNode>) {
            match node.kind {
                NodeKind::Page => out.push(node),
                NodeKind::Group => {
                    for child in &node.children {
                        collect(child, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }

    /// Sort children recursively using the sibling ordering policy.
    pub fn sort_children(&mut self) {
        self.children.sort_by(sibling_order);
        for child in &mut self.children {
            child.sort_children();
        }
    }
}

/// Split a name into its numeric ordering prefix and the remainder.
///
/// Returns `None` if the name has no prefix or the prefix doesn't fit in a `u64`.
#[must_use]
pub fn numeric_prefix(name: &str) -> Option<(u64, &str)> {
    let caps = NUMERIC_PREFIX.captures(name)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    Some((number, caps.get(2)?.as_str()))
}

/// Compare two siblings by the ordering policy.
#[must_use]
pub fn sibling_order(a: &ContentNode, b: &ContentNode) -> Ordering {
    let by_label = || {
        let (la, lb) = (a.display_label(), b.display_label());
        la.to_lowercase()
            .cmp(&lb.to_lowercase())
            .then_with(|| la.cmp(&lb))
            .then_with(|| a.id.cmp(&b.id))
    };

    match (numeric_prefix(a.name()), numeric_prefix(b.name())) {
        (Some((pa, _)), Some((pb, _))) => pa.cmp(&pb).then_with(by_label),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_label(),
    }
}

/// Derive a display label from a node name.
///
/// Drops the numeric ordering prefix and title-cases the rest.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slug_label("10-getting_started"), "Getting Started");
/// assert_eq!(slug_label("setup-guide"), "Setup Guide");
/// ```
#[must_use]
pub fn slug_label(name: &str) -> String {
    let slug = numeric_prefix(name).map_or(name, |(_, rest)| rest);
    match slug {
        "index" => "Overview".to_owned(),
        "" => "Untitled".to_owned(),
        slug => titlecase_from_slug(slug),
    }
}

/// Convert a slug (kebab-case or `snake_case`) to title case.
fn titlecase_from_slug(slug: &str) -> String {
    let mut result = String::with_capacity(slug.len());
    for word in slug.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}
