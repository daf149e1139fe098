//! Pass-through site metadata and plugin descriptors.
//!
//! None of these values influence navigation resolution. They are checked for
//! well-formedness during validation and handed to the renderer as declared.

use serde::{Deserialize, Serialize};

/// Site-wide metadata handed to the renderer unchanged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteMetadata {
    /// Site title.
    pub title: String,
    /// Base URL the site is served from (absolute URL or `/`-rooted path).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// URL the renderer appends a content-relative path to for "edit this page" links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_link_base_url: Option<String>,
    /// Extra tags injected into every page head, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub head_tags: Vec<HeadTag>,
    /// Social links in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub social: Vec<SocialLink>,
}

/// A tag injected into the page head.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HeadTag {
    /// Element name (e.g., "meta", "script").
    pub tag: String,
    /// Element attributes in declaration order. Values must be strings.
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub attributes: toml::Table,
    /// Inner content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A labeled social link.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SocialLink {
    /// Platform label (e.g., "github").
    pub label: String,
    /// Absolute link target.
    pub url: String,
}

/// A plugin registration.
///
/// Plugins are injected into the engine through the validated configuration;
/// their options are opaque and passed through to the renderer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PluginDescriptor {
    /// Plugin identifier (e.g., "starlight").
    pub id: String,
    /// Plugin-specific options.
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub options: toml::Table,
}
