//! Declared documentation versions.
//!
//! [`VersionRegistry`] is an immutable snapshot of the `[[versions]]` list.
//! Declaration order is preserved everywhere: it is the display order of any
//! version switcher, and its first entry is the canonical version served
//! without a URL prefix. Adding or removing a version means building a new
//! registry.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A declared documentation version.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionDescriptor {
    /// URL-safe identifier, also used as the routing segment.
    pub slug: String,
    /// Display label. Defaults to the slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Content snapshot location overriding the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_dir: Option<PathBuf>,
}

impl VersionDescriptor {
    /// Create a descriptor with only a slug.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            label: None,
            content_dir: None,
        }
    }

    /// Set the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the content snapshot location.
    #[must_use]
    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = Some(dir.into());
        self
    }

    /// Display label, falling back to the slug.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.slug)
    }
}

/// Ordered, validated set of versions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionRegistry {
    versions: Vec<VersionDescriptor>,
}

impl VersionRegistry {
    /// Build a registry from versions in declaration order.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoVersionsDeclared`] if `versions` is empty
    /// - [`ConfigError::DuplicateVersion`] if two entries share a slug
    /// - [`ConfigError::Validation`] if a slug is empty or not URL-safe
    pub fn register(versions: Vec<VersionDescriptor>) -> Result<Self, ConfigError> {
        if versions.is_empty() {
            return Err(ConfigError::NoVersionsDeclared);
        }

        let mut seen = HashSet::with_capacity(versions.len());
        for (i, version) in versions.iter().enumerate() {
            let field = format!("versions[{i}].slug");
            check_slug(&version.slug, &field)?;
            if !seen.insert(version.slug.as_str()) {
                return Err(ConfigError::DuplicateVersion {
                    slug: version.slug.clone(),
                    field,
                });
            }
        }

        Ok(Self { versions })
    }

    /// The canonical version (first declared).
    #[must_use]
    pub fn current(&self) -> &VersionDescriptor {
        // Non-empty by construction
        &self.versions[0]
    }

    /// Whether `slug` names the canonical version.
    #[must_use]
    pub fn is_canonical(&self, slug: &str) -> bool {
        self.current().slug == slug
    }

    /// Find a version by slug.
    #[must_use]
    pub fn lookup(&self, slug: &str) -> Option<&VersionDescriptor> {
        self.versions.iter().find(|v| v.slug == slug)
    }

    /// Position of a version in declaration order.
    #[must_use]
    pub fn rank(&self, slug: &str) -> Option<usize> {
        self.versions.iter().position(|v| v.slug == slug)
    }

    /// All versions in declaration order.
    #[must_use]
    pub fn all(&self) -> &[VersionDescriptor] {
        &self.versions
    }
}

/// Check that a slug is non-empty and safe to use as a URL and path segment.
fn check_slug(slug: &str, field: &str) -> Result<(), ConfigError> {
    if slug.is_empty() {
        return Err(ConfigError::invalid(field, "version slug cannot be empty"));
    }
    if let Some(c) = slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(ConfigError::invalid(
            field,
            format!("version slug '{slug}' contains '{c}'; use only A-Z, a-z, 0-9, '.', '_' and '-'"),
        ));
    }
    if slug.chars().all(|c| c == '.') {
        return Err(ConfigError::invalid(
            field,
            format!("version slug '{slug}' is not a valid path segment"),
        ));
    }
    Ok(())
}
