//! Configuration management for docver.
//!
//! Parses `docver.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. A loaded [`Config`]
//! is raw: nothing downstream may consume it until [`Config::validate`] has
//! turned it into a [`ValidatedConfig`].
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.base_url`
//! - `site.edit_link_base_url`
//! - `docs.content_dir`
//! - `docs.versions_dir`
//! - `versions[].content_dir`

mod expand;
mod sidebar;
mod site;
mod validate;
mod versions;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use sidebar::{
    SidebarEntrySpec, SidebarGroupRaw, SidebarGroupSpec, SidebarSourceMode, normalize_segment,
};
pub use site::{HeadTag, PluginDescriptor, SiteMetadata, SocialLink};
pub use validate::{ValidatedConfig, validate};
pub use versions::{VersionDescriptor, VersionRegistry};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the canonical content directory.
    pub content_dir: Option<PathBuf>,
    /// Override the per-version failure policy.
    pub failure_policy: Option<FailurePolicy>,
    /// Override the sidebar nesting depth limit.
    pub max_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docver.toml";

/// Application configuration as declared in `docver.toml`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site metadata passed through to the renderer.
    pub site: SiteMetadata,
    /// Content location configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Build pipeline options.
    pub build: BuildConfig,
    /// Plugin descriptors in declaration order.
    pub plugins: Vec<PluginDescriptor>,
    /// Declared versions; the first entry is canonical.
    pub versions: Vec<VersionDescriptor>,
    /// Sidebar groups in declaration order.
    pub sidebar: Vec<SidebarGroupRaw>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    content_dir: Option<String>,
    versions_dir: Option<String>,
    exclude: Vec<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocsConfig {
    /// Content snapshot of the canonical version.
    pub content_dir: PathBuf,
    /// Parent directory of non-canonical version snapshots (`<versions_dir>/<slug>`).
    pub versions_dir: PathBuf,
    /// Glob patterns of content paths to leave out of the index.
    pub exclude: Vec<String>,
}

/// What happens to the rest of the build when one version fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Any version failure fails the whole build and discards all output.
    #[default]
    AbortAll,
    /// Failed versions are reported; the remaining versions still publish.
    Continue,
}

/// Build pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Per-version failure policy.
    pub failure_policy: FailurePolicy,
    /// Maximum nesting of autogenerated sub-groups. `None` means unlimited.
    pub max_depth: Option<usize>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds an invalid value.
    #[error("Configuration error in {field}: {message}")]
    Validation {
        /// Path to the offending field (e.g., "`sidebar[1].autogenerate.directory`").
        field: String,
        /// What is wrong with it.
        message: String,
    },
    /// Two versions share a slug.
    #[error("Duplicate version slug '{slug}' in {field}")]
    DuplicateVersion {
        /// The repeated slug.
        slug: String,
        /// Path to the second occurrence.
        field: String,
    },
    /// The version list is empty.
    #[error("No versions declared: at least one [[versions]] entry is required")]
    NoVersionsDeclared,
    /// Two plugins share an identifier.
    #[error("Duplicate plugin '{id}' in {field}")]
    DuplicatePlugin {
        /// The repeated plugin identifier.
        id: String,
        /// Path to the second occurrence.
        field: String,
    },
    /// The sidebar declares no groups.
    #[error("No sidebar groups declared: at least one [[sidebar]] entry is required")]
    NoSidebarGroups,
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_HOST`} not set").
        message: String,
    },
}

impl ConfigError {
    /// Path to the configuration field the error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. }
            | Self::DuplicateVersion { field, .. }
            | Self::DuplicatePlugin { field, .. }
            | Self::EnvVar { field, .. } => Some(field),
            Self::NoVersionsDeclared => Some("versions"),
            Self::NoSidebarGroups => Some("sidebar"),
            Self::NotFound(_) | Self::Io(_) | Self::Parse(_) => None,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docver.toml` in current directory and parents.
    ///
    /// The returned configuration is not validated; call [`Config::validate`]
    /// before handing it to the build pipeline.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// Environment variables are expanded and relative paths are resolved
    /// against `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or an environment variable is unset.
    pub fn parse(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;
        config.resolve_paths(config_dir);

        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule, with the path to the offending field.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        validate::validate(self)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.docs_resolved.content_dir.clone_from(content_dir);
        }
        if let Some(policy) = settings.failure_policy {
            self.build.failure_policy = policy;
        }
        if let Some(max_depth) = settings.max_depth {
            self.build.max_depth = Some(max_depth);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteMetadata::default(),
            docs: DocsConfigRaw::default(),
            build: BuildConfig::default(),
            plugins: Vec::new(),
            versions: Vec::new(),
            sidebar: Vec::new(),
            docs_resolved: DocsConfig {
                content_dir: base.join("src/content/docs"),
                versions_dir: base.join("src/content/versions"),
                exclude: Vec::new(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::parse(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let expander = expand::Expander::from_env();
        expander.field(&mut self.site.base_url, "site.base_url")?;
        expander.field(&mut self.site.edit_link_base_url, "site.edit_link_base_url")?;
        expander.field(&mut self.docs.content_dir, "docs.content_dir")?;
        expander.field(&mut self.docs.versions_dir, "docs.versions_dir")?;
        for (i, version) in self.versions.iter_mut().enumerate() {
            expander.path(&mut version.content_dir, &format!("versions[{i}].content_dir"))?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            content_dir: resolve(self.docs.content_dir.as_deref(), "src/content/docs"),
            versions_dir: resolve(self.docs.versions_dir.as_deref(), "src/content/versions"),
            exclude: self.docs.exclude.clone(),
        };

        for version in &mut self.versions {
            if let Some(dir) = version.content_dir.take() {
                version.content_dir = Some(config_dir.join(dir));
            }
        }
    }
}
