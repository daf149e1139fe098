//! Startup validation of the whole configuration.
//!
//! [`validate`] is the only way to obtain a [`ValidatedConfig`], so no build
//! stage can observe a configuration that has not passed every check. The
//! first violated rule is returned; checks run in a fixed order (plugins,
//! site, versions, sidebar, build options) so the same file always reports
//! the same error.

use std::collections::HashSet;

use crate::sidebar::SidebarGroupSpec;
use crate::site::{PluginDescriptor, SiteMetadata};
use crate::versions::VersionRegistry;
use crate::{BuildConfig, Config, ConfigError, DocsConfig};

/// Configuration that has passed validation.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    site: SiteMetadata,
    plugins: Vec<PluginDescriptor>,
    sidebar: Vec<SidebarGroupSpec>,
    registry: VersionRegistry,
    docs: DocsConfig,
    build: BuildConfig,
}

impl ValidatedConfig {
    /// Site metadata for the renderer.
    #[must_use]
    pub fn site(&self) -> &SiteMetadata {
        &self.site
    }

    /// Plugin descriptors in declaration order.
    #[must_use]
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    /// Sidebar groups in declaration order.
    #[must_use]
    pub fn sidebar(&self) -> &[SidebarGroupSpec] {
        &self.sidebar
    }

    /// Declared versions.
    #[must_use]
    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    /// Content locations.
    #[must_use]
    pub fn docs(&self) -> &DocsConfig {
        &self.docs
    }

    /// Build options.
    #[must_use]
    pub fn build(&self) -> &BuildConfig {
        &self.build
    }
}

/// Validate a loaded configuration.
///
/// # Errors
///
/// Returns the first violated rule with the path to the offending field.
pub fn validate(config: &Config) -> Result<ValidatedConfig, ConfigError> {
    validate_plugins(&config.plugins)?;
    validate_site(&config.site)?;
    let registry = VersionRegistry::register(config.versions.clone())?;

    if config.sidebar.is_empty() {
        return Err(ConfigError::NoSidebarGroups);
    }
    let sidebar = config
        .sidebar
        .iter()
        .enumerate()
        .map(|(i, group)| group.to_spec(i))
        .collect::<Result<Vec<_>, _>>()?;

    validate_build(&config.build)?;
    validate_excludes(&config.docs_resolved.exclude)?;

    tracing::debug!(
        versions = registry.all().len(),
        groups = sidebar.len(),
        plugins = config.plugins.len(),
        "Configuration validated"
    );

    Ok(ValidatedConfig {
        site: config.site.clone(),
        plugins: config.plugins.clone(),
        sidebar,
        registry,
        docs: config.docs_resolved.clone(),
        build: config.build.clone(),
    })
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(field, "cannot be empty"));
    }
    Ok(())
}

/// Require a URL field to be an absolute `http://` or `https://` URL.
pub(crate) fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    else {
        return Err(ConfigError::invalid(
            field,
            format!("'{url}' must start with http:// or https://"),
        ));
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid(
            field,
            format!("'{url}' is not a well-formed URL"),
        ));
    }
    Ok(())
}

fn validate_plugins(plugins: &[PluginDescriptor]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(plugins.len());
    for (i, plugin) in plugins.iter().enumerate() {
        let field = format!("plugins[{i}].id");
        require_non_empty(&plugin.id, &field)?;
        if !seen.insert(plugin.id.as_str()) {
            return Err(ConfigError::DuplicatePlugin {
                id: plugin.id.clone(),
                field,
            });
        }
    }
    Ok(())
}

fn validate_site(site: &SiteMetadata) -> Result<(), ConfigError> {
    if let Some(base_url) = &site.base_url
        && !base_url.starts_with('/')
    {
        require_http_url(base_url, "site.base_url")?;
    }

    if let Some(edit_url) = &site.edit_link_base_url {
        require_http_url(edit_url, "site.edit_link_base_url")?;
    }

    for (i, tag) in site.head_tags.iter().enumerate() {
        require_non_empty(&tag.tag, &format!("site.head_tags[{i}].tag"))?;
        for (name, value) in &tag.attributes {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("site.head_tags[{i}].attributes"),
                    "attribute names cannot be empty",
                ));
            }
            if !value.is_str() {
                return Err(ConfigError::invalid(
                    format!("site.head_tags[{i}].attributes.{name}"),
                    format!("attribute value must be a string, got {}", value.type_str()),
                ));
            }
        }
    }

    for (i, link) in site.social.iter().enumerate() {
        require_non_empty(&link.label, &format!("site.social[{i}].label"))?;
        require_http_url(&link.url, &format!("site.social[{i}].url"))?;
    }

    Ok(())
}

fn validate_build(build: &BuildConfig) -> Result<(), ConfigError> {
    if build.max_depth == Some(0) {
        return Err(ConfigError::invalid(
            "build.max_depth",
            "must be at least 1 (omit it for unlimited nesting)",
        ));
    }
    Ok(())
}

fn validate_excludes(patterns: &[String]) -> Result<(), ConfigError> {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(ConfigError::invalid(
                format!("docs.exclude[{i}]"),
                format!("invalid glob pattern '{pattern}': {e}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{SidebarSourceMode, VersionDescriptor};

    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
[[versions]]
slug = "0.0.0"

[[sidebar]]
label = "Start Here"
autogenerate = { directory = "start" }
"#;

    fn parse(toml: &str) -> Config {
        Config::parse(toml, Path::new("/project")).unwrap()
    }

    /// Assert that validation fails on `field` with expected substrings in the message.
    fn assert_validation_error(config: &Config, field: &str, expected_substrings: &[&str]) {
        let result = validate(config);
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert_eq!(err.field(), Some(field), "unexpected field for {err:?}");
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_minimal_config() {
        let validated = validate(&parse(MINIMAL)).unwrap();

        assert_eq!(validated.registry().current().slug, "0.0.0");
        assert_eq!(validated.sidebar().len(), 1);
        assert_eq!(
            validated.sidebar()[0].source,
            SidebarSourceMode::Autogenerate {
                directory: "start".to_owned()
            }
        );
        assert!(validated.plugins().is_empty());
    }

    #[test]
    fn test_validate_no_versions() {
        let config = parse(
            r#"
[[sidebar]]
label = "Start Here"
autogenerate = { directory = "start" }
"#,
        );
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::NoVersionsDeclared));
    }

    #[test]
    fn test_validate_duplicate_versions() {
        let mut config = parse(MINIMAL);
        config.versions.push(VersionDescriptor::new("1.0"));
        config.versions.push(VersionDescriptor::new("0.0.0"));
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateVersion { .. }));
        assert_eq!(err.field(), Some("versions[2].slug"));
    }

    #[test]
    fn test_validate_no_sidebar_groups() {
        let config = parse("[[versions]]\nslug = \"1.0\"\n");
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::NoSidebarGroups));
    }

    #[test]
    fn test_validate_duplicate_plugins() {
        let toml = format!(
            "{MINIMAL}\n[[plugins]]\nid = \"starlight\"\n\n[[plugins]]\nid = \"versions\"\n\n[[plugins]]\nid = \"starlight\"\n"
        );
        let err = validate(&parse(&toml)).unwrap_err();
        let ConfigError::DuplicatePlugin { id, field } = err else {
            panic!("Expected DuplicatePlugin");
        };
        assert_eq!(id, "starlight");
        assert_eq!(field, "plugins[2].id");
    }

    #[test]
    fn test_validate_empty_plugin_id() {
        let toml = format!("{MINIMAL}\n[[plugins]]\nid = \"\"\n");
        assert_validation_error(&parse(&toml), "plugins[0].id", &["empty"]);
    }

    #[test]
    fn test_validate_plugins_checked_before_versions() {
        let toml = r#"
[[plugins]]
id = "a"

[[plugins]]
id = "a"
"#;
        let err = validate(&parse(toml)).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePlugin { .. }));
    }

    #[test]
    fn test_validate_edit_link_must_be_absolute() {
        let mut config = parse(MINIMAL);
        config.site.edit_link_base_url = Some("github.com/org/repo".to_owned());
        assert_validation_error(&config, "site.edit_link_base_url", &["http"]);
    }

    #[test]
    fn test_validate_edit_link_needs_host() {
        let mut config = parse(MINIMAL);
        config.site.edit_link_base_url = Some("https:///edit".to_owned());
        assert_validation_error(&config, "site.edit_link_base_url", &["well-formed"]);
    }

    #[test]
    fn test_validate_base_url_accepts_path_or_url() {
        let mut config = parse(MINIMAL);
        config.site.base_url = Some("/docs".to_owned());
        assert!(validate(&config).is_ok());

        config.site.base_url = Some("https://docs.example.com".to_owned());
        assert!(validate(&config).is_ok());

        config.site.base_url = Some("docs".to_owned());
        assert_validation_error(&config, "site.base_url", &["http"]);
    }

    #[test]
    fn test_validate_social_url() {
        let toml = format!(
            "[site]\nsocial = [{{ label = \"github\", url = \"https://github.com/org\" }}, {{ label = \"chat\", url = \"discord\" }}]\n{MINIMAL}"
        );
        assert_validation_error(&parse(&toml), "site.social[1].url", &["http"]);
    }

    #[test]
    fn test_validate_head_tag_name() {
        let toml = format!("[[site.head_tags]]\ntag = \"\"\n{MINIMAL}");
        assert_validation_error(&parse(&toml), "site.head_tags[0].tag", &["empty"]);

        let toml = format!(
            "[[site.head_tags]]\ntag = \"meta\"\nattributes = {{ async = true }}\n{MINIMAL}"
        );
        assert_validation_error(
            &parse(&toml),
            "site.head_tags[0].attributes.async",
            &["string", "boolean"],
        );
    }

    #[test]
    fn test_validate_sidebar_traversal() {
        let toml = r#"
[[versions]]
slug = "1.0"

[[sidebar]]
label = "Start Here"
autogenerate = { directory = "start" }

[[sidebar]]
label = "Escape"
autogenerate = { directory = "../../etc" }
"#;
        assert_validation_error(
            &parse(toml),
            "sidebar[1].autogenerate.directory",
            &[".."],
        );
    }

    #[test]
    fn test_validate_max_depth_zero() {
        let mut config = parse(MINIMAL);
        config.build.max_depth = Some(0);
        assert_validation_error(&config, "build.max_depth", &["at least 1"]);
    }

    #[test]
    fn test_validate_exclude_patterns() {
        let toml = format!("[docs]\nexclude = [\"drafts/**\", \"[\"]\n{MINIMAL}");
        assert_validation_error(&parse(&toml), "docs.exclude[1]", &["glob"]);
    }

    #[test]
    fn test_require_http_url() {
        assert!(require_http_url("https://example.com", "f").is_ok());
        assert!(require_http_url("http://localhost:4321/edit/", "f").is_ok());
        assert!(require_http_url("ftp://example.com", "f").is_err());
        assert!(require_http_url("https://", "f").is_err());
        assert!(require_http_url("https://exa mple.com", "f").is_err());
    }
}
