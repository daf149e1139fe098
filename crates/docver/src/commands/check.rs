//! `docver check` command implementation.

use std::path::PathBuf;

use clap::Args;
use docver_config::{Config, SidebarSourceMode, ValidatedConfig};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover docver.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration can't be loaded or is invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        match &config.config_path {
            Some(path) => output.status("Checking", path.display()),
            None => output.warning("Checking", "no docver.toml found, using defaults"),
        }

        let config = config.validate()?;

        for (label, value) in summary(&config) {
            output.status(label, value);
        }
        output.status("Finished", "configuration is valid");
        Ok(())
    }
}

/// Labeled summary lines of a validated configuration.
fn summary(config: &ValidatedConfig) -> Vec<(&'static str, String)> {
    let registry = config.registry();
    let versions: Vec<_> = registry
        .all()
        .iter()
        .map(|v| {
            if registry.is_canonical(&v.slug) {
                format!("{} (canonical)", v.slug)
            } else {
                v.slug.clone()
            }
        })
        .collect();

    let groups: Vec<_> = config
        .sidebar()
        .iter()
        .map(|group| match &group.source {
            SidebarSourceMode::Explicit(items) => format!("{} ({} items)", group.label, items.len()),
            SidebarSourceMode::Autogenerate { directory } => {
                format!("{} (autogenerate: {directory})", group.label)
            }
        })
        .collect();

    let plugins: Vec<_> = config.plugins().iter().map(|p| p.id.as_str()).collect();
    let plugins = if plugins.is_empty() {
        "none".to_owned()
    } else {
        plugins.join(", ")
    };

    vec![
        ("Versions", versions.join(", ")),
        ("Sidebar", groups.join(", ")),
        ("Plugins", plugins),
        ("Content", config.docs().content_dir.display().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary() {
        let toml = r#"
[docs]
content_dir = "docs"

[[plugins]]
id = "search"

[[versions]]
slug = "1.0"

[[versions]]
slug = "0.9"

[[sidebar]]
label = "Start Here"
items = ["start/intro", { label = "Setup", link = "start/setup" }]

[[sidebar]]
label = "Guides"
autogenerate = { directory = "guides" }
"#;
        let config = Config::parse(toml, Path::new("/site"))
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(
            summary(&config),
            vec![
                ("Versions", "1.0 (canonical), 0.9".to_owned()),
                (
                    "Sidebar",
                    "Start Here (2 items), Guides (autogenerate: guides)".to_owned()
                ),
                ("Plugins", "search".to_owned()),
                ("Content", "/site/docs".to_owned()),
            ]
        );
    }

    #[test]
    fn test_summary_without_plugins() {
        let toml = r#"
[[versions]]
slug = "main"

[[sidebar]]
label = "Docs"
autogenerate = { directory = "docs" }
"#;
        let config = Config::parse(toml, Path::new("/site"))
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(summary(&config)[2], ("Plugins", "none".to_owned()));
    }
}
