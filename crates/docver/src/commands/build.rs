//! `docver build` command implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use console::Term;
use docver_config::{CliSettings, Config, FailurePolicy};
use docver_site::{Engine, SiteOutput};

use crate::error::CliError;
use crate::output::Output;

/// Output directory relative to the config file's directory.
const DEFAULT_OUT_DIR: &str = ".docver/out";

/// Site file inside the output directory.
const SITE_FILE: &str = "site.json";

/// Per-version sidebar directory inside the output directory.
const SIDEBARS_DIR: &str = "sidebars";

/// Scratch directory the next output is written to before it replaces the current one.
const STAGING_DIR: &str = ".staging";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover docver.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory of the canonical version (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Output directory, or `-` to print the site JSON to stdout (default: .docver/out).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Publish the versions that build even if others fail.
    #[arg(long)]
    keep_going: bool,

    /// Maximum nesting of autogenerated sidebar groups (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a version fails, or the
    /// output can't be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            content_dir: self.content_dir,
            failure_policy: self.keep_going.then_some(FailurePolicy::Continue),
            max_depth: self.max_depth,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let out_dir = self.out.unwrap_or_else(|| {
            config
                .config_path
                .as_deref()
                .and_then(Path::parent)
                .map_or_else(|| PathBuf::from(DEFAULT_OUT_DIR), |dir| dir.join(DEFAULT_OUT_DIR))
        });

        let config = config.validate()?;
        let total = config.registry().all().len();
        output.status(
            "Building",
            format!(
                "{total} versions from {}",
                config.docs().content_dir.display()
            ),
        );

        let to_stdout = out_dir.as_os_str() == "-";
        let site = match Engine::new(config).build() {
            Ok(site) => site,
            Err(e) => {
                if !to_stdout {
                    discard_output(&out_dir)?;
                }
                return Err(e.into());
            }
        };
        for failure in &site.failures {
            output.warning("Skipped", format!("{}: {}", failure.slug, failure.error));
        }

        if to_stdout {
            Term::stdout().write_line(&serde_json::to_string_pretty(&site)?)?;
        } else {
            write_output(&site, &out_dir)?;
            output.status(
                "Finished",
                format!(
                    "{} of {total} versions in {}",
                    site.versions.len(),
                    out_dir.display()
                ),
            );
        }

        if site.is_complete() {
            Ok(())
        } else {
            Err(CliError::Incomplete {
                failed: site.failures.len(),
                total,
            })
        }
    }
}

/// Replace `site.json` and `sidebars/` with the output of this build.
///
/// Everything is written to a staging directory first; the previous output,
/// including sidebars of versions no longer declared, is removed only after
/// the new output is complete. Other files in `out_dir` are left alone.
fn write_output(site: &SiteOutput, out_dir: &Path) -> Result<(), CliError> {
    let staging = out_dir.join(STAGING_DIR);
    remove_if_exists(&staging)?;
    let sidebars_dir = staging.join(SIDEBARS_DIR);
    fs::create_dir_all(&sidebars_dir)?;

    fs::write(staging.join(SITE_FILE), serde_json::to_string_pretty(site)?)?;
    for version in &site.versions {
        let path = sidebars_dir.join(format!("{}.json", version.slug));
        fs::write(&path, serde_json::to_string_pretty(&version.sidebar)?)?;
        tracing::debug!(version = %version.slug, path = %path.display(), "Wrote sidebar");
    }

    discard_output(out_dir)?;
    fs::rename(&sidebars_dir, out_dir.join(SIDEBARS_DIR))?;
    fs::rename(staging.join(SITE_FILE), out_dir.join(SITE_FILE))?;
    fs::remove_dir(&staging)?;
    Ok(())
}

/// Remove the output of a previous build so it can't be mistaken for current.
fn discard_output(out_dir: &Path) -> Result<(), CliError> {
    remove_if_exists(&out_dir.join(SITE_FILE))?;
    remove_if_exists(&out_dir.join(SIDEBARS_DIR))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
