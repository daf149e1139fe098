//! `${VAR}` and `${VAR:-default}` references in configuration strings.
//!
//! Only the braced form is recognized; `$VAR` stays literal so URLs and
//! paths containing a dollar sign pass through.

use std::env::VarError;
use std::path::PathBuf;

use crate::ConfigError;

/// Expands references in config fields with a variable lookup.
pub(crate) struct Expander<F> {
    lookup: F,
}

impl Expander<fn(&str) -> Result<String, VarError>> {
    /// Expander reading the process environment.
    pub(crate) fn from_env() -> Self {
        Self {
            lookup: |name| std::env::var(name),
        }
    }
}

impl<F> Expander<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    #[cfg(test)]
    fn with_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    /// Expand an optional string field in place.
    pub(crate) fn field(&self, value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
        if let Some(current) = value.as_deref() {
            *value = Some(self.expand(current, field)?);
        }
        Ok(())
    }

    /// Expand an optional path field in place. Non-UTF-8 paths are left as they are.
    pub(crate) fn path(&self, value: &mut Option<PathBuf>, field: &str) -> Result<(), ConfigError> {
        if let Some(current) = value.as_deref().and_then(|p| p.to_str()) {
            *value = Some(PathBuf::from(self.expand(current, field)?));
        }
        Ok(())
    }

    fn expand(&self, value: &str, field: &str) -> Result<String, ConfigError> {
        if !value.contains("${") {
            return Ok(value.to_owned());
        }

        shellexpand::env_with_context(value, |name| (self.lookup)(name).map(Some))
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| {
                let name = e.var_name;
                let message = match e.cause {
                    VarError::NotPresent => format!("${{{name}}} not set"),
                    VarError::NotUnicode(_) => format!("${{{name}}} is not valid UTF-8"),
                };
                ConfigError::EnvVar {
                    field: field.to_owned(),
                    message,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::ffi::OsString;

    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_field_expands_embedded_reference() {
        let expander = Expander::with_lookup(vars(&[("ORG", "acme")]));
        let mut value = Some("https://github.com/${ORG}/docs/edit/main/".to_owned());

        expander.field(&mut value, "site.edit_link_base_url").unwrap();

        assert_eq!(value.as_deref(), Some("https://github.com/acme/docs/edit/main/"));
    }

    #[test]
    fn test_default_used_when_unset() {
        let expander = Expander::with_lookup(vars(&[]));
        let mut value = Some("${DOCS:-docs}/${MISSING:-}".to_owned());

        expander.field(&mut value, "docs.content_dir").unwrap();

        assert_eq!(value.as_deref(), Some("docs/"));
    }

    #[test]
    fn test_unset_reference_names_field() {
        let expander = Expander::with_lookup(vars(&[]));
        let mut value = Some("${VERSIONS_ROOT}".to_owned());

        let err = expander.field(&mut value, "docs.versions_dir").unwrap_err();

        assert_eq!(err.field(), Some("docs.versions_dir"));
        assert!(err.to_string().contains("${VERSIONS_ROOT} not set"));
    }

    #[test]
    fn test_non_utf8_value_reported() {
        let expander = Expander::with_lookup(|_: &str| -> Result<String, VarError> {
            Err(VarError::NotUnicode(OsString::from("x")))
        });
        let mut value = Some("${BROKEN}".to_owned());

        let err = expander.field(&mut value, "site.base_url").unwrap_err();

        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_path_field() {
        let expander = Expander::with_lookup(vars(&[("ARCHIVE", "/srv/archive")]));
        let mut value = Some(PathBuf::from("${ARCHIVE}/0.9"));
        let mut absent: Option<PathBuf> = None;

        expander.path(&mut value, "versions[1].content_dir").unwrap();
        expander.path(&mut absent, "versions[2].content_dir").unwrap();

        assert_eq!(value, Some(PathBuf::from("/srv/archive/0.9")));
        assert_eq!(absent, None);
    }

    #[test]
    fn test_bare_dollar_is_literal() {
        let expander = Expander::with_lookup(vars(&[("version", "1.0")]));
        let mut value = Some("/docs/$version".to_owned());

        expander.field(&mut value, "site.base_url").unwrap();

        assert_eq!(value.as_deref(), Some("/docs/$version"));
    }
}
