//! Engine configuration.
//!
//! Embedders either build an [`EngineConfig`] in code or load one from a
//! TOML document:
//!
//! ```toml
//! missing-condition = "skip"
//! max-nesting = 16
//! name-prefix = "Wire"
//! ```
//!
//! Missing keys fall back to [`EngineConfig::default`].
use std::path::Path;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// What a conditional step does when its condition cannot be evaluated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionPolicy {
    /// Report the failure to the caller of `invoke`.
    #[default]
    Error,

    /// Run neither branch and carry on with the next step.
    ///
    /// This reproduces the behavior of the first editor prototypes, where a
    /// condition that failed to evaluate silently skipped the whole branch.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    pub missing_condition: ConditionPolicy,

    /// Maximum depth of nested conditional steps.
    pub max_nesting: usize,

    /// Prefix of the names handed out by [`crate::names::VariableNameGenerator`].
    pub name_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            missing_condition: ConditionPolicy::default(),
            max_nesting: 64,
            name_prefix: "Variable".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading configuration file '{file}': {source}")]
    Io {
        source: std::io::Error,
        file: String,
    },

    #[error("Failed to parse configuration file '{file}': {source}")]
    Parse {
        source: toml::de::Error,
        file: String,
    },
}

impl EngineConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Self::parse(source, "<inline>")
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            file: file.clone(),
        })?;
        Self::parse(&source, &file)
    }

    fn parse(source: &str, file: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source).map_err(|source| ConfigError::Parse {
            source,
            file: file.to_string(),
        })?;
        debug!("Loaded engine configuration from {}: {:?}", file, config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn keys_override_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
missing-condition = "skip"
max-nesting = 3
"#,
        )
        .expect("config should parse");

        assert_eq!(config.missing_condition, ConditionPolicy::Skip);
        assert_eq!(config.max_nesting, 3);
        assert_eq!(config.name_prefix, "Variable");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = EngineConfig::from_file("/definitely/not/here/psflow.toml").unwrap_err();
        match err {
            ConfigError::Io { file, .. } => assert!(file.ends_with("psflow.toml")),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
