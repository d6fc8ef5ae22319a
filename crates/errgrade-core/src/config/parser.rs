//! Scorer configuration parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_config_schema;

/// Default output field inspected for an error.
pub const DEFAULT_ERROR_FIELD: &str = "error";

/// Default variable naming the scenario under test.
pub const DEFAULT_CONTEXT_VAR: &str = "error_context";

/// Default label when the scenario variable is falsy.
pub const DEFAULT_FALLBACK_CONTEXT: &str = "generic";

/// Default reason for unparseable output under [`InvalidJsonPolicy::Fail`].
pub const DEFAULT_INVALID_JSON_REASON: &str = "invalid JSON output";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Config validation failed: {0}")]
    ValidationError(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// What to do when the output under test is not valid JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidJsonPolicy {
    /// Return the parse error to the caller.
    #[default]
    Propagate,

    /// Score the output as a failure.
    Fail,
}

/// Scorer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScorerConfig {
    /// Output field inspected for an error value
    pub error_field: String,

    /// Variable naming the scenario under test
    pub context_var: String,

    /// Label used when the context variable is falsy
    pub fallback_context: String,

    /// Handling of unparseable output
    pub on_invalid_json: InvalidJsonPolicy,

    /// Reason reported under [`InvalidJsonPolicy::Fail`]
    pub invalid_json_reason: String,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            error_field: DEFAULT_ERROR_FIELD.to_string(),
            context_var: DEFAULT_CONTEXT_VAR.to_string(),
            fallback_context: DEFAULT_FALLBACK_CONTEXT.to_string(),
            on_invalid_json: InvalidJsonPolicy::Propagate,
            invalid_json_reason: DEFAULT_INVALID_JSON_REASON.to_string(),
        }
    }
}

impl ScorerConfig {
    /// Default configuration with the invalid-JSON policy set to `Fail`.
    pub fn lenient() -> Self {
        Self {
            on_invalid_json: InvalidJsonPolicy::Fail,
            ..Default::default()
        }
    }

    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Self::from_value(serde_json::Value::Object(Default::default()));
        }
        let value: serde_json::Value = match serde_yaml::from_str(yaml)? {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other,
        };
        Self::from_value(value)
    }

    /// Parse a config from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a config file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        tracing::debug!(path = %path.display(), "loading scorer config");

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        validate_config_schema(&value).map_err(ConfigError::SchemaError)?;
        let config: ScorerConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config contents.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("error_field", &self.error_field),
            ("context_var", &self.context_var),
            ("fallback_context", &self.fallback_context),
            ("invalid_json_reason", &self.invalid_json_reason),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} must not be blank",
                    name
                )));
            }
        }

        Ok(())
    }
}
