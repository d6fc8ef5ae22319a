//! JSON Schema validation for scorer configuration.
//!
//! Configuration files are validated against `schema/scorer-config.schema.json`
//! before they are deserialized, so typos in keys surface with a JSON pointer.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded configuration schema (loaded at compile time).
const CONFIG_SCHEMA_JSON: &str = include_str!("../../../../schema/scorer-config.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(CONFIG_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a configuration value against the schema.
///
/// Returns every violation as `"<message> at <pointer>"`.
pub fn validate_config_schema(config_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(config_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
