//! Scorer configuration.
//!
//! Configuration is structured data validated against JSON Schema. This
//! module handles parsing YAML/JSON config files and validating them.

mod parser;
mod schema;

pub use parser::{
    ConfigError, InvalidJsonPolicy, ScorerConfig, DEFAULT_CONTEXT_VAR, DEFAULT_ERROR_FIELD,
    DEFAULT_FALLBACK_CONTEXT, DEFAULT_INVALID_JSON_REASON,
};
pub use schema::validate_config_schema;
