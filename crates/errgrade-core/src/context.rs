//! Assertion context supplied by the harness alongside each output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context passed to a scorer with each output.
///
/// Only `vars` is read. Harnesses typically send more (prompt, provider,
/// test metadata); unknown keys are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssertionContext {
    /// Test-case variables. A missing or `null` mapping is treated as empty.
    #[serde(default, deserialize_with = "deserialize_vars")]
    pub vars: Map<String, Value>,
}

impl AssertionContext {
    /// Create a context with no variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from an existing variable mapping.
    pub fn with_vars(vars: Map<String, Value>) -> Self {
        Self { vars }
    }

    /// Set a variable, returning the updated context.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }
}

pub(crate) fn deserialize_vars<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
