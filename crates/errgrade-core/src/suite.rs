//! Suites: score a list of test cases and summarize the outcome.
//!
//! A suite file is either `{ cases: [...] }` or a bare list of cases:
//!
//! ```yaml
//! cases:
//!   - description: "upstream rate limit"
//!     output: '{"error": "rate limit exceeded"}'
//!     vars:
//!       error_context: "rate limit"
//!   - output:
//!       result: ok
//! ```
//!
//! `output` may be a JSON string or any structured value, which is serialized
//! back to JSON text before scoring.
//!
//! A case whose scorer returns an error is reported as ERRORED, distinct from
//! a FAILED case, so harness-level breakage is not mistaken for a bad output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::context::AssertionContext;
use crate::result::GradingResult;
use crate::scorer::Scorer;

/// Errors that can occur when loading a suite.
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Failed to read suite file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Suite must be a list of cases or a mapping with a `cases` list, got {0}")]
    InvalidShape(String),

    #[error("Invalid case at index {index}: {source}")]
    InvalidCase {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Suite contains no cases")]
    Empty,
}

/// One output to score, with the variables the harness would supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Optional label for reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Output under test, as JSON text
    #[serde(deserialize_with = "deserialize_output")]
    pub output: String,

    /// Test-case variables. A `null` mapping (bare `vars:` in YAML) is empty.
    #[serde(default, deserialize_with = "crate::context::deserialize_vars")]
    pub vars: Map<String, Value>,
}

impl TestCase {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            description: None,
            output: output.into(),
            vars: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// The context handed to the scorer for this case.
    pub fn context(&self) -> AssertionContext {
        AssertionContext::with_vars(self.vars.clone())
    }
}

fn deserialize_output<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        structured => serde_json::to_string(&structured).map_err(serde::de::Error::custom),
    }
}

/// Turn a parsed suite document into cases.
///
/// Cases are deserialized one at a time so a bad entry is reported by index
/// with the underlying field error.
fn cases_from_value(document: Value) -> Result<Vec<TestCase>, SuiteError> {
    let entries = match document {
        Value::Null => Vec::new(),
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("cases") {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(SuiteError::InvalidShape(format!(
                    "`cases` of type {}",
                    type_name(&other)
                )))
            }
            None => return Err(SuiteError::InvalidShape("a mapping without `cases`".to_string())),
        },
        other => return Err(SuiteError::InvalidShape(type_name(&other).to_string())),
    };

    if entries.is_empty() {
        return Err(SuiteError::Empty);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|source| SuiteError::InvalidCase { index, source })
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Parse suite cases from a YAML string.
pub fn cases_from_yaml(yaml: &str) -> Result<Vec<TestCase>, SuiteError> {
    if yaml.trim().is_empty() {
        return Err(SuiteError::Empty);
    }
    cases_from_value(serde_yaml::from_str(yaml)?)
}

/// Parse suite cases from a JSON string.
pub fn cases_from_json(json: &str) -> Result<Vec<TestCase>, SuiteError> {
    cases_from_value(serde_json::from_str(json)?)
}

/// Load suite cases from a file. `.json` files parse as JSON, anything else as YAML.
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<TestCase>, SuiteError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let cases = if is_json {
        cases_from_json(&contents)?
    } else {
        cases_from_yaml(&contents)?
    };

    tracing::debug!(path = %path.display(), cases = cases.len(), "loaded suite");
    Ok(cases)
}

/// Outcome of scoring a single case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// The scorer produced a verdict.
    Scored { result: GradingResult },

    /// The scorer could not produce a verdict.
    Errored { message: String },
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CaseOutcome::Scored { result } if result.pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CaseOutcome::Scored { result } if !result.pass)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, CaseOutcome::Errored { .. })
    }
}

/// Per-case entry in a [`SuiteReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Position of the case in the suite (0-based)
    pub index: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

/// Aggregate counts over a suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,

    /// `passed / total`, `0.0` for an empty run
    pub pass_rate: f64,
}

impl SuiteSummary {
    fn from_cases(cases: &[CaseReport]) -> Self {
        let total = cases.len();
        let passed = cases.iter().filter(|c| c.outcome.is_pass()).count();
        let errored = cases.iter().filter(|c| c.outcome.is_errored()).count();
        let failed = total - passed - errored;
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        Self {
            total,
            passed,
            failed,
            errored,
            pass_rate,
        }
    }
}

/// Result of running a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Name of the scorer that produced the report
    pub scorer: String,

    /// Per-case outcomes, in suite order
    pub cases: Vec<CaseReport>,

    pub summary: SuiteSummary,

    /// When the suite was scored
    pub evaluated_at: DateTime<Utc>,
}

impl SuiteReport {
    /// True when the suite had cases and every one of them passed.
    pub fn all_passed(&self) -> bool {
        self.summary.total > 0 && self.summary.passed == self.summary.total
    }
}

/// Score every case in order.
///
/// Scorer errors never abort the run; they are recorded as
/// [`CaseOutcome::Errored`].
pub fn run_suite(scorer: &dyn Scorer, cases: &[TestCase]) -> SuiteReport {
    let reports: Vec<CaseReport> = cases
        .iter()
        .enumerate()
        .map(|(index, case)| {
            let outcome = match scorer.score(&case.output, &case.context()) {
                Ok(result) => {
                    tracing::debug!(
                        index,
                        pass = result.pass,
                        reason = %result.reason,
                        "case scored"
                    );
                    CaseOutcome::Scored { result }
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "case errored");
                    CaseOutcome::Errored {
                        message: err.to_string(),
                    }
                }
            };

            CaseReport {
                index,
                description: case.description.clone(),
                outcome,
            }
        })
        .collect();

    let summary = SuiteSummary::from_cases(&reports);
    tracing::info!(
        scorer = scorer.name(),
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        errored = summary.errored,
        "suite finished"
    );

    SuiteReport {
        scorer: scorer.name().to_string(),
        cases: reports,
        summary,
        evaluated_at: Utc::now(),
    }
}
