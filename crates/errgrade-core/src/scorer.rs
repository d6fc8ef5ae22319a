//! Scorers: turn an output string and its context into a [`GradingResult`].
//!
//! [`ErrorCaseScorer`] checks that a system under test reported an error for
//! a scenario that should have produced one:
//!
//! 1. If the parsed output has a truthy error field, the case PASSES
//! 2. Otherwise the case FAILS, naming the scenario from the context
//!
//! Scoring is pure: no I/O, no logging, no shared state.

use serde_json::Value;
use thiserror::Error;

use crate::config::{InvalidJsonPolicy, ScorerConfig};
use crate::context::AssertionContext;
use crate::result::GradingResult;
use crate::value::{is_truthy, to_display_string, truthy_field};

/// Reason prefix when the output carried an error.
pub const CORRECT_ERROR_PREFIX: &str = "Correctly returned error: ";

/// Reason prefix when the output carried no error.
pub const MISSING_ERROR_PREFIX: &str = "Should return error for ";

/// Errors that can occur while scoring.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A scoring callback invoked once per output.
pub trait Scorer: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Score a single output.
    fn score(&self, output: &str, context: &AssertionContext)
        -> Result<GradingResult, ScoreError>;
}

/// Scores whether an output correctly reported an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorCaseScorer {
    config: ScorerConfig,
}

impl ErrorCaseScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with a custom configuration.
    pub fn with_config(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Parse `output` as JSON and grade it.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::InvalidJson`] when `output` does not parse and the
    /// config's `on_invalid_json` is `propagate`. Under `fail` the same input
    /// yields a failing result instead.
    pub fn evaluate(
        &self,
        output: &str,
        context: &AssertionContext,
    ) -> Result<GradingResult, ScoreError> {
        let parsed: Value = match serde_json::from_str(output) {
            Ok(value) => value,
            Err(err) => {
                return match self.config.on_invalid_json {
                    InvalidJsonPolicy::Propagate => Err(ScoreError::InvalidJson(err)),
                    InvalidJsonPolicy::Fail => {
                        Ok(GradingResult::fail(self.config.invalid_json_reason.clone()))
                    }
                }
            }
        };

        Ok(self.grade(&parsed, context))
    }

    /// Grade an already-parsed output.
    ///
    /// Only objects carry fields. Any other document, top-level `null`
    /// included, has no error field and grades as a fail rather than an error.
    pub fn grade(&self, parsed: &Value, context: &AssertionContext) -> GradingResult {
        if let Some(error) = truthy_field(parsed, &self.config.error_field) {
            return GradingResult::pass(format!(
                "{}{}",
                CORRECT_ERROR_PREFIX,
                to_display_string(error)
            ));
        }

        GradingResult::fail(format!(
            "{}{}",
            MISSING_ERROR_PREFIX,
            self.error_context(context)
        ))
    }

    /// The scenario label: the context variable if truthy, else the fallback.
    fn error_context(&self, context: &AssertionContext) -> String {
        context
            .get(&self.config.context_var)
            .filter(|v| is_truthy(v))
            .map(to_display_string)
            .unwrap_or_else(|| self.config.fallback_context.clone())
    }
}

impl Scorer for ErrorCaseScorer {
    fn name(&self) -> &str {
        "error_case"
    }

    fn score(
        &self,
        output: &str,
        context: &AssertionContext,
    ) -> Result<GradingResult, ScoreError> {
        self.evaluate(output, context)
    }
}
