//! # errgrade-core
//!
//! Deterministic scoring for error-case assertions.
//!
//! An error-case assertion answers one question about an output produced by
//! the system under test: did it report an error for a scenario that should
//! have produced one?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same output and vars always produce the same result
//! 2. **Pure**: Scoring performs no I/O and holds no state
//! 3. **Loose-JSON compatible**: Truthiness and string coercion match the
//!    JavaScript semantics harnesses are written against
//!
//! ## Example
//!
//! ```rust
//! use errgrade_core::{evaluate, AssertionContext};
//!
//! let ctx = AssertionContext::new().var("error_context", "timeout");
//!
//! let result = evaluate(r#"{"error": "deadline exceeded"}"#, &ctx)?;
//! assert!(result.pass);
//! assert_eq!(result.reason, "Correctly returned error: deadline exceeded");
//!
//! let result = evaluate(r#"{"result": "ok"}"#, &ctx)?;
//! assert!(!result.pass);
//! assert_eq!(result.reason, "Should return error for timeout");
//! # Ok::<(), errgrade_core::ScoreError>(())
//! ```

pub mod config;
pub mod context;
pub mod result;
pub mod scorer;
pub mod suite;
pub mod value;

// Re-export main types at crate root
pub use config::{ConfigError, InvalidJsonPolicy, ScorerConfig};
pub use context::AssertionContext;
pub use result::GradingResult;
pub use scorer::{ErrorCaseScorer, ScoreError, Scorer};
pub use suite::{
    load_cases, run_suite, CaseOutcome, CaseReport, SuiteError, SuiteReport, SuiteSummary,
    TestCase,
};
pub use value::{is_truthy, to_display_string};

/// Score an output with the default error-case scorer.
///
/// This is the main entry point for errgrade.
///
/// # Arguments
///
/// * `output` - JSON text produced by the system under test
/// * `context` - Harness context; `vars.error_context` names the scenario
///
/// # Returns
///
/// A `GradingResult` with `pass`, `score` and `reason`, or
/// `ScoreError::InvalidJson` when `output` is not valid JSON.
pub fn evaluate(output: &str, context: &AssertionContext) -> Result<GradingResult, ScoreError> {
    ErrorCaseScorer::new().evaluate(output, context)
}
