//! Grading result returned to the harness.

use serde::{Deserialize, Serialize};

/// Score assigned to a passing result.
pub const PASS_SCORE: f64 = 1.0;

/// Score assigned to a failing result.
pub const FAIL_SCORE: f64 = 0.0;

/// Verdict for a single output.
///
/// Serializes to exactly `{ "pass", "score", "reason" }`, the shape harnesses
/// aggregate across test cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Whether the output satisfied the assertion
    pub pass: bool,

    /// `1` on pass, `0` on fail
    pub score: f64,

    /// Human-readable explanation
    pub reason: String,
}

impl GradingResult {
    /// A passing result with the given reason.
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            pass: true,
            score: PASS_SCORE,
            reason: reason.into(),
        }
    }

    /// A failing result with the given reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            pass: false,
            score: FAIL_SCORE,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pass_and_fail_scores() {
        let pass = GradingResult::pass("ok");
        assert!(pass.pass);
        assert_eq!(pass.score, 1.0);

        let fail = GradingResult::fail("nope");
        assert!(!fail.pass);
        assert_eq!(fail.score, 0.0);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(GradingResult::fail("Should return error for generic")).unwrap();
        assert_eq!(
            value,
            json!({
                "pass": false,
                "score": 0.0,
                "reason": "Should return error for generic"
            })
        );
    }
}
