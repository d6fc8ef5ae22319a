//! Subcommand implementations.

use std::io::Read;

use anyhow::{bail, Context, Result};
use errgrade_core::{
    load_cases, run_suite, AssertionContext, CaseOutcome, ErrorCaseScorer, GradingResult,
    InvalidJsonPolicy, ScoreError, ScorerConfig, SuiteReport,
};
use serde_json::{Map, Value};

use crate::exit_codes;
use crate::{BatchArgs, ReportFormat, ScoreArgs, ScorerArgs};

/// `errgrade score`
pub fn score(args: ScoreArgs) -> Result<u8> {
    let outcome = grade_output(&args)?;

    match &outcome {
        Ok(result) => {
            let rendered = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{}", rendered);
        }
        Err(err) => eprintln!("error: {}", err),
    }

    Ok(score_exit_code(&outcome))
}

/// `errgrade batch`
pub fn batch(args: BatchArgs) -> Result<u8> {
    let scorer = build_scorer(&args.scorer)?;
    let cases = load_cases(&args.suite)
        .with_context(|| format!("failed to load suite {}", args.suite.display()))?;

    let report = run_suite(&scorer, &cases);

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(batch_exit_code(&report))
}

/// Score the output named by `args`.
///
/// The outer error covers config, input and var problems; the inner one is
/// the scorer's own verdict on unparseable output.
fn grade_output(args: &ScoreArgs) -> Result<Result<GradingResult, ScoreError>> {
    let scorer = build_scorer(&args.scorer)?;
    let output = read_output(args)?;
    let context = AssertionContext::with_vars(collect_vars(args.vars_json.as_deref(), &args.vars)?);

    Ok(scorer.evaluate(&output, &context))
}

fn score_exit_code(outcome: &Result<GradingResult, ScoreError>) -> u8 {
    match outcome {
        Ok(result) if result.pass => exit_codes::PASS,
        Ok(_) => exit_codes::FAIL,
        Err(_) => exit_codes::ERROR,
    }
}

fn batch_exit_code(report: &SuiteReport) -> u8 {
    if report.summary.errored > 0 {
        exit_codes::ERROR
    } else if report.all_passed() {
        exit_codes::PASS
    } else {
        exit_codes::FAIL
    }
}

fn build_scorer(args: &ScorerArgs) -> Result<ErrorCaseScorer> {
    let mut config = match &args.config {
        Some(path) => ScorerConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScorerConfig::default(),
    };

    if args.lenient {
        config.on_invalid_json = InvalidJsonPolicy::Fail;
    }

    tracing::debug!(?config, "scorer configured");
    Ok(ErrorCaseScorer::with_config(config))
}

fn read_output(args: &ScoreArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read output file {}", path.display()));
    }

    match args.output.as_deref() {
        Some(text) if text != "-" => Ok(text.to_string()),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read output from stdin")?;
            Ok(buf)
        }
    }
}

/// Merge `--vars-json` with `--var KEY=VALUE` pairs; later pairs win.
fn collect_vars(vars_json: Option<&str>, pairs: &[String]) -> Result<Map<String, Value>> {
    let mut vars = match vars_json {
        Some(text) => match serde_json::from_str::<Value>(text).context("invalid --vars-json")? {
            Value::Object(map) => map,
            other => bail!("--vars-json must be a JSON object, got {}", other),
        },
        None => Map::new(),
    };

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("invalid --var '{}': expected KEY=VALUE", pair))?;
        if key.is_empty() {
            bail!("invalid --var '{}': empty key", pair);
        }
        vars.insert(key.to_string(), parse_var_value(raw));
    }

    Ok(vars)
}

/// JSON when it parses (`0`, `false`, `{"a":1}`), otherwise the raw string.
fn parse_var_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn render_text(report: &SuiteReport) -> String {
    let mut out = String::new();

    for case in &report.cases {
        let label = case
            .description
            .as_deref()
            .map(|d| format!(" {}", d))
            .unwrap_or_default();

        let line = match &case.outcome {
            CaseOutcome::Scored { result } if result.pass => {
                format!("PASS  [{}]{}: {}", case.index, label, result.reason)
            }
            CaseOutcome::Scored { result } => {
                format!("FAIL  [{}]{}: {}", case.index, label, result.reason)
            }
            CaseOutcome::Errored { message } => {
                format!("ERROR [{}]{}: {}", case.index, label, message)
            }
        };
        out.push_str(&line);
        out.push('\n');
    }

    let summary = &report.summary;
    out.push_str(&format!(
        "\n{} cases: {} passed, {} failed, {} errored ({:.1}% pass rate)\n",
        summary.total,
        summary.passed,
        summary.failed,
        summary.errored,
        summary.pass_rate * 100.0
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use errgrade_core::TestCase;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;

    fn score_args(file: PathBuf, vars: &[&str], scorer: ScorerArgs) -> ScoreArgs {
        ScoreArgs {
            output: None,
            file: Some(file),
            vars: vars.iter().map(|v| v.to_string()).collect(),
            vars_json: None,
            scorer,
            pretty: false,
        }
    }

    fn default_scorer_args() -> ScorerArgs {
        ScorerArgs {
            config: None,
            lenient: false,
        }
    }

    fn temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_score_exit_codes() {
        assert_eq!(score_exit_code(&Ok(GradingResult::pass("ok"))), exit_codes::PASS);
        assert_eq!(score_exit_code(&Ok(GradingResult::fail("no"))), exit_codes::FAIL);

        let invalid = ErrorCaseScorer::new().evaluate("not json", &AssertionContext::new());
        assert_eq!(score_exit_code(&invalid), exit_codes::ERROR);
    }

    #[test]
    fn test_batch_exit_codes() {
        let scorer = ErrorCaseScorer::new();

        let all_pass = run_suite(&scorer, &[TestCase::new(r#"{"error": "x"}"#)]);
        assert_eq!(batch_exit_code(&all_pass), exit_codes::PASS);

        let one_fail = run_suite(
            &scorer,
            &[TestCase::new(r#"{"error": "x"}"#), TestCase::new("{}")],
        );
        assert_eq!(batch_exit_code(&one_fail), exit_codes::FAIL);

        let errored = run_suite(&scorer, &[TestCase::new("{}"), TestCase::new("nope")]);
        assert_eq!(batch_exit_code(&errored), exit_codes::ERROR);

        let empty = run_suite(&scorer, &[]);
        assert_eq!(batch_exit_code(&empty), exit_codes::FAIL);
    }

    #[test]
    fn test_score_reads_output_file() {
        let file = temp_file(".json", r#"{"result": "ok"}"#);
        let args = score_args(
            file.path().to_path_buf(),
            &["error_context=timeout"],
            default_scorer_args(),
        );

        let outcome = grade_output(&args).unwrap();
        assert_eq!(
            outcome.as_ref().unwrap(),
            &GradingResult::fail("Should return error for timeout")
        );
        assert_eq!(score_exit_code(&outcome), exit_codes::FAIL);
    }

    #[test]
    fn test_score_invalid_json_file_is_error() {
        let file = temp_file(".txt", "Sorry, something went wrong.");
        let args = score_args(file.path().to_path_buf(), &[], default_scorer_args());

        let outcome = grade_output(&args).unwrap();
        assert!(matches!(outcome, Err(ScoreError::InvalidJson(_))));
        assert_eq!(score_exit_code(&outcome), exit_codes::ERROR);
    }

    #[test]
    fn test_score_missing_output_file_is_io_error() {
        let args = score_args(
            PathBuf::from("/nonexistent/output.json"),
            &[],
            default_scorer_args(),
        );

        let err = grade_output(&args).unwrap_err();
        assert!(err.to_string().contains("failed to read output file"));
    }

    #[test]
    fn test_positional_output_is_used() {
        let args = ScoreArgs {
            output: Some(r#"{"error": "denied"}"#.to_string()),
            file: None,
            vars: vec![],
            vars_json: None,
            scorer: default_scorer_args(),
            pretty: false,
        };

        let outcome = grade_output(&args).unwrap();
        assert_eq!(score_exit_code(&outcome), exit_codes::PASS);
    }

    #[test]
    fn test_lenient_overrides_propagate_config() {
        let config = temp_file(".yaml", "on_invalid_json: propagate\n");

        let strict = build_scorer(&ScorerArgs {
            config: Some(config.path().to_path_buf()),
            lenient: false,
        })
        .unwrap();
        assert_eq!(strict.config().on_invalid_json, InvalidJsonPolicy::Propagate);

        let lenient = build_scorer(&ScorerArgs {
            config: Some(config.path().to_path_buf()),
            lenient: true,
        })
        .unwrap();
        assert_eq!(lenient.config().on_invalid_json, InvalidJsonPolicy::Fail);

        let result = lenient
            .evaluate("not json", &AssertionContext::new())
            .unwrap();
        assert_eq!(result, GradingResult::fail("invalid JSON output"));
    }

    #[test]
    fn test_bad_config_is_error() {
        let config = temp_file(".yaml", "on_invalid_json: ignore\n");
        let result = build_scorer(&ScorerArgs {
            config: Some(config.path().to_path_buf()),
            lenient: false,
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_var_values_parse_as_json_when_possible() {
        assert_eq!(parse_var_value("timeout"), json!("timeout"));
        assert_eq!(parse_var_value("malformed input"), json!("malformed input"));
        assert_eq!(parse_var_value("0"), json!(0));
        assert_eq!(parse_var_value("false"), json!(false));
        assert_eq!(parse_var_value(r#""quoted""#), json!("quoted"));
        assert_eq!(parse_var_value(""), json!(""));
    }

    #[test]
    fn test_collect_vars_merges_and_overrides() {
        let vars = collect_vars(
            Some(r#"{"error_context": "auth", "attempt": 1}"#),
            &["error_context=timeout".to_string(), "region=us-east-1".to_string()],
        )
        .unwrap();

        assert_eq!(vars.get("error_context"), Some(&json!("timeout")));
        assert_eq!(vars.get("attempt"), Some(&json!(1)));
        assert_eq!(vars.get("region"), Some(&json!("us-east-1")));
    }

    #[test]
    fn test_collect_vars_value_may_contain_equals() {
        let vars = collect_vars(None, &["error_context=a=b".to_string()]).unwrap();
        assert_eq!(vars.get("error_context"), Some(&json!("a=b")));
    }

    #[test]
    fn test_collect_vars_rejects_bad_input() {
        assert!(collect_vars(None, &["no_equals".to_string()]).is_err());
        assert!(collect_vars(None, &["=value".to_string()]).is_err());
        assert!(collect_vars(Some("[1, 2]"), &[]).is_err());
        assert!(collect_vars(Some("{broken"), &[]).is_err());
    }

    #[test]
    fn test_render_text_report() {
        let cases = vec![
            TestCase::new(r#"{"error": "boom"}"#).with_description("surfaced"),
            TestCase::new("{}").with_var("error_context", "timeout"),
            TestCase::new("nope"),
        ];
        let report = run_suite(&ErrorCaseScorer::new(), &cases);
        let text = render_text(&report);

        assert!(text.contains("PASS  [0] surfaced: Correctly returned error: boom"));
        assert!(text.contains("FAIL  [1]: Should return error for timeout"));
        assert!(text.contains("ERROR [2]: Output is not valid JSON"));
        assert!(text.contains("3 cases: 1 passed, 1 failed, 1 errored (33.3% pass rate)"));
    }
}
