//! JavaScript-compatible value semantics over `serde_json::Value`.
//!
//! Assertion callbacks are written against loosely typed JSON: a field is
//! "set" when it is truthy, and values are concatenated into messages with
//! implicit string coercion. This module makes both rules explicit so that
//! scoring is identical regardless of where the output was produced.
//!
//! ## Truthiness
//!
//! Falsy: absent, `null`, `false`, `0` (any sign or representation), `""`.
//! Everything else is truthy, including `[]` and `{}`.
//!
//! ## Display conversion
//!
//! | Value   | Rendering                                  |
//! |---------|--------------------------------------------|
//! | string  | as is                                      |
//! | bool    | `true` / `false`                           |
//! | null    | `null`                                     |
//! | number  | shortest form, exponent outside `[1e-6, 1e21)` |
//! | array   | elements joined with `,`, `null` as empty  |
//! | object  | `[object Object]`                          |

use serde_json::{Number, Value};

/// Rendering of any JSON object under string coercion.
pub const OBJECT_DISPLAY: &str = "[object Object]";

/// Magnitude at or above which floats render in exponent form.
const EXPONENT_UPPER: f64 = 1e21;

/// Magnitude below which non-zero floats render in exponent form.
const EXPONENT_LOWER: f64 = 1e-6;

/// Largest integer magnitude a double represents exactly (2^53).
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Check whether a value is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n
            .as_f64()
            .map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Look up `key` on an object and return it only if it is truthy.
///
/// Non-object values have no fields, so the lookup yields `None` for them.
pub fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_object()
        .and_then(|map| map.get(key))
        .filter(|v| is_truthy(v))
}

/// Convert a value to the string it produces under implicit coercion.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_display(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => OBJECT_DISPLAY.to_string(),
    }
}

fn number_to_display(n: &Number) -> String {
    // Beyond 2^53 integers lose precision as doubles; render the rounded value.
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_EXACT_INTEGER {
            return i.to_string();
        }
        return float_to_display(i as f64);
    }
    if let Some(u) = n.as_u64() {
        if u <= MAX_EXACT_INTEGER {
            return u.to_string();
        }
        return float_to_display(u as f64);
    }
    match n.as_f64() {
        Some(f) => float_to_display(f),
        None => n.to_string(),
    }
}

fn float_to_display(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // Covers -0.0 as well.
    if f == 0.0 {
        return "0".to_string();
    }

    let magnitude = f.abs();
    if magnitude >= EXPONENT_UPPER || magnitude < EXPONENT_LOWER {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if exp.starts_with('-') => format!("{}e{}", mantissa, exp),
            Some((mantissa, exp)) => format!("{}e+{}", mantissa, exp),
            None => formatted,
        };
    }

    format!("{}", f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(-0.0)));
        assert!(!is_truthy(&json!("")));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-3.5)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_truthy_field_lookup() {
        let value = json!({"error": "boom", "empty": "", "zero": 0});
        assert_eq!(truthy_field(&value, "error"), Some(&json!("boom")));
        assert_eq!(truthy_field(&value, "empty"), None);
        assert_eq!(truthy_field(&value, "zero"), None);
        assert_eq!(truthy_field(&value, "missing"), None);
    }

    #[test]
    fn test_truthy_field_on_non_object() {
        assert_eq!(truthy_field(&json!(["error"]), "error"), None);
        assert_eq!(truthy_field(&json!("error"), "error"), None);
        assert_eq!(truthy_field(&json!(null), "error"), None);
        assert_eq!(truthy_field(&json!(42), "error"), None);
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(to_display_string(&json!("rate limit")), "rate limit");
        assert_eq!(to_display_string(&json!(true)), "true");
        assert_eq!(to_display_string(&json!(false)), "false");
        assert_eq!(to_display_string(&json!(null)), "null");
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(to_display_string(&json!(404)), "404");
        assert_eq!(to_display_string(&json!(-17)), "-17");
        assert_eq!(to_display_string(&json!(1.0)), "1");
        assert_eq!(to_display_string(&json!(1.5)), "1.5");
        assert_eq!(to_display_string(&json!(0.1)), "0.1");
        assert_eq!(to_display_string(&json!(-0.0)), "0");
        assert_eq!(to_display_string(&json!(0.000001)), "0.000001");
        assert_eq!(to_display_string(&json!(1e-7)), "1e-7");
        assert_eq!(to_display_string(&json!(1e21)), "1e+21");
        assert_eq!(to_display_string(&json!(-2.5e22)), "-2.5e+22");
        assert_eq!(to_display_string(&json!(1e20)), "100000000000000000000");
    }

    #[test]
    fn test_display_large_integers_round_like_doubles() {
        assert_eq!(to_display_string(&json!(9007199254740992u64)), "9007199254740992");
        assert_eq!(to_display_string(&json!(9007199254740993u64)), "9007199254740992");
        assert_eq!(to_display_string(&json!(-9007199254740993i64)), "-9007199254740992");
        assert_eq!(to_display_string(&json!(u64::MAX)), "18446744073709552000");
    }

    #[test]
    fn test_display_arrays() {
        assert_eq!(to_display_string(&json!([])), "");
        assert_eq!(to_display_string(&json!(["a", 1, true])), "a,1,true");
        assert_eq!(to_display_string(&json!([null, "x", null])), ",x,");
        assert_eq!(to_display_string(&json!([1, [2, [3]]])), "1,2,3");
        assert_eq!(to_display_string(&json!([{"a": 1}])), "[object Object]");
    }

    #[test]
    fn test_display_objects() {
        assert_eq!(to_display_string(&json!({})), OBJECT_DISPLAY);
        assert_eq!(
            to_display_string(&json!({"code": 429, "message": "slow down"})),
            OBJECT_DISPLAY
        );
    }
}
