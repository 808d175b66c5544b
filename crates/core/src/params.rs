//! Lenient helpers for reading configuration values out of a `serde_json::Value`.
//!
//! Each helper takes a JSON object, a key and a default. Missing keys and
//! wrongly typed values yield the default, so a partial or stale config file
//! still produces a usable configuration. Range checks happen later in
//! [`PuddleConfig::validate`](crate::config::PuddleConfig::validate).

use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Integers are accepted and widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative integers are accepted.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a `[min, max]` pair from `params[name]`.
///
/// Accepts either a two-element array of numbers or an object with `min` and
/// `max` keys. Anything else returns `default`. The pair is returned as
/// written; ordering is checked by validation.
pub fn param_range(params: &Value, name: &str, default: (f64, f64)) -> (f64, f64) {
    match params.get(name) {
        Some(Value::Array(items)) if items.len() == 2 => {
            match (items[0].as_f64(), items[1].as_f64()) {
                (Some(min), Some(max)) => (min, max),
                _ => default,
            }
        }
        Some(obj @ Value::Object(_)) => (
            param_f64(obj, "min", default.0),
            param_f64(obj, "max", default.1),
        ),
        _ => default,
    }
}

/// Returns `params[name]` or `Value::Null` when absent, for reading nested sections.
pub fn section<'a>(params: &'a Value, name: &str) -> &'a Value {
    params.get(name).unwrap_or(&Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- param_f64 --

    #[test]
    fn param_f64_reads_float() {
        let params = json!({"dampening_ratio": 0.9});
        assert!((param_f64(&params, "dampening_ratio", 0.85) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_widens_integer() {
        let params = json!({"frame_interval_ms": 120});
        assert!((param_f64(&params, "frame_interval_ms", 100.0) - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_falls_back_for_string_and_null() {
        let params = json!({"a": "fast", "b": null});
        assert!((param_f64(&params, "a", 1.5) - 1.5).abs() < f64::EPSILON);
        assert!((param_f64(&params, "b", 2.5) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_falls_back_for_non_object() {
        assert!((param_f64(&Value::Null, "x", 7.0) - 7.0).abs() < f64::EPSILON);
        assert!((param_f64(&json!([1, 2]), "x", 7.0) - 7.0).abs() < f64::EPSILON);
    }

    // -- param_usize --

    #[test]
    fn param_usize_reads_integer() {
        let params = json!({"max_drops_per_tick": 9});
        assert_eq!(param_usize(&params, "max_drops_per_tick", 6), 9);
    }

    #[test]
    fn param_usize_rejects_float_and_negative() {
        let params = json!({"a": 2.5, "b": -3});
        assert_eq!(param_usize(&params, "a", 6), 6);
        assert_eq!(param_usize(&params, "b", 6), 6);
    }

    // -- param_bool / param_string --

    #[test]
    fn param_bool_reads_and_falls_back() {
        let params = json!({"enabled": false, "other": 1});
        assert!(!param_bool(&params, "enabled", true));
        assert!(param_bool(&params, "other", true));
        assert!(param_bool(&params, "missing", true));
    }

    #[test]
    fn param_string_reads_and_falls_back() {
        let params = json!({"shades": " .:#", "n": 4});
        assert_eq!(param_string(&params, "shades", "x"), " .:#");
        assert_eq!(param_string(&params, "n", "fallback"), "fallback");
    }

    // -- param_range --

    #[test]
    fn param_range_reads_array_pair() {
        let params = json!({"interval_ms": [1000, 2500.5]});
        assert_eq!(param_range(&params, "interval_ms", (0.0, 1.0)), (1000.0, 2500.5));
    }

    #[test]
    fn param_range_reads_min_max_object_with_partial_defaults() {
        let params = json!({"interval_ms": {"max": 40}});
        assert_eq!(param_range(&params, "interval_ms", (10.0, 20.0)), (10.0, 40.0));
    }

    #[test]
    fn param_range_falls_back_for_wrong_shapes() {
        let params = json!({"a": [1], "b": [1, "x"], "c": 5});
        let default = (3.0, 4.0);
        assert_eq!(param_range(&params, "a", default), default);
        assert_eq!(param_range(&params, "b", default), default);
        assert_eq!(param_range(&params, "c", default), default);
    }

    // -- section --

    #[test]
    fn section_returns_null_for_missing_key() {
        let params = json!({"rain": {"accumulator_cap": 4.0}});
        assert!(section(&params, "rain").is_object());
        assert!(section(&params, "lightning").is_null());
    }
}
