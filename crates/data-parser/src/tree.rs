//! Adapter over the generic value tree.
//!
//! The engine is written against `serde_json::Value` but funnels every
//! type inspection and coercion through this module, so the rest of the
//! crate never assumes more than the minimal tree interface: null, bool,
//! int64, float64, string, list, dict.

use serde_json::{Map, Value};

/// Tree type name for diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float64",
        Value::Number(_) => "int64",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Coerce a tree value to a string, per the generic string conversion.
/// Null is not coercible (callers treat it as "clear destination").
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a tree value to a signed 64-bit integer.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                // Out-of-range u64 values saturate rather than vanish.
                n.as_u64().map(|_| i64::MAX)
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

/// Coerce a tree value to an unsigned 64-bit integer.
pub fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Bool(b) => Some(*b as u64),
        _ => None,
    }
}

/// Coerce a tree value to a 64-bit float.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a tree value to a boolean: native bool, 0/1 integers, or the
/// usual string spellings.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn as_dict(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

pub fn as_list(value: &Value) -> Option<&Vec<Value>> {
    value.as_array()
}

/// Build a float value, degrading non-finite floats to null (JSON has no
/// NaN/Inf representation).
pub fn float_value(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&Value::Null), "null");
        assert_eq!(type_name(&json!(true)), "bool");
        assert_eq!(type_name(&json!(3)), "int64");
        assert_eq!(type_name(&json!(3.5)), "float64");
        assert_eq!(type_name(&json!("x")), "string");
        assert_eq!(type_name(&json!([])), "list");
        assert_eq!(type_name(&json!({})), "dict");
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce_string(&json!("abc")), Some("abc".into()));
        assert_eq!(coerce_string(&json!(12)), Some("12".into()));
        assert_eq!(coerce_string(&json!(true)), Some("true".into()));
        assert_eq!(coerce_string(&json!([1])), None);
        assert_eq!(coerce_string(&Value::Null), None);
    }

    #[test]
    fn test_coerce_i64() {
        assert_eq!(coerce_i64(&json!(-7)), Some(-7));
        assert_eq!(coerce_i64(&json!("42")), Some(42));
        assert_eq!(coerce_i64(&json!(true)), Some(1));
        assert_eq!(coerce_i64(&json!("x")), None);
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!(0)), Some(false));
        assert_eq!(coerce_bool(&json!(1)), Some(true));
        assert_eq!(coerce_bool(&json!(2)), None);
        assert_eq!(coerce_bool(&json!("yes")), Some(true));
        assert_eq!(coerce_bool(&json!("off")), Some(false));
    }

    #[test]
    fn test_float_value_non_finite() {
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(1.5), json!(1.5));
    }
}
