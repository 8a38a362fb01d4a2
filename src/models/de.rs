//! Forgiving field decoders for backend payloads.
//!
//! The backend is loosely typed: numbers arrive as JSON numbers, numeric strings
//! or not at all. Every decoder here maps anything it cannot read to the zero
//! value instead of failing the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value to a finite float (0.0 otherwise)
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_f64).unwrap_or(0.0))
}

pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    if value <= 0.0 {
        Ok(0)
    } else {
        Ok(value.round() as u64)
    }
}

/// Strings pass through, numbers are stringified, anything else is empty
pub fn lenient_string_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(lenient_string_value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_f64")]
        value: f64,
        #[serde(default, deserialize_with = "lenient_u64")]
        count: u64,
        #[serde(default, deserialize_with = "lenient_string")]
        label: String,
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let probe: Probe = serde_json::from_value(json!({"value": "12.5", "count": "3", "label": 7})).unwrap();
        assert_eq!(probe.value, 12.5);
        assert_eq!(probe.count, 3);
        assert_eq!(probe.label, "7");
    }

    #[test]
    fn test_garbage_becomes_zero() {
        let probe: Probe = serde_json::from_value(json!({"value": "abc", "count": null, "label": null})).unwrap();
        assert_eq!(probe.value, 0.0);
        assert_eq!(probe.count, 0);
        assert_eq!(probe.label, "");

        let missing: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.value, 0.0);
        assert!(!missing.value.is_nan());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(coerce_f64(&json!("NaN")), 0.0);
        assert_eq!(coerce_f64(&json!("inf")), 0.0);
        assert_eq!(coerce_f64(&json!([1, 2])), 0.0);
    }
}
