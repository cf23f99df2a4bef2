//! Forgiving field deserializers for model-written reports.
//!
//! Models write counts as `5`, `5.0`, `"5"`, `"1,200"` or `"1.2k"`, and dates
//! as strings or bare years. These helpers accept all of those so a usable
//! report is not rejected over formatting.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Count field accepting integers, floats (rounded), numeric strings with
/// separators and `k`/`m`/`b` suffixes. `null` and `""` become 0.
///
/// # Errors
///
/// Negative, non-finite or unparseable values.
pub fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return Ok(u);
            }
            let f = n
                .as_f64()
                .ok_or_else(|| D::Error::custom("invalid numeric count"))?;
            float_to_count(f).map_err(D::Error::custom)
        }
        Value::String(s) => parse_count_str(&s).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "invalid type for count: {}",
            other
        ))),
    }
}

/// Text field accepting strings, numbers and booleans. `null` becomes "".
pub fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn float_to_count(f: f64) -> Result<u64, String> {
    if !f.is_finite() || f < 0.0 {
        return Err(format!("count must be a non-negative number, got {}", f));
    }
    Ok(f.round() as u64)
}

fn parse_count_str(raw: &str) -> Result<u64, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '+'))
        .collect();
    if cleaned.is_empty() {
        return Ok(0);
    }

    let lower = cleaned.to_lowercase();
    let (number, multiplier) = match lower.chars().last() {
        Some('k') => (&lower[..lower.len() - 1], 1_000.0),
        Some('m') => (&lower[..lower.len() - 1], 1_000_000.0),
        Some('b') => (&lower[..lower.len() - 1], 1_000_000_000.0),
        _ => (lower.as_str(), 1.0),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| format!("count '{}' is not a number", raw))?;
    float_to_count(value * multiplier)
}
