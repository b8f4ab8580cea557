//! Field decoders for search-engine documents.
//!
//! Documents in the movie index were loaded from CSV exports, so numeric
//! fields show up as numbers, numeric strings, or nulls depending on the
//! row. Every decoder here falls back to a default instead of failing.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Renders an identifier the way the search engine renders `_id`.
///
/// Integral floats lose their fractional part so `862.0` and `"862"` compare equal.
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value).unwrap_or(0.0))
}

pub fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64)
        .unwrap_or(0))
}

/// Accepts `1999`, `"1999"`, and dates such as `"1999-05-19"`.
pub fn optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let year = match &value {
        Value::String(s) => s
            .trim()
            .get(..4)
            .and_then(|prefix| prefix.parse::<i32>().ok()),
        other => as_number(other).map(|n| n as i32),
    };
    Ok(year.filter(|y| *y > 0))
}

pub fn id_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_to_string(&value).unwrap_or_default())
}

pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_to_string_normalises_numbers() {
        assert_eq!(id_to_string(&json!(862)), Some("862".to_string()));
        assert_eq!(id_to_string(&json!(862.0)), Some("862".to_string()));
        assert_eq!(id_to_string(&json!(" 862 ")), Some("862".to_string()));
        assert_eq!(id_to_string(&json!(null)), None);
    }

    #[test]
    fn test_as_number_rejects_garbage() {
        assert_eq!(as_number(&json!("12.5")), Some(12.5));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_number(&json!([1, 2])), None);
    }
}
