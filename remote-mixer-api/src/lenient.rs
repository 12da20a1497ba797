//! Field decoders that accept the loosely typed values browser peers send.
//!
//! Booleans may arrive as numbers, numbers may arrive as strings. A value that
//! cannot be coerced at all fails the whole command.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where D: Deserializer<'de>
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(value) => value,
        Value::Number(value) => value.as_f64().map(|value| value != 0.0).unwrap_or(false),
        Value::String(value) => {
            let value = value.trim();
            match value.parse::<f64>() {
                Ok(number) => number != 0.0,
                Err(_) => value.eq_ignore_ascii_case("true"),
            }
        }
        Value::Array(value) => !value.is_empty(),
        Value::Object(value) => !value.is_empty(),
    })
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where D: Deserializer<'de>
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(value) => value.as_f64()
                                     .ok_or_else(|| D::Error::custom("number is not representable as f64"))?,
        Value::String(value) => value.trim().parse::<f64>().map_err(D::Error::custom)?,
        Value::Bool(value) => f64::from(u8::from(value)),
        other => return Err(D::Error::custom(format!("expected a number, got {other}"))),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(D::Error::custom("number is not finite"))
    }
}

/// Integers are truncated toward zero, the way the peer's UI rounds slider positions.
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where D: Deserializer<'de>
{
    Ok(number(deserializer)?.trunc() as i64)
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where D: Deserializer<'de>
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(value) => value,
        other => other.to_string(),
    })
}
