//! Extended JSON value classification
//!
//! Documents are plain `serde_json::Value`s. BSON types that JSON cannot
//! express natively use MongoDB Extended JSON wrappers:
//! - `{"$oid": "<24 hex>"}`
//! - `{"$date": "<RFC 3339>" | <ms> | {"$numberLong": "<ms>"}}`
//! - `{"$numberDecimal": "<decimal>"}`
//! - `{"$numberInt": "<i32>"}`, `{"$numberLong": "<i64>"}`, `{"$numberDouble": "<f64>"}`

use std::sync::OnceLock;

use chrono::DateTime;
use serde_json::{Map, Value};

use super::types::BsonType;

const WRAPPER_KEYS: [&str; 6] = [
    "$oid",
    "$date",
    "$numberDecimal",
    "$numberInt",
    "$numberLong",
    "$numberDouble",
];

/// Classifies a value into its BSON type.
///
/// Returns an error for a wrapper whose payload is malformed
/// (e.g. `{"$oid": "xyz"}`).
pub fn classify(value: &Value) -> Result<BsonType, String> {
    match value {
        Value::Null => Ok(BsonType::Null),
        Value::Bool(_) => Ok(BsonType::Bool),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i32::try_from(i).is_ok() {
                    Ok(BsonType::Int)
                } else {
                    Ok(BsonType::Long)
                }
            } else if n.is_u64() {
                Ok(BsonType::Long)
            } else {
                Ok(BsonType::Double)
            }
        }
        Value::String(_) => Ok(BsonType::String),
        Value::Array(_) => Ok(BsonType::Array),
        Value::Object(obj) => match wrapper(obj) {
            Some((key, payload)) => classify_wrapper(key, payload),
            None => Ok(BsonType::Object),
        },
    }
}

/// Returns the wrapper key and payload if the object is an Extended JSON wrapper
fn wrapper(obj: &Map<String, Value>) -> Option<(&str, &Value)> {
    if obj.len() != 1 {
        return None;
    }
    let (key, payload) = obj.iter().next()?;
    WRAPPER_KEYS
        .contains(&key.as_str())
        .then_some((key.as_str(), payload))
}

fn classify_wrapper(key: &str, payload: &Value) -> Result<BsonType, String> {
    match key {
        "$oid" => match payload.as_str() {
            Some(hex) if is_object_id_hex(hex) => Ok(BsonType::ObjectId),
            _ => Err("$oid must be a 24 character hex string".into()),
        },
        "$date" => parse_date_payload(payload)
            .map(|_| BsonType::Date)
            .ok_or_else(|| "$date must be RFC 3339 or epoch milliseconds".into()),
        "$numberDecimal" => match payload.as_str() {
            Some(s) if is_decimal_literal(s) => Ok(BsonType::Decimal),
            _ => Err("$numberDecimal must be a decimal string".into()),
        },
        "$numberInt" => match payload.as_str().map(str::parse::<i32>) {
            Some(Ok(_)) => Ok(BsonType::Int),
            _ => Err("$numberInt must be a 32-bit integer string".into()),
        },
        "$numberLong" => match payload.as_str().map(str::parse::<i64>) {
            Some(Ok(_)) => Ok(BsonType::Long),
            _ => Err("$numberLong must be a 64-bit integer string".into()),
        },
        "$numberDouble" => match payload.as_str() {
            Some(s) if parse_double(s).is_some() => Ok(BsonType::Double),
            _ => Err("$numberDouble must be a floating point string".into()),
        },
        other => Err(format!("unsupported wrapper '{}'", other)),
    }
}

/// Returns the hex string of an ObjectId value
pub fn object_id_hex(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    match wrapper(obj)? {
        ("$oid", Value::String(hex)) if is_object_id_hex(hex) => Some(hex.as_str()),
        _ => None,
    }
}

/// Returns a date value as milliseconds since the epoch
pub fn date_millis(value: &Value) -> Option<i64> {
    let obj = value.as_object()?;
    match wrapper(obj)? {
        ("$date", payload) => parse_date_payload(payload),
        _ => None,
    }
}

/// Returns the literal of a decimal value
pub fn decimal_literal(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    match wrapper(obj)? {
        ("$numberDecimal", Value::String(s)) if is_decimal_literal(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Returns the numeric value of any numeric BSON value.
///
/// Decimals are approximated as f64, which is enough for `minimum` checks
/// and key ordering.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(obj) => match wrapper(obj)? {
            ("$numberInt", Value::String(s)) => s.parse::<i32>().ok().map(f64::from),
            ("$numberLong", Value::String(s)) => s.parse::<i64>().ok().map(|v| v as f64),
            ("$numberDouble", Value::String(s)) => parse_double(s),
            ("$numberDecimal", Value::String(s)) if is_decimal_literal(s) => parse_double(s),
            _ => None,
        },
        _ => None,
    }
}

fn parse_date_payload(payload: &Value) -> Option<i64> {
    match payload {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        Value::Number(n) => n.as_i64(),
        Value::Object(obj) => match wrapper(obj)? {
            ("$numberLong", Value::String(s)) => s.parse::<i64>().ok(),
            _ => None,
        },
        _ => None,
    }
}

fn parse_double(s: &str) -> Option<f64> {
    match s {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if is_decimal_literal(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Whether a string is exactly 24 hex characters
pub fn is_object_id_hex(s: &str) -> bool {
    s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_decimal_literal(s: &str) -> bool {
    static DECIMAL: OnceLock<Option<regex::Regex>> = OnceLock::new();
    DECIMAL
        .get_or_init(|| {
            regex::Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$|^-?Infinity$|^NaN$")
                .ok()
        })
        .as_ref()
        .map_or(false, |re| re.is_match(s))
}

/// Human readable type name for error messages, tolerant of malformed wrappers
pub fn describe(value: &Value) -> String {
    match classify(value) {
        Ok(t) => t.type_name().to_string(),
        Err(_) => "malformed extended json".to_string(),
    }
}
