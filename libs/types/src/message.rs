//! Wire codec for channel messages
//!
//! One message per record, serialized as a JSON object:
//!
//! ```text
//! {"year": 1900, "total": 47.3, "female": 48.3, "male": 46.3}
//! ```
//!
//! Field order is not significant and all four fields are required. `year`
//! must be an integer (a JSON integer, or a string holding one); the three
//! life expectancy values must be finite, non-negative JSON numbers.

use serde_json::{Map, Value};

use crate::errors::MalformedRecordError;
use crate::record::{Year, YearRecord};

pub const FIELD_YEAR: &str = "year";
pub const FIELD_TOTAL: &str = "total";
pub const FIELD_FEMALE: &str = "female";
pub const FIELD_MALE: &str = "male";

/// Parse a raw channel message into a `YearRecord`.
pub fn parse_message(raw: &str) -> Result<YearRecord, MalformedRecordError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MalformedRecordError::InvalidJson {
            reason: e.to_string(),
        })?;

    let object = value.as_object().ok_or(MalformedRecordError::NotAnObject)?;

    Ok(YearRecord {
        year: year_field(object)?,
        total: real_field(object, FIELD_TOTAL)?,
        female: real_field(object, FIELD_FEMALE)?,
        male: real_field(object, FIELD_MALE)?,
    })
}

impl YearRecord {
    /// Serialize into the canonical JSON message form.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn year_field(object: &Map<String, Value>) -> Result<Year, MalformedRecordError> {
    let value = object
        .get(FIELD_YEAR)
        .ok_or(MalformedRecordError::MissingField { field: FIELD_YEAR })?;

    let non_integer = || MalformedRecordError::NonIntegerYear {
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|y| Year::try_from(y).ok())
            .ok_or_else(non_integer),
        Value::String(s) => s.trim().parse::<Year>().map_err(|_| non_integer()),
        Value::Null => Err(MalformedRecordError::MissingField { field: FIELD_YEAR }),
        _ => Err(non_integer()),
    }
}

fn real_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<f64, MalformedRecordError> {
    let value = match object.get(field) {
        None | Some(Value::Null) => return Err(MalformedRecordError::MissingField { field }),
        Some(v) => v,
    };

    let number = value
        .as_f64()
        .ok_or_else(|| MalformedRecordError::NonNumeric {
            field,
            value: value.to_string(),
        })?;

    if !number.is_finite() || number < 0.0 {
        return Err(MalformedRecordError::Negative {
            field,
            value: number,
        });
    }

    Ok(number)
}
