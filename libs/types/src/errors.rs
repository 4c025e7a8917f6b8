//! Error types for record intake
//!
//! Record-level error taxonomy using thiserror. Neither error is fatal to
//! the stream: the offending record is skipped and the stream continues.

use thiserror::Error;

use crate::record::Year;

/// A channel message that could not be turned into a `YearRecord`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedRecordError {
    #[error("Invalid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Message is not a JSON object")]
    NotAnObject,

    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    #[error("Non-numeric value for {field}: {value}")]
    NonNumeric { field: &'static str, value: String },

    #[error("Year is not an integer: {value}")]
    NonIntegerYear { value: String },

    #[error("Negative or non-finite value for {field}: {value}")]
    Negative { field: &'static str, value: f64 },
}

/// A record whose year precedes the most recently accepted year.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Out-of-order record: year {year} arrived after {last_year}")]
pub struct OutOfOrderError {
    pub year: Year,
    pub last_year: Year,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = MalformedRecordError::MissingField { field: "female" };
        assert_eq!(err.to_string(), "Missing field: female");
    }

    #[test]
    fn test_non_numeric_display() {
        let err = MalformedRecordError::NonNumeric {
            field: "total",
            value: "\"n/a\"".to_string(),
        };
        assert!(err.to_string().contains("total"));
        assert!(err.to_string().contains("n/a"));
    }

    #[test]
    fn test_out_of_order_display() {
        let err = OutOfOrderError {
            year: 1903,
            last_year: 1905,
        };
        assert_eq!(
            err.to_string(),
            "Out-of-order record: year 1903 arrived after 1905"
        );
    }
}
