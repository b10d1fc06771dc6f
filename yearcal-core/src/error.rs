//! Error types for the yearcal ecosystem.
//!
//! Field and rule errors never escape a document parse: the ICS parser
//! recovers from them per VEVENT block. They are public so callers that work
//! with single tokens (the feed adapter, tests) can inspect them.

use thiserror::Error;

/// A single date, datetime or duration token could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    #[error("Timestamp '{0}' must be YYYYMMDD or YYYYMMDDTHHMMSS[Z]")]
    Shape(String),

    #[error("Timestamp '{0}' contains non-numeric fields")]
    NonNumeric(String),

    #[error("Timestamp '{0}' is not a valid calendar date or time")]
    OutOfRange(String),

    #[error("Duration '{0}' is not a valid ISO-8601 duration")]
    Duration(String),

    #[error("ISO-8601 value '{0}' could not be parsed")]
    Iso8601(String),
}

/// An RRULE token was malformed. The event degrades to non-recurring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("RRULE {key} must be a positive integer, got '{value}'")]
    NotPositive { key: &'static str, value: String },

    #[error("RRULE UNTIL is invalid: {0}")]
    Until(FieldParseError),

    #[error("RRULE BYDAY entry '{0}' is not a weekday code")]
    Weekday(String),
}

/// Errors that can occur in yearcal operations.
#[derive(Error, Debug)]
pub enum YearcalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid year range: {0}")]
    InvalidRange(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error(transparent)]
    Field(#[from] FieldParseError),

    #[error(transparent)]
    Rule(#[from] RuleParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for YearcalError {
    fn from(e: serde_json::Error) -> Self {
        YearcalError::Serialization(e.to_string())
    }
}

/// Result type alias for yearcal operations.
pub type YearcalResult<T> = Result<T, YearcalError>;
