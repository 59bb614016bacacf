//! Shared validation helpers for inbound HTTP adapters.

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use crate::domain::{Error, UserResponse};

/// Longest accepted reschedule reason, in characters.
pub(crate) const MAX_REASON_CHARS: usize = 500;
/// Longest accepted manager note, in characters.
pub(crate) const MAX_MANAGER_NOTE_CHARS: usize = 1000;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidDate,
    DateNotInFuture,
    InvalidTime,
    TooLong,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidDate => "invalid_date",
            Self::DateNotInFuture => "date_not_in_future",
            Self::InvalidTime => "invalid_time",
            Self::TooLong => "too_long",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a `YYYY-MM-DD` date that must fall strictly after `today`.
pub(crate) fn parse_future_date(
    value: &str,
    field: FieldName,
    today: NaiveDate,
) -> Result<NaiveDate, Error> {
    let name = field.as_str();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        value_error(
            field,
            ErrorCode::InvalidDate,
            format!("{name} must be a YYYY-MM-DD date"),
            value,
        )
    })?;
    if date <= today {
        return Err(value_error(
            field,
            ErrorCode::DateNotInFuture,
            format!("{name} must be after today"),
            value,
        ));
    }
    Ok(date)
}

/// Parse an `HH:MM` or `HH:MM:SS` time of day.
pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            let name = field.as_str();
            value_error(
                field,
                ErrorCode::InvalidTime,
                format!("{name} must be HH:MM or HH:MM:SS"),
                value,
            )
        })
}

/// Reject text longer than `max` characters.
pub(crate) fn check_max_chars(value: &str, field: FieldName, max: usize) -> Result<(), Error> {
    if value.chars().count() > max {
        let name = field.as_str();
        return Err(field_error(
            field,
            ErrorCode::TooLong,
            format!("{name} must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn parse_user_response(value: &str, field: FieldName) -> Result<UserResponse, Error> {
    value.parse().map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            ErrorCode::InvalidValue,
            format!("{name} must be ACCEPT or REJECT"),
            value,
        )
    })
}
