//! # Input Validation
//!
//! Field-level validation for amounts and dates. The API layer maps
//! every [`ValidationError`] to a 400 response, so the messages here are
//! user-facing and must name the offending values.

use chrono::NaiveDate;
use thiserror::Error;

/// A rejected input value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A date string did not parse as ISO `YYYY-MM-DD`.
    #[error("invalid {field} format: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    /// An amount was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositiveAmount { field: &'static str, value: f64 },

    /// The end of a date range precedes its start.
    #[error("end date ({end}) precedes start date ({start})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    /// A claim amount exceeds the policy's coverage limit.
    #[error("Claim amount ({claimed}) exceeds policy limit ({limit})")]
    AmountExceedsCoverage { claimed: f64, limit: f64 },
}

/// Parse an ISO `YYYY-MM-DD` date string.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Require a strictly positive, finite amount.
pub fn positive_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NonPositiveAmount { field, value })
    }
}

/// Require a non-empty string field.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Check that `end`, when present, does not precede `start`.
pub fn date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => Err(ValidationError::EndBeforeStart { start, end }),
        _ => Ok(()),
    }
}

/// Check a claim amount against the policy's coverage limit.
///
/// The error message names both values so the client can see exactly
/// which limit was exceeded.
pub fn claim_within_coverage(claimed: f64, limit: f64) -> Result<(), ValidationError> {
    if claimed > limit {
        Err(ValidationError::AmountExceedsCoverage { claimed, limit })
    } else {
        Ok(())
    }
}
