//! Validation errors for request parameters.

use thiserror::Error;

/// Errors raised while validating user-supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Currency code is not three upper-case letters.
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    /// Date is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl ValidationError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidCurrencyCode(_) => "INVALID_CURRENCY_CODE",
            ValidationError::InvalidDate(_) => "INVALID_DATE",
        }
    }
}
