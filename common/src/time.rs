//! Date parsing helpers.

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    // chrono accepts unpadded fields; the API contract does not.
    if value.len() != 10 {
        return Err(ValidationError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let date = parse_date("2024-12-27").unwrap();
        assert_eq!(date.to_string(), "2024-12-27");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("27-12-2024").is_err());
        assert!(parse_date("2024-1-5").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_leap_day() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
    }
}
