use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

/// Canonical wire format for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

lazy_static! {
    // chrono alone accepts single-digit months and days
    static ref DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Parses a `YYYY-MM-DD` date, naming `field` in the error.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    let invalid = || {
        AppError::BadRequest(format!(
            "Invalid {} '{}': expected format YYYY-MM-DD",
            field, value
        ))
    };

    if !DATE_REGEX.is_match(value) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

pub fn ensure_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::BadRequest(
            "start_date must not be after end_date".into(),
        ));
    }
    Ok(())
}
