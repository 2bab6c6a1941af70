//! Validation helpers for DTOs.

use time::{Date, macros::format_description};
use validator::ValidationError;

/// Validates and parses a booking date in strict `YYYY-MM-DD` form.
pub fn parse_booking_date(raw: &str) -> Result<Date, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &format).map_err(|_| {
        let mut err = ValidationError::new("booking_date");
        err.message = Some(format!("`{raw}` is not a valid YYYY-MM-DD date").into());
        err
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn accepts_well_formed_dates() {
        assert_eq!(parse_booking_date("2025-06-01").unwrap(), date!(2025 - 06 - 01));
        assert_eq!(parse_booking_date("2024-12-31").unwrap(), date!(2024 - 12 - 31));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_booking_date("2025-6-1").is_err()); // missing zero padding
        assert!(parse_booking_date("01-06-2025").is_err()); // wrong field order
        assert!(parse_booking_date("2025-13-01").is_err()); // no such month
        assert!(parse_booking_date("tomorrow").is_err());
        assert!(parse_booking_date("").is_err());
    }
}
