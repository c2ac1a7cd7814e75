pub(crate) mod auth;
pub(crate) mod board;
pub(crate) mod dashboard;
pub(crate) mod directory;
pub(crate) mod error;
pub(crate) mod hours;

pub(crate) use error::ApiError;

use time::{macros::format_description, Date};

/// Parse a `YYYY-MM-DD` request date.
fn parse_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::bad_request(format!("could not parse date: {}", s)))
}

fn parse_optional_date(s: Option<&str>) -> Result<Option<Date>, ApiError> {
    s.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()
}

/// Empty strings from form selects mean "not set".
fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn parses_iso_dates() {
        let date = parse_date("2024-03-15").unwrap();
        assert_eq!(date, Date::from_calendar_date(2024, Month::March, 15).unwrap());
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn blank_optional_dates_are_none() {
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert!(parse_optional_date(Some("2024-02-30")).is_err());
    }

    #[test]
    fn blank_strings_are_none() {
        assert_eq!(non_empty(Some(" ".to_string())), None);
        assert_eq!(non_empty(Some(" a ".to_string())), Some("a".to_string()));
    }
}
