//! Error types for the drought-calendar crate.

/// Error type for all fallible operations in the drought-calendar crate.
///
/// Covers validation of month numbers, year-month strings and the
/// Gregorian dates built from them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum CalendarError {
    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u8,
    },

    /// Returned when a year/month/day triple is not a Gregorian date.
    #[error("invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year of the rejected date.
        year: i32,
        /// Month of the rejected date.
        month: u8,
        /// Day of the rejected date.
        day: u8,
    },

    /// Returned when a `YYYY-MM` string cannot be parsed.
    #[error("invalid year-month '{input}': expected YYYY-MM")]
    InvalidYearMonth {
        /// The string that failed to parse.
        input: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_month() {
        let err = CalendarError::InvalidMonth { month: 13 };
        assert_eq!(err.to_string(), "invalid month: 13 (must be 1..=12)");
    }

    #[test]
    fn error_invalid_date() {
        let err = CalendarError::InvalidDate {
            year: 2001,
            month: 2,
            day: 29,
        };
        assert_eq!(err.to_string(), "invalid date: 2001-02-29");
    }

    #[test]
    fn error_invalid_year_month() {
        let err = CalendarError::InvalidYearMonth {
            input: "2018/1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid year-month '2018/1': expected YYYY-MM"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<CalendarError>();
    }
}
