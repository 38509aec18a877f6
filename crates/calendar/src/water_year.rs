//! Hydrological water year.

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// First month of the hydrological water year used for low-flow statistics.
pub const OCTOBER: u8 = 10;

/// Computes the water year for a calendar `year` and `month`.
///
/// Months from `start_month` onward count towards the *next* year's water
/// year; with `start_month = 1` the water year is the calendar year.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if `month` or `start_month` is
/// outside 1..=12.
///
/// # Examples
///
/// ```
/// use drought_calendar::water_year;
///
/// assert_eq!(water_year(2000, 10, 10).unwrap(), 2001);
/// assert_eq!(water_year(2001, 9, 10).unwrap(), 2001);
/// assert_eq!(water_year(2000, 6, 1).unwrap(), 2000);
/// ```
pub fn water_year(year: i32, month: u8, start_month: u8) -> Result<i32, CalendarError> {
    for m in [month, start_month] {
        if !(1..=12).contains(&m) {
            return Err(CalendarError::InvalidMonth { month: m });
        }
    }
    Ok(if start_month > 1 && month >= start_month {
        year + 1
    } else {
        year
    })
}

/// Water year of `date` for an October start (Oct 2000 -> 2001).
pub fn hydrological_water_year(date: NaiveDate) -> i32 {
    let month = date.month() as u8;
    if month >= OCTOBER {
        date.year() + 1
    } else {
        date.year()
    }
}
