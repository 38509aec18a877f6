//! Calendar month with year context.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// A Gregorian calendar month, e.g. `2018-03`.
///
/// Ordering follows time. Construction guarantees that both the first and
/// the last day of the month are representable as [`NaiveDate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Creates a new `YearMonth`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12 and
    /// [`CalendarError::InvalidDate`] if the year is outside chrono's range.
    pub fn new(year: i32, month: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        let ym = Self { year, month };
        // Both ends must exist for the accessors below to be infallible.
        NaiveDate::from_ymd_opt(year, month as u32, 1)
            .and_then(|_| ym.checked_last_day())
            .ok_or(CalendarError::InvalidDate {
                year,
                month,
                day: 1,
            })?;
        Ok(ym)
    }

    /// The month containing `date`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] when the month's last day lies
    /// past chrono's range (December of its final year).
    pub fn from_date(date: NaiveDate) -> Result<Self, CalendarError> {
        Self::new(date.year(), date.month() as u8)
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, 1)
            .expect("YearMonth always holds a representable month")
    }

    /// Last day of the month (28..=31 depending on month and leap year).
    pub fn last_day(self) -> NaiveDate {
        self.checked_last_day()
            .expect("YearMonth always holds a representable month")
    }

    fn checked_last_day(self) -> Option<NaiveDate> {
        let (y, m) = if self.month == 12 {
            (self.year.checked_add(1)?, 1)
        } else {
            (self.year, self.month as u32 + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
    }

    /// Whether `date` falls inside this month.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month as u32
    }

    /// The month `n` months earlier.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] when the result leaves chrono's range.
    pub fn minus_months(self, n: u32) -> Result<Self, CalendarError> {
        self.offset(-(n as i64))
    }

    /// The month `n` months later.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] when the result leaves chrono's range.
    pub fn plus_months(self, n: u32) -> Result<Self, CalendarError> {
        self.offset(n as i64)
    }

    /// The preceding month (`2018-01` -> `2017-12`).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] at the lower end of chrono's range.
    pub fn prev(self) -> Result<Self, CalendarError> {
        self.offset(-1)
    }

    /// Number of whole months from `other` to `self` (negative when `self` is earlier).
    pub fn months_since(self, other: Self) -> i64 {
        self.index() - other.index()
    }

    fn index(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn offset(self, delta: i64) -> Result<Self, CalendarError> {
        let idx = self.index() + delta;
        let year = idx.div_euclid(12);
        let month = (idx.rem_euclid(12) + 1) as u8;
        let year = i32::try_from(year).map_err(|_| CalendarError::InvalidDate {
            year: self.year,
            month: self.month,
            day: 1,
        })?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    /// Parses `YYYY-MM`; a trailing `-DD` day component is accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidYearMonth {
            input: s.to_string(),
        };
        let mut parts = s.trim().splitn(3, '-');
        let year: i32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let month: u8 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        if let Some(day) = parts.next() {
            day.parse::<u8>().map_err(|_| invalid())?;
        }
        Self::new(year, month)
    }
}
