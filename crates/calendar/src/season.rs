//! Meteorological seasons.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::CalendarError;

/// Three-month meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    /// December, January, February.
    Djf,
    /// March, April, May.
    Mam,
    /// June, July, August.
    Jja,
    /// September, October, November.
    Son,
}

impl Season {
    /// All seasons in calendar order starting with winter.
    pub const ALL: [Season; 4] = [Season::Djf, Season::Mam, Season::Jja, Season::Son];

    /// Season for a month number.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn from_month(month: u8) -> Result<Self, CalendarError> {
        match month {
            12 | 1 | 2 => Ok(Season::Djf),
            3..=5 => Ok(Season::Mam),
            6..=8 => Ok(Season::Jja),
            9..=11 => Ok(Season::Son),
            _ => Err(CalendarError::InvalidMonth { month }),
        }
    }

    /// Season containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            12 | 1 | 2 => Season::Djf,
            3..=5 => Season::Mam,
            6..=8 => Season::Jja,
            _ => Season::Son,
        }
    }

    /// Upper-case label, e.g. `"DJF"`.
    pub fn label(self) -> &'static str {
        match self {
            Season::Djf => "DJF",
            Season::Mam => "MAM",
            Season::Jja => "JJA",
            Season::Son => "SON",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DJF" => Ok(Season::Djf),
            "MAM" => Ok(Season::Mam),
            "JJA" => Ok(Season::Jja),
            "SON" => Ok(Season::Son),
            other => Err(format!("unknown season '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_is_winter() {
        assert_eq!(Season::from_month(12).unwrap(), Season::Djf);
        assert_eq!(Season::of(NaiveDate::from_ymd_opt(2000, 12, 1).unwrap()), Season::Djf);
    }

    #[test]
    fn every_month_has_one_season() {
        let mut counts = [0usize; 4];
        for m in 1..=12 {
            let idx = Season::ALL
                .iter()
                .position(|s| *s == Season::from_month(m).unwrap())
                .unwrap();
            counts[idx] += 1;
        }
        assert_eq!(counts, [3, 3, 3, 3]);
    }

    #[test]
    fn invalid_month() {
        assert!(Season::from_month(0).is_err());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("jja".parse::<Season>().unwrap(), Season::Jja);
        assert!("winter".parse::<Season>().is_err());
    }
}
