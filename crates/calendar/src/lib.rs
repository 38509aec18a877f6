//! # drought-calendar
//!
//! Monthly calendar arithmetic for temporal stratification and the
//! hydrological calendar used by low-flow metrics.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["NaiveDate"] -->|"YearMonth::from_date()"| B["YearMonth"]
//!     B -->|".minus_months() / .prev()"| B
//!     B -->|".last_day()"| A
//!     A -->|"hydrological_water_year()"| C["water year"]
//!     A -->|"Season::of()"| D["Season"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use drought_calendar::{Season, YearMonth, water_year};
//!
//! let target: YearMonth = "2018-03".parse().unwrap();
//! let history_start = target.minus_months(3).unwrap();
//! assert_eq!(history_start.to_string(), "2017-12");
//! assert_eq!(target.prev().unwrap().last_day().to_string(), "2018-02-28");
//!
//! assert_eq!(water_year(2000, 10, 10).unwrap(), 2001);
//! assert_eq!(Season::from_month(1).unwrap(), Season::Djf);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `year_month` | Calendar month with year context |
//! | `water_year` | Water year computation |
//! | `season` | Meteorological seasons |
//! | `error` | Error types |

mod error;
mod season;
mod water_year;
mod year_month;

pub use error::CalendarError;
pub use season::Season;
pub use water_year::{OCTOBER, hydrological_water_year, water_year};
pub use year_month::YearMonth;
