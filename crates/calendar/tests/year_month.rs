use chrono::{Datelike, NaiveDate};
use drought_calendar::{CalendarError, YearMonth};

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

#[test]
fn stratification_window_bounds() {
    // Target 2018-03 with 3 months of history: inputs cover
    // (2017-11-30, 2018-02-28], the target lies in (2018-02-28, 2018-03-31].
    let target = ym("2018-03");
    let max_train = target.prev().unwrap().last_day();
    let min_date = target.prev().unwrap().minus_months(3).unwrap().last_day();
    assert_eq!(max_train, NaiveDate::from_ymd_opt(2018, 2, 28).unwrap());
    assert_eq!(min_date, NaiveDate::from_ymd_opt(2017, 11, 30).unwrap());
    assert_eq!(target.last_day(), NaiveDate::from_ymd_opt(2018, 3, 31).unwrap());
}

#[test]
fn walking_backwards_visits_every_month_once() {
    let mut cursor = ym("2001-02");
    let stop = ym("1999-11");
    let mut visited = Vec::new();
    while cursor >= stop {
        visited.push(cursor.to_string());
        cursor = cursor.prev().unwrap();
    }
    assert_eq!(
        visited,
        vec!["2001-02", "2001-01", "2000-12", "2000-11", "2000-10", "2000-09", "2000-08",
             "2000-07", "2000-06", "2000-05", "2000-04", "2000-03", "2000-02", "2000-01",
             "1999-12", "1999-11"]
    );
}

#[test]
fn from_date_round_trips_through_days() {
    let date = NaiveDate::from_ymd_opt(2016, 2, 29).unwrap();
    let month = YearMonth::from_date(date).unwrap();
    assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
    assert_eq!(month.last_day(), date);
    assert!(month.contains(date));
}

#[test]
fn from_date_rejects_unrepresentable_month_end() {
    let date = NaiveDate::MAX.with_day(1).unwrap();
    assert_eq!(date.month(), 12);
    assert!(matches!(
        YearMonth::from_date(date),
        Err(CalendarError::InvalidDate { .. })
    ));
    let earlier = NaiveDate::from_ymd_opt(NaiveDate::MAX.year(), 11, 30).unwrap();
    assert_eq!(YearMonth::from_date(earlier).unwrap().last_day(), earlier);
}
