//! Query predicates and reporting periods.
//!
//! [`Filter`] is the one definition of what "running" and "between" mean.
//! Backends that filter in application code call [`Filter::matches`]; the
//! SQL backend translates the same variants into `WHERE` clauses.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone};

use crate::activity::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
  All,
  Running,
  /// `lower <= start < upper`.
  Between(DateTime<Local>, DateTime<Local>),
}

impl Filter {
  pub fn matches(&self, activity: &Activity) -> bool {
    match self {
      Self::All => true,
      Self::Running => activity.is_running(),
      Self::Between(lower, upper) => {
        *lower <= activity.start && activity.start < *upper
      }
    }
  }
}

// ─── Periods ─────────────────────────────────────────────────────────────────

/// A reporting window relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
  /// Midnight today to midnight tomorrow.
  Today,
  /// Midnight on the most recent Sunday to midnight the Sunday after.
  Week,
  All,
}

impl Period {
  /// The filter selecting this period's activities as of `now`.
  pub fn filter(self, now: DateTime<Local>) -> Filter {
    let today = now.date_naive();
    match self {
      Self::Today => Filter::Between(
        local_midnight(today),
        local_midnight(today + Days::new(1)),
      ),
      Self::Week => {
        let sunday =
          today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
        Filter::Between(
          local_midnight(sunday),
          local_midnight(sunday + Days::new(7)),
        )
      }
      Self::All => Filter::All,
    }
  }
}

/// The first instant of `date` in local time.
pub fn local_midnight(date: NaiveDate) -> DateTime<Local> {
  let naive = date.and_time(NaiveTime::MIN);
  Local
    .from_local_datetime(&naive)
    .earliest()
    // Some zones skip midnight on DST days; the day then starts an hour later.
    .or_else(|| {
      Local
        .from_local_datetime(&(naive + TimeDelta::hours(1)))
        .earliest()
    })
    .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
  use chrono::Weekday;

  use super::*;

  fn at(s: &str) -> DateTime<Local> {
    crate::edit::parse_date(s).unwrap()
  }

  #[test]
  fn between_is_half_open() {
    let lower = at("2024-03-09 09:00");
    let upper = at("2024-03-09 10:00");
    let filter = Filter::Between(lower, upper);

    let mut a = Activity::new("foo", lower);
    assert!(filter.matches(&a));

    a.start = upper;
    assert!(!filter.matches(&a));

    a.start = upper - TimeDelta::nanoseconds(1);
    assert!(filter.matches(&a));
  }

  #[test]
  fn running_filter() {
    let mut a = Activity::new("foo", Local::now());
    assert!(Filter::Running.matches(&a));
    a.end = Some(a.start + TimeDelta::minutes(1));
    assert!(!Filter::Running.matches(&a));
    assert!(Filter::All.matches(&a));
  }

  #[test]
  fn today_spans_one_calendar_day() {
    let now = at("2024-03-13 15:45");
    let Filter::Between(lower, upper) = Period::Today.filter(now) else {
      panic!("expected a range");
    };
    assert_eq!(lower, at("2024-03-13 00:00"));
    assert_eq!(upper, at("2024-03-14 00:00"));
  }

  #[test]
  fn week_starts_on_sunday() {
    // 2024-03-13 is a Wednesday.
    let now = at("2024-03-13 15:45");
    let Filter::Between(lower, upper) = Period::Week.filter(now) else {
      panic!("expected a range");
    };
    assert_eq!(lower.weekday(), Weekday::Sun);
    assert_eq!(lower, at("2024-03-10 00:00"));
    assert_eq!(upper, at("2024-03-17 00:00"));
  }

  #[test]
  fn week_on_sunday_includes_that_sunday() {
    let now = at("2024-03-10 00:30");
    let Filter::Between(lower, _) = Period::Week.filter(now) else {
      panic!("expected a range");
    };
    assert_eq!(lower, at("2024-03-10 00:00"));
  }

  #[test]
  fn all_has_no_bounds() {
    assert_eq!(Period::All.filter(Local::now()), Filter::All);
  }
}
