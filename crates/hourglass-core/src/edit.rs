//! Field-level edits of a saved activity.
//!
//! An edit names one field and supplies zero or more raw values from the
//! command line. [`apply`] validates them and mutates the activity in place;
//! persisting the result is the caller's job.

use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::{Error, Result, activity::Activity, tags};

/// Local wall-clock date and time, e.g. `2024-03-09 14:30`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Date and time with an explicit offset, e.g. `2024-03-09 14:30 -0700`.
pub const DATE_WITH_ZONE_FORMAT: &str = "%Y-%m-%d %H:%M %z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EditField {
  Name,
  Project,
  Tags,
  Start,
  End,
}

impl EditField {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownField(s.to_owned()))
  }
}

/// Apply `values` to `field` of `activity`.
///
/// - `name`: required; multiple values are joined with spaces.
/// - `project`: joined with spaces; no values clears the project.
/// - `tags`: each value is one tag; no values clears the tags.
/// - `start` / `end`: required; joined with spaces and parsed by
///   [`parse_date`].
pub fn apply(activity: &mut Activity, field: EditField, values: &[String]) -> Result<()> {
  match field {
    EditField::Name => {
      if values.is_empty() {
        return Err(Error::MissingValue("name"));
      }
      activity.name = values.join(" ");
    }
    EditField::Project => {
      activity.project = values.join(" ");
    }
    EditField::Tags => {
      validate_tags(values)?;
      activity.tags = values.to_vec();
    }
    EditField::Start | EditField::End => {
      if values.is_empty() {
        return Err(Error::MissingValue("date"));
      }
      let t = parse_date(&values.join(" "))?;
      if field == EditField::Start {
        activity.start = t;
      } else {
        activity.end = Some(t);
      }
    }
  }
  Ok(())
}

pub fn validate_tags(values: &[String]) -> Result<()> {
  values.iter().try_for_each(|t| tags::validate(t))
}

/// Parse a date in [`DATE_FORMAT`] (local time) or [`DATE_WITH_ZONE_FORMAT`].
pub fn parse_date(s: &str) -> Result<DateTime<Local>> {
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, DATE_FORMAT) {
    // A wall-clock time skipped by a DST jump has no local instant.
    return Local
      .from_local_datetime(&naive)
      .earliest()
      .ok_or_else(|| Error::InvalidDate(s.to_owned()));
  }

  DateTime::parse_from_str(s, DATE_WITH_ZONE_FORMAT)
    .map(|dt| dt.with_timezone(&Local))
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}
