//! Activity — one tracked unit of time.

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::tags;

/// Whether an activity is still being tracked.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  Running,
  Stopped,
}

/// A named span of time, optionally filed under a project and tagged.
///
/// `id == 0` means the activity has not been saved yet; stores assign the id
/// on first save. `end == None` means the activity is still running.
///
/// Equality compares timestamps as instants, so an activity read back from
/// storage in a different UTC offset is still equal to the one saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  pub id:      i64,
  pub name:    String,
  /// Empty means "unsorted".
  pub project: String,
  pub tags:    Vec<String>,
  pub start:   DateTime<Local>,
  pub end:     Option<DateTime<Local>>,
}

impl Activity {
  /// A new, unsaved, running activity.
  pub fn new(name: impl Into<String>, start: DateTime<Local>) -> Self {
    Self {
      id: 0,
      name: name.into(),
      project: String::new(),
      tags: Vec::new(),
      start,
      end: None,
    }
  }

  pub fn is_running(&self) -> bool { self.end.is_none() }

  pub fn status(&self) -> Status {
    if self.is_running() { Status::Running } else { Status::Stopped }
  }

  /// Time tracked so far; open-ended activities are measured up to `now`.
  pub fn duration(&self, now: DateTime<Local>) -> TimeDelta {
    self.end.unwrap_or(now) - self.start
  }

  /// The tag list as stored: tags joined with `", "`.
  pub fn tag_list(&self) -> String { tags::encode(&self.tags) }

  pub fn set_tag_list(&mut self, list: &str) { self.tags = tags::decode(list); }

  /// An unsaved, running copy of this activity that starts at `start`.
  pub fn restarted_at(&self, start: DateTime<Local>) -> Self {
    Self {
      id: 0,
      name: self.name.clone(),
      project: self.project.clone(),
      tags: self.tags.clone(),
      start,
      end: None,
    }
  }
}
