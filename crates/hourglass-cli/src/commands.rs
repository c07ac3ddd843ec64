//! Subcommands and their execution against an [`ActivityStore`].
//!
//! Every command produces its whole output as a `String`; printing it is the
//! caller's job. The store and the clock are both generic so tests can run
//! commands against a temp-dir store at a fixed instant.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use clap::{Subcommand, ValueEnum};
use hourglass_core::{
  Activity, ActivityStore,
  clock::Clock,
  edit::{self, EditField},
  query::{Filter, Period},
};
use thiserror::Error;
use tracing::debug;

use crate::report::{ActivityTable, Layout};

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Start a new running activity.
  Start {
    name:    String,
    project: Option<String>,
    tags:    Vec<String>,
  },

  /// Stop every running activity.
  Stop,

  /// Show today's activities (or all of them) with durations.
  Status {
    #[arg(value_enum, default_value_t = StatusScope::Today)]
    scope: StatusScope,
  },

  /// List activities.
  List {
    #[arg(value_enum, default_value_t = ListPeriod::Today)]
    period: ListPeriod,
  },

  /// Edit one field of an activity.
  ///
  /// Each tag is a separate value. Dates are `YYYY-MM-DD HH:MM` in local time
  /// or `YYYY-MM-DD HH:MM +HHMM`.
  Edit {
    id:     i64,
    /// name, project, tags, start or end.
    field:  String,
    #[arg(allow_hyphen_values = true)]
    values: Vec<String>,
  },

  /// Start a new activity with the same name, project and tags as another.
  Restart { id: i64 },

  /// Delete an activity.
  Delete { id: i64 },
}

impl Command {
  /// The subcommand name, for looking up its usage.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Start { .. } => "start",
      Self::Stop => "stop",
      Self::Status { .. } => "status",
      Self::List { .. } => "list",
      Self::Edit { .. } => "edit",
      Self::Restart { .. } => "restart",
      Self::Delete { .. } => "delete",
    }
  }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPeriod {
  Today,
  Week,
  All,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
  Today,
  All,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CommandError {
  /// The arguments were well-formed for the parser but not for the command.
  #[error("syntax error: {0}")]
  Syntax(String),

  #[error(transparent)]
  Store(Box<dyn std::error::Error + Send + Sync>),
}

impl CommandError {
  fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<hourglass_core::Error> for CommandError {
  fn from(e: hourglass_core::Error) -> Self { Self::Syntax(e.to_string()) }
}

pub type Result<T, E = CommandError> = std::result::Result<T, E>;

// ─── Tracker ─────────────────────────────────────────────────────────────────

/// Runs commands against one store with one clock.
pub struct Tracker<S, C> {
  store: S,
  clock: C,
}

impl<S: ActivityStore, C: Clock> Tracker<S, C> {
  pub fn new(store: S, clock: C) -> Self { Self { store, clock } }

  pub fn run(&self, command: &Command) -> Result<String> {
    debug!(command = command.name(), "running command");
    match command {
      Command::Start { name, project, tags } => {
        self.start(name, project.as_deref(), tags)
      }
      Command::Stop => self.stop(),
      Command::Status { scope } => self.status(*scope),
      Command::List { period } => self.list(*period),
      Command::Edit { id, field, values } => self.edit(*id, field, values),
      Command::Restart { id } => self.restart(*id),
      Command::Delete { id } => self.delete(*id),
    }
  }

  fn save(&self, activity: &mut Activity) -> Result<()> {
    self.store.save_activity(activity).map_err(CommandError::store)
  }

  fn find(&self, id: i64) -> Result<Activity> {
    self.store.find_activity(id).map_err(CommandError::store)
  }

  fn select(&self, period: Period) -> Result<Vec<Activity>> {
    let found = match period.filter(self.clock.now()) {
      Filter::All => self.store.find_all_activities(),
      Filter::Running => self.store.find_running_activities(),
      Filter::Between(lower, upper) => {
        self.store.find_activities_between(lower, upper)
      }
    };
    found.map_err(CommandError::store)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  pub fn start(
    &self,
    name: &str,
    project: Option<&str>,
    tags: &[String],
  ) -> Result<String> {
    if name.is_empty() {
      return Err(CommandError::Syntax("missing name argument".into()));
    }
    edit::validate_tags(tags)?;

    let mut activity = Activity::new(name, self.clock.now());
    activity.project = project.unwrap_or_default().to_owned();
    activity.tags = tags.to_vec();
    self.save(&mut activity)?;
    Ok(format!("started activity {}", activity.id))
  }

  pub fn stop(&self) -> Result<String> {
    let end = self.clock.now();
    let running = self
      .store
      .find_running_activities()
      .map_err(CommandError::store)?;

    let mut lines = Vec::with_capacity(running.len());
    for mut activity in running {
      activity.end = Some(end);
      self.save(&mut activity)?;
      lines.push(format!("stopped activity {}", activity.id));
    }
    Ok(lines.join("\n"))
  }

  pub fn edit(&self, id: i64, field: &str, values: &[String]) -> Result<String> {
    let field = EditField::parse(field)?;
    let mut activity = self.find(id)?;
    edit::apply(&mut activity, field, values)?;
    self.save(&mut activity)?;
    Ok("ok".into())
  }

  pub fn restart(&self, id: i64) -> Result<String> {
    let mut copy = self.find(id)?.restarted_at(self.clock.now());
    self.save(&mut copy)?;
    Ok(format!("restarted activity {id} (new id: {})", copy.id))
  }

  pub fn delete(&self, id: i64) -> Result<String> {
    self.store.delete_activity(id).map_err(CommandError::store)?;
    Ok(format!("deleted activity {id}"))
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  pub fn list(&self, period: ListPeriod) -> Result<String> {
    let now = self.clock.now();
    let out = match period {
      ListPeriod::Today => {
        let activities = self.select(Period::Today)?;
        if activities.is_empty() {
          return Ok("there have been no activities today".into());
        }
        table(&activities, now, Layout::DAY)
      }
      ListPeriod::Week => {
        let activities = self.select(Period::Week)?;
        if activities.is_empty() {
          return Ok("there have been no activities this week".into());
        }
        by_day(activities)
          .iter()
          .map(|(day, group)| {
            format!(
              "=== {} ===\n{}",
              day.format("%A (%Y-%m-%d)"),
              table(group, now, Layout::DAY)
            )
          })
          .collect::<Vec<_>>()
          .join("\n\n")
      }
      ListPeriod::All => {
        let activities = self.select(Period::All)?;
        if activities.is_empty() {
          return Ok("there aren't any activities".into());
        }
        table(&activities, now, Layout::ALL)
      }
    };
    Ok(out)
  }

  pub fn status(&self, scope: StatusScope) -> Result<String> {
    let now = self.clock.now();
    let (activities, layout, empty) = match scope {
      StatusScope::Today => (
        self.select(Period::Today)?,
        Layout::STATUS,
        "there have been no activities today",
      ),
      StatusScope::All => (
        self.select(Period::All)?,
        Layout::STATUS_ALL,
        "there aren't any activities",
      ),
    };
    if activities.is_empty() {
      return Ok(empty.into());
    }
    Ok(table(&activities, now, layout))
  }
}

fn table(activities: &[Activity], now: DateTime<Local>, layout: Layout) -> String {
  ActivityTable { activities, now, layout }.to_string()
}

/// Activities grouped by local start date, days in order, ids in order
/// within a day.
fn by_day(activities: Vec<Activity>) -> BTreeMap<NaiveDate, Vec<Activity>> {
  let mut days: BTreeMap<NaiveDate, Vec<Activity>> = BTreeMap::new();
  for a in activities {
    days.entry(a.start.date_naive()).or_default().push(a);
  }
  days
}

#[cfg(test)]
mod tests;
