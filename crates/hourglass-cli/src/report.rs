//! Plain-text tables and per-project totals.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Local, TimeDelta};
use hourglass_core::Activity;

const DATE: &str = "%Y-%m-%d";
const TIME: &str = "%H:%M";

/// `HHhMMm`, truncated to the minute. Hours widen past two digits as needed.
pub fn format_duration(d: TimeDelta) -> String {
  let minutes = d.num_minutes();
  let sign = if minutes < 0 { "-" } else { "" };
  let minutes = minutes.unsigned_abs();
  format!("{sign}{:02}h{:02}m", minutes / 60, minutes % 60)
}

// ─── Totals ──────────────────────────────────────────────────────────────────

/// Tracked time summed per project.
///
/// Displays as `bar: 01h00m, unsorted: 00h30m`: sorted by project name, with
/// the unnamed project last under the label `unsorted`.
#[derive(Debug, Default)]
pub struct ProjectTotals {
  named:    BTreeMap<String, TimeDelta>,
  unsorted: Option<TimeDelta>,
}

impl ProjectTotals {
  pub fn add(&mut self, project: &str, d: TimeDelta) {
    let slot = if project.is_empty() {
      self.unsorted.get_or_insert_with(TimeDelta::zero)
    } else {
      self.named.entry(project.to_owned()).or_insert_with(TimeDelta::zero)
    };
    *slot += d;
  }
}

impl fmt::Display for ProjectTotals {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let unsorted = self.unsorted.map(|d| ("unsorted", d));
    let entries = self
      .named
      .iter()
      .map(|(name, d)| (name.as_str(), *d))
      .chain(unsorted);

    for (i, (name, d)) in entries.enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{name}: {}", format_duration(d))?;
    }
    Ok(())
  }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Which columns a table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
  /// Leading `date` column.
  pub date:   bool,
  /// `start` and `end` columns.
  pub times:  bool,
  /// Totals line after the rows.
  pub totals: bool,
}

impl Layout {
  /// `list` for one day or one day of a week.
  pub const DAY: Self = Self { date: false, times: true, totals: true };
  /// `list all`.
  pub const ALL: Self = Self { date: true, times: true, totals: false };
  /// `status`.
  pub const STATUS: Self = Self { date: false, times: false, totals: true };
  /// `status all`.
  pub const STATUS_ALL: Self = Self { date: true, times: false, totals: true };

  fn header(&self) -> Vec<String> {
    let mut cols = Vec::new();
    if self.date {
      cols.push("date");
    }
    cols.extend(["id", "name", "project", "tags", "state"]);
    if self.times {
      cols.extend(["start", "end"]);
    }
    cols.push("duration");
    cols.into_iter().map(str::to_owned).collect()
  }

  fn row(&self, a: &Activity, now: DateTime<Local>) -> Vec<String> {
    let mut cells = Vec::new();
    if self.date {
      cells.push(a.start.format(DATE).to_string());
    }
    cells.extend([
      a.id.to_string(),
      a.name.clone(),
      a.project.clone(),
      a.tag_list(),
      a.status().to_string(),
    ]);
    if self.times {
      cells.push(a.start.format(TIME).to_string());
      cells.push(a.end.map(|t| t.format(TIME).to_string()).unwrap_or_default());
    }
    cells.push(format_duration(a.duration(now)));
    cells
  }
}

/// Activities rendered as aligned `| cell |` rows, as of `now`.
pub struct ActivityTable<'a> {
  pub activities: &'a [Activity],
  pub now:        DateTime<Local>,
  pub layout:     Layout,
}

impl fmt::Display for ActivityTable<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rows: Vec<Vec<String>> = std::iter::once(self.layout.header())
      .chain(self.activities.iter().map(|a| self.layout.row(a, self.now)))
      .collect();

    let mut widths = vec![0; rows[0].len()];
    for row in &rows {
      for (w, cell) in widths.iter_mut().zip(row) {
        *w = (*w).max(cell.chars().count());
      }
    }

    for (i, row) in rows.iter().enumerate() {
      if i > 0 {
        f.write_str("\n")?;
      }
      for (cell, w) in row.iter().zip(&widths) {
        write!(f, "| {cell:<w$} ")?;
      }
      f.write_str("|")?;
    }

    if self.layout.totals {
      let mut totals = ProjectTotals::default();
      for a in self.activities {
        totals.add(&a.project, a.duration(self.now));
      }
      write!(f, "\n{totals}")?;
    }
    Ok(())
  }
}
