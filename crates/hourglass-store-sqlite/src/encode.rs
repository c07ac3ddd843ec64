//! Conversion between [`Activity`] and the plain-text columns of the
//! `activities` table.
//!
//! Timestamps go through [`hourglass_core::timestamp`] (UTC on write, local
//! time on read); tags through [`hourglass_core::tags`].

use hourglass_core::{Activity, tags, timestamp};
use rusqlite::{Row, types::Value};

use crate::Result;

/// The column list every `SELECT` uses, in [`RawActivity::from_row`] order.
pub const COLUMNS: &str = "id, name, project, tags, start, \"end\"";

/// Bound values for `name, project, tags, start, end`. Fails on timestamps
/// that cannot be encoded.
pub fn activity_params(a: &Activity) -> Result<Vec<Value>> {
  Ok(vec![
    Value::Text(a.name.clone()),
    Value::Text(a.project.clone()),
    Value::Text(tags::encode(&a.tags)),
    Value::Text(timestamp::encode(&a.start)?),
    Value::Text(timestamp::encode_end(a.end.as_ref())?),
  ])
}

/// Raw values read directly from an `activities` row.
pub struct RawActivity {
  pub id:      i64,
  pub name:    String,
  pub project: String,
  pub tags:    String,
  pub start:   String,
  pub end:     String,
}

impl RawActivity {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      name:    row.get(1)?,
      project: row.get(2)?,
      tags:    row.get(3)?,
      start:   row.get(4)?,
      end:     row.get(5)?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      id:      self.id,
      name:    self.name,
      project: self.project,
      tags:    tags::decode(&self.tags),
      start:   timestamp::decode(&self.start)?,
      end:     timestamp::decode_end(&self.end)?,
    })
  }
}
