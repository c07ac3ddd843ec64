//! Schema history for the SQLite store.
//!
//! The version lives in a one-row `schema_info` table. Each step is written
//! with `IF NOT EXISTS` / `WHERE NOT EXISTS` so that re-running a step whose
//! version bump never landed is harmless.

use hourglass_core::migrate::Migration;
use rusqlite::{Connection, OptionalExtension as _, types::Value};

use crate::{Error, Result, store::exec};

/// The schema version a fully migrated store is at.
pub const VERSION: u32 = 2;

/// Step 0 → 1: the version table itself.
const CREATE_SCHEMA_INFO: &str = "
CREATE TABLE IF NOT EXISTS schema_info (
    version INTEGER NOT NULL
)";

const SEED_SCHEMA_INFO: &str = "
INSERT INTO schema_info (version)
SELECT 0 WHERE NOT EXISTS (SELECT 1 FROM schema_info)";

/// Step 1 → 2: activities.
///
/// `AUTOINCREMENT` keeps ids strictly increasing even after the newest row
/// is deleted. Timestamps are stored as fixed-width RFC 3339 UTC strings;
/// none of them looks numeric, so `TIMESTAMP` affinity keeps them as text.
const CREATE_ACTIVITIES: &str = "
CREATE TABLE IF NOT EXISTS activities (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    project TEXT NOT NULL,
    tags    TEXT NOT NULL,   -- tags joined with ', '
    start   TIMESTAMP NOT NULL,
    \"end\"   TIMESTAMP NOT NULL  -- zero timestamp while running
)";

/// Migration steps run against one open connection.
pub(crate) struct SqlMigration<'c> {
  pub conn: &'c Connection,
}

impl Migration for SqlMigration<'_> {
  type Error = Error;

  const TARGET: u32 = VERSION;

  fn current_version(&mut self) -> Result<u32> { read_version(self.conn) }

  fn apply_step(&mut self, from: u32) -> Result<()> {
    match from {
      0 => {
        exec(self.conn, CREATE_SCHEMA_INFO, &[])?;
        exec(self.conn, SEED_SCHEMA_INFO, &[])?;
      }
      1 => {
        exec(self.conn, CREATE_ACTIVITIES, &[])?;
      }
      other => return Err(Error::UnknownMigrationStep(other)),
    }
    Ok(())
  }

  fn set_version(&mut self, version: u32) -> Result<()> {
    exec(
      self.conn,
      "UPDATE schema_info SET version = ?1",
      &[Value::Integer(i64::from(version))],
    )?;
    Ok(())
  }
}

/// The stored version; 0 for a database without a `schema_info` table.
pub(crate) fn read_version(conn: &Connection) -> Result<u32> {
  let has_table: bool = conn.query_row(
    "SELECT EXISTS (
       SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_info'
     )",
    [],
    |row| row.get(0),
  )?;
  if !has_table {
    return Ok(0);
  }

  let version: Option<u32> = conn
    .query_row("SELECT version FROM schema_info", [], |row| row.get(0))
    .optional()?;
  Ok(version.unwrap_or(0))
}
