//! [`SqliteStore`] — the SQLite implementation of [`ActivityStore`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use hourglass_core::{
  Activity, ActivityStore, Aggregate, migrate::run_migrations, query::Filter,
  timestamp,
};
use rusqlite::{Connection, OpenFlags, params_from_iter, types::Value};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{COLUMNS, RawActivity, activity_params},
  schema::{SqlMigration, read_version},
};

// ─── Statement helpers ───────────────────────────────────────────────────────

/// Run one statement, logging it with its arguments.
pub(crate) fn exec(conn: &Connection, sql: &str, args: &[Value]) -> Result<usize> {
  debug!(sql = sql.trim(), ?args, "exec");
  Ok(conn.execute(sql, params_from_iter(args.iter()))?)
}

fn close(conn: Connection) -> Result<()> {
  conn.close().map_err(|(_, e)| Error::Database(e))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An activity store backed by a single SQLite file.
///
/// The store only remembers the path. Each call opens a fresh connection and
/// closes it before returning, so concurrent callers are serialized by
/// SQLite's own locking.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  path: PathBuf,
}

impl SqliteStore {
  /// A store for the database at `path`. Nothing is opened until the first
  /// call; run [`ActivityStore::migrate`] before using a fresh file.
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf() }
  }

  pub fn path(&self) -> &Path { &self.path }

  fn connect(&self) -> Result<Connection> { Ok(Connection::open(&self.path)?) }

  /// Open an existing file without creating it or taking write locks.
  fn connect_read_only(&self) -> Result<Connection> {
    Ok(Connection::open_with_flags(
      &self.path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
  }

  /// Run `f` against a fresh connection and close it afterwards. A failure
  /// to close fails the call even if `f` succeeded.
  fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    let conn = self.connect()?;
    let result = f(&conn);
    match (result, close(conn)) {
      (Ok(value), Ok(())) => Ok(value),
      (Err(e), Ok(())) => Err(e),
      (Ok(_), Err(close_err)) => Err(close_err),
      (Err(e), Err(close_err)) => {
        Err(Error::Aggregate(Aggregate(vec![e, close_err])))
      }
    }
  }

  /// `SELECT` every activity matching `filter`, ordered by id.
  ///
  /// Rows that fail to read or decode do not stop the scan; all of their
  /// errors are returned together.
  fn find_activities(&self, filter: Filter) -> Result<Vec<Activity>> {
    let (predicate, args) = match filter {
      Filter::All => ("", vec![]),
      Filter::Running => (
        "WHERE \"end\" = ?1",
        vec![Value::Text(timestamp::ZERO.to_owned())],
      ),
      Filter::Between(lower, upper) => (
        "WHERE start >= ?1 AND start < ?2",
        vec![
          Value::Text(timestamp::encode(&lower)?),
          Value::Text(timestamp::encode(&upper)?),
        ],
      ),
    };
    self.select(predicate, args)
  }

  fn select(&self, predicate: &str, args: Vec<Value>) -> Result<Vec<Activity>> {
    let sql = format!("SELECT {COLUMNS} FROM activities {predicate} ORDER BY id");

    self.with_connection(|conn| {
      debug!(sql = %sql, ?args, "query");
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt.query_map(params_from_iter(args.iter()), RawActivity::from_row)?;

      let mut activities = Vec::new();
      let mut errors = Aggregate::new();
      for row in rows {
        match row.map_err(Error::from).and_then(RawActivity::into_activity) {
          Ok(activity) => activities.push(activity),
          Err(e) => errors.push(e),
        }
      }

      errors.into_result(activities).map_err(Error::from_aggregate)
    })
  }
}

// ─── ActivityStore impl ──────────────────────────────────────────────────────

impl ActivityStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  fn valid(&self) -> Result<bool> {
    if !self.path.exists() {
      // Opening would create the file; only check that it could be.
      return Ok(self.path.parent().is_none_or(|dir| {
        dir.as_os_str().is_empty() || dir.is_dir()
      }));
    }

    let conn = self.connect_read_only()?;
    // Touch the header so a non-database file is reported here.
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))?;
    close(conn)?;
    Ok(true)
  }

  fn version(&self) -> Result<u32> {
    // A missing file is an unmigrated store; reading it must not create it.
    if !self.path.exists() {
      return Ok(0);
    }
    let conn = self.connect_read_only()?;
    let version = read_version(&conn);
    match (version, close(conn)) {
      (Ok(v), Ok(())) => Ok(v),
      (Err(e), _) | (Ok(_), Err(e)) => Err(e),
    }
  }

  fn migrate(&self) -> Result<()> {
    self.with_connection(|conn| {
      run_migrations(&mut SqlMigration { conn })?;
      Ok(())
    })
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  fn save_activity(&self, activity: &mut Activity) -> Result<()> {
    // Encode first so an unencodable activity never opens the database.
    let mut args = activity_params(activity)?;

    self.with_connection(|conn| {
      if activity.id == 0 {
        exec(
          conn,
          "INSERT INTO activities (name, project, tags, start, \"end\")
           VALUES (?1, ?2, ?3, ?4, ?5)",
          &args,
        )?;
        activity.id = conn.last_insert_rowid();
      } else {
        args.push(Value::Integer(activity.id));
        let updated = exec(
          conn,
          "UPDATE activities
           SET name = ?1, project = ?2, tags = ?3, start = ?4, \"end\" = ?5
           WHERE id = ?6",
          &args,
        )?;
        if updated == 0 {
          return Err(Error::NotFound(activity.id));
        }
      }
      Ok(())
    })
  }

  fn delete_activity(&self, id: i64) -> Result<()> {
    self.with_connection(|conn| {
      let deleted = exec(
        conn,
        "DELETE FROM activities WHERE id = ?1",
        &[Value::Integer(id)],
      )?;
      if deleted != 1 {
        return Err(Error::NotFound(id));
      }
      Ok(())
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  fn find_activity(&self, id: i64) -> Result<Activity> {
    self
      .select("WHERE id = ?1", vec![Value::Integer(id)])?
      .into_iter()
      .next()
      .ok_or(Error::NotFound(id))
  }

  fn find_all_activities(&self) -> Result<Vec<Activity>> {
    self.find_activities(Filter::All)
  }

  fn find_running_activities(&self) -> Result<Vec<Activity>> {
    self.find_activities(Filter::Running)
  }

  fn find_activities_between(
    &self,
    lower: DateTime<Local>,
    upper: DateTime<Local>,
  ) -> Result<Vec<Activity>> {
    self.find_activities(Filter::Between(lower, upper))
  }
}
