//! [`CsvStore`] — the flat-file implementation of [`ActivityStore`].

use std::{
  fs::{File, OpenOptions},
  io::{BufReader, Read, Seek, SeekFrom, Write},
  path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use hourglass_core::{
  Activity, ActivityStore, Aggregate,
  migrate::{Migration, run_migrations},
  query::Filter,
};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::{
  Error, FrontMatter, Result,
  record::{RawRecord, RecordScanner, encode_activity, header},
  splice::splice,
};

/// The schema version a fully migrated store is at.
pub const VERSION: u32 = 1;

const DATA_START: u64 = FrontMatter::LEN as u64;

/// What the front matter says, cached for the life of the store.
#[derive(Debug, Clone, Copy, Default)]
struct State {
  version: u32,
  last_id: i64,
}

impl State {
  fn front_matter(&self) -> FrontMatter {
    FrontMatter { version: self.version, last_id: self.last_id }
  }

  fn ensure_migrated(&self) -> Result<()> {
    if self.version == 0 {
      return Err(Error::NotMigrated);
    }
    Ok(())
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An activity store backed by a single CSV file.
///
/// Reads hold the shared side of the lock for the whole file operation and
/// every write holds the exclusive side, so one instance may be shared freely
/// between threads. Two instances (or two processes) on the same file are not
/// coordinated.
#[derive(Debug)]
pub struct CsvStore {
  path:  PathBuf,
  state: RwLock<State>,
}

impl CsvStore {
  /// Open the store at `path`, reading its front matter.
  ///
  /// A missing or empty file is a version 0 store; run
  /// [`ActivityStore::migrate`] before using it. If a record carries an id
  /// above the front matter's last id (a create whose front matter rewrite
  /// never landed) the larger id is adopted.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let state = load_state(&path)?;
    debug!(path = %path.display(), ?state, "opened csv store");
    Ok(Self { path, state: RwLock::new(state) })
  }

  pub fn path(&self) -> &Path { &self.path }

  fn open_read(&self) -> Result<File> { Ok(File::open(&self.path)?) }

  fn open_write(&self) -> Result<File> {
    Ok(OpenOptions::new().read(true).write(true).open(&self.path)?)
  }

  /// Decode every record and keep those matching `filter`, in file order.
  ///
  /// Records that fail to decode do not stop the scan; all of their errors
  /// are returned together.
  fn find_activities(&self, filter: Filter) -> Result<Vec<Activity>> {
    let state = self.state.read();
    state.ensure_migrated()?;
    let file = self.open_read()?;

    let mut activities = Vec::new();
    let mut errors = Aggregate::new();
    for record in records(&file)? {
      match record?.decode() {
        Ok(a) if filter.matches(&a) => activities.push(a),
        Ok(_) => {}
        Err(e) => errors.push(e),
      }
    }
    errors.into_result(activities).map_err(Error::from_aggregate)
  }

  fn insert(&self, activity: &mut Activity) -> Result<()> {
    let mut state = self.state.write();
    state.ensure_migrated()?;

    let id = state.last_id + 1;
    let record = encode_activity(&Activity { id, ..activity.clone() })?;
    let mut file = self.open_write()?;
    debug!(id, len = record.len(), "append record");

    file.seek(SeekFrom::End(0))?;
    file.write_all(record.as_bytes())?;
    state.last_id = id;

    write_front_matter(&mut file, state.front_matter())?;
    activity.id = id;
    Ok(())
  }

  fn update(&self, activity: &Activity) -> Result<()> {
    let state = self.state.write();
    state.ensure_migrated()?;

    let record = encode_activity(activity)?;
    let mut file = self.open_write()?;
    let old = locate(&file, activity.id)?;
    debug!(
      id = activity.id,
      offset = old.offset,
      old_len = old.len(),
      new_len = record.len(),
      "rewrite record"
    );
    splice(&mut file, old.offset, old.len(), record.as_bytes())?;
    Ok(())
  }
}

// ─── File helpers ────────────────────────────────────────────────────────────

/// The state recorded in the file at `path`.
///
/// A missing or empty file is version 0. If a record carries an id above the
/// front matter's last id, the larger id wins.
fn load_state(path: &Path) -> Result<State> {
  let mut state = State::default();
  if !path.exists() {
    return Ok(state);
  }

  let file = File::open(path)?;
  if let Some(fm) = read_front_matter(&file)? {
    state.version = fm.version;
    state.last_id = fm.last_id;
  }
  if state.version > VERSION {
    return Err(Error::UnsupportedVersion(state.version));
  }
  if state.version > 0 {
    let max_id = scan_max_id(&file)?;
    if max_id > state.last_id {
      warn!(
        path = %path.display(),
        front_matter = state.last_id,
        scanned = max_id,
        "stale last id in front matter; using scanned maximum"
      );
      state.last_id = max_id;
    }
  }
  Ok(state)
}

fn read_front_matter(file: &File) -> Result<Option<FrontMatter>> {
  let mut bytes = Vec::with_capacity(FrontMatter::LEN);
  file.take(DATA_START).read_to_end(&mut bytes)?;
  FrontMatter::parse(&bytes)
}

fn write_front_matter(file: &mut File, fm: FrontMatter) -> Result<()> {
  file.seek(SeekFrom::Start(0))?;
  file.write_all(fm.encode().as_bytes())?;
  file.flush()?;
  Ok(())
}

/// The data records of a migrated file, header checked and skipped.
fn records(file: &File) -> Result<RecordScanner<BufReader<&File>>> {
  let mut reader = BufReader::new(file);
  reader.seek(SeekFrom::Start(DATA_START))?;
  let mut scanner = RecordScanner::new(reader, DATA_START);

  match scanner.next().transpose()? {
    Some(first) if first.bytes == header().as_bytes() => Ok(scanner),
    Some(first) => Err(Error::InvalidRecord {
      offset: first.offset,
      reason: "expected the header record".into(),
    }),
    None => Err(Error::InvalidRecord {
      offset: DATA_START,
      reason: "missing header record".into(),
    }),
  }
}

/// The first record whose id field is `id`.
fn locate(file: &File, id: i64) -> Result<RawRecord> {
  for record in records(file)? {
    let record = record?;
    if record.id()? == id {
      return Ok(record);
    }
  }
  Err(Error::NotFound(id))
}

/// The largest readable id in the file, or 0.
fn scan_max_id(file: &File) -> Result<i64> {
  let mut max = 0;
  for record in records(file)? {
    match record?.id() {
      Ok(id) => max = max.max(id),
      // Reported by the read that decodes it.
      Err(e) => debug!(error = %e, "skipping unreadable id"),
    }
  }
  Ok(max)
}

// ─── Migration ───────────────────────────────────────────────────────────────

/// Migration steps run under the store's exclusive lock.
///
/// The version is re-read from disk rather than trusted from the cache, since
/// another instance may have migrated the file since this one opened it.
struct CsvMigration<'a> {
  path:  &'a Path,
  state: &'a mut State,
}

impl Migration for CsvMigration<'_> {
  type Error = Error;

  const TARGET: u32 = VERSION;

  fn current_version(&mut self) -> Result<u32> {
    *self.state = load_state(self.path)?;
    Ok(self.state.version)
  }

  fn apply_step(&mut self, from: u32) -> Result<()> {
    match from {
      0 => {
        let mut file = OpenOptions::new()
          .read(true)
          .write(true)
          .create(true)
          .truncate(false)
          .open(self.path)?;
        if let Some(fm) = read_front_matter(&file)?
          && fm.version > 0
        {
          // Laid out since the version was read; keep its records.
          debug!(version = fm.version, "store already laid out");
          self.state.last_id = fm.last_id;
          return Ok(());
        }

        // A version 0 file holds no records; start it over.
        file.set_len(0)?;
        self.state.last_id = 0;
        let fm = FrontMatter { version: 0, last_id: 0 };
        write_front_matter(&mut file, fm)?;
        file.write_all(header().as_bytes())?;
        file.flush()?;
      }
      other => return Err(Error::UnknownMigrationStep(other)),
    }
    Ok(())
  }

  fn set_version(&mut self, version: u32) -> Result<()> {
    let mut file = OpenOptions::new().write(true).open(self.path)?;
    let fm = FrontMatter { version, last_id: self.state.last_id };
    write_front_matter(&mut file, fm)?;
    self.state.version = version;
    Ok(())
  }
}

// ─── ActivityStore impl ──────────────────────────────────────────────────────

impl ActivityStore for CsvStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  fn valid(&self) -> Result<bool> {
    if !self.path.exists() {
      return Ok(self.path.parent().is_none_or(|dir| {
        dir.as_os_str().is_empty() || dir.is_dir()
      }));
    }

    let _state = self.state.read();
    let file = self.open_read()?;
    read_front_matter(&file)?;
    Ok(true)
  }

  fn version(&self) -> Result<u32> { Ok(self.state.read().version) }

  fn migrate(&self) -> Result<()> {
    let mut state = self.state.write();
    run_migrations(&mut CsvMigration { path: &self.path, state: &mut *state })?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  fn save_activity(&self, activity: &mut Activity) -> Result<()> {
    if activity.id == 0 {
      self.insert(activity)
    } else {
      self.update(activity)
    }
  }

  fn delete_activity(&self, id: i64) -> Result<()> {
    let state = self.state.write();
    state.ensure_migrated()?;
    let mut file = self.open_write()?;

    let old = locate(&file, id)?;
    debug!(id, offset = old.offset, len = old.len(), "delete record");
    splice(&mut file, old.offset, old.len(), &[])?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  fn find_activity(&self, id: i64) -> Result<Activity> {
    let state = self.state.read();
    state.ensure_migrated()?;
    let file = self.open_read()?;
    locate(&file, id)?.decode()
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
