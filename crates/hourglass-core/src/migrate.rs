//! Stepwise schema migration shared by every backend.
//!
//! A backend describes its schema history as numbered steps: step `n` turns a
//! version-`n` store into a version-`n + 1` store. [`run_migrations`] applies
//! the steps in order and persists the new version after each one, stopping at
//! the first failure so the store is left at the last completed version.

use tracing::{debug, info};

/// One backend's migration steps and version bookkeeping.
///
/// Implementations are expected to hold whatever write serialization the
/// backend needs for the whole run (e.g. an exclusive lock guard), so that a
/// step and its version bump are not interleaved with other writes.
pub trait Migration {
  type Error;

  /// The version a fully migrated store is at.
  const TARGET: u32;

  fn current_version(&mut self) -> Result<u32, Self::Error>;

  /// Apply the structural change that upgrades a store at `from`.
  fn apply_step(&mut self, from: u32) -> Result<(), Self::Error>;

  /// Durably record `version` as the store's schema version.
  fn set_version(&mut self, version: u32) -> Result<(), Self::Error>;
}

/// Migrate to [`Migration::TARGET`] and return the resulting version.
pub fn run_migrations<M: Migration>(migration: &mut M) -> Result<u32, M::Error> {
  let mut version = migration.current_version()?;
  if version >= M::TARGET {
    debug!(version, "schema already current");
    return Ok(version);
  }

  while version < M::TARGET {
    debug!(from = version, "applying migration step");
    migration.apply_step(version)?;
    migration.set_version(version + 1)?;
    version += 1;
  }

  info!(version, "schema migrated");
  Ok(version)
}

#[cfg(test)]
mod tests {
  use super::*;

  /// In-memory migration that records what it was asked to do.
  struct Recorder {
    version:  u32,
    applied:  Vec<u32>,
    fail_at:  Option<u32>,
  }

  impl Recorder {
    fn at(version: u32) -> Self {
      Self { version, applied: Vec::new(), fail_at: None }
    }
  }

  impl Migration for Recorder {
    type Error = String;

    const TARGET: u32 = 3;

    fn current_version(&mut self) -> Result<u32, String> { Ok(self.version) }

    fn apply_step(&mut self, from: u32) -> Result<(), String> {
      if self.fail_at == Some(from) {
        return Err(format!("step {from} failed"));
      }
      self.applied.push(from);
      Ok(())
    }

    fn set_version(&mut self, version: u32) -> Result<(), String> {
      self.version = version;
      Ok(())
    }
  }

  #[test]
  fn applies_every_step_in_order() {
    let mut m = Recorder::at(0);
    assert_eq!(run_migrations(&mut m).unwrap(), 3);
    assert_eq!(m.applied, vec![0, 1, 2]);
    assert_eq!(m.version, 3);
  }

  #[test]
  fn resumes_from_current_version() {
    let mut m = Recorder::at(2);
    run_migrations(&mut m).unwrap();
    assert_eq!(m.applied, vec![2]);
  }

  #[test]
  fn second_run_is_a_noop() {
    let mut m = Recorder::at(0);
    run_migrations(&mut m).unwrap();
    m.applied.clear();

    assert_eq!(run_migrations(&mut m).unwrap(), 3);
    assert!(m.applied.is_empty());
  }

  #[test]
  fn failure_leaves_last_completed_version() {
    let mut m = Recorder::at(0);
    m.fail_at = Some(1);

    let err = run_migrations(&mut m).unwrap_err();
    assert_eq!(err, "step 1 failed");
    assert_eq!(m.version, 1);
    assert_eq!(m.applied, vec![0]);

    // Retry once the cause is gone.
    m.fail_at = None;
    assert_eq!(run_migrations(&mut m).unwrap(), 3);
    assert_eq!(m.applied, vec![0, 1, 2]);
  }
}
