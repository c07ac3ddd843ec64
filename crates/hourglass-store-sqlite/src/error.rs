//! Error type for `hourglass-store-sqlite`.

use hourglass_core::Aggregate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hourglass_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("record not found: {0}")]
  NotFound(i64),

  #[error("no migration step from schema version {0}")]
  UnknownMigrationStep(u32),

  /// Several rows failed independently.
  #[error(transparent)]
  Aggregate(Aggregate<Error>),
}

impl Error {
  /// Collapse a one-element aggregate into its only error.
  pub(crate) fn from_aggregate(mut errs: Aggregate<Error>) -> Self {
    if errs.len() == 1
      && let Some(only) = errs.0.pop()
    {
      return only;
    }
    Self::Aggregate(errs)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
