//! Error type for `hourglass-store-csv`.

use hourglass_core::Aggregate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hourglass_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("record not found: {0}")]
  NotFound(i64),

  /// The first line of the file is not a valid front matter. The store is
  /// unusable until the file is repaired.
  #[error("invalid front matter: {0}")]
  InvalidFrontMatter(String),

  #[error("invalid record at byte {offset}: {reason}")]
  InvalidRecord { offset: u64, reason: String },

  #[error("store version {0} is newer than this build supports")]
  UnsupportedVersion(u32),

  #[error("store has not been migrated")]
  NotMigrated,

  #[error("no migration step from version {0}")]
  UnknownMigrationStep(u32),

  /// Several records failed independently.
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
