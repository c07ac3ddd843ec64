//! Error types for `hourglass-core`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid timestamp {value:?}: {reason}")]
  InvalidTimestamp { value: String, reason: String },

  #[error("invalid date {0:?}")]
  InvalidDate(String),

  #[error("invalid field name {0:?}")]
  UnknownField(String),

  #[error("{0} is required")]
  MissingValue(&'static str),

  #[error("invalid tag {0:?}")]
  InvalidTag(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Every failure collected while processing a batch of rows.
///
/// Backends use this when a single logical operation can fail per record
/// (e.g. decoding a result set) and the caller should see all of the
/// messages rather than only the first one.
#[derive(Debug)]
pub struct Aggregate<E>(pub Vec<E>);

impl<E> Aggregate<E> {
  pub fn new() -> Self { Self(Vec::new()) }

  pub fn push(&mut self, err: E) { self.0.push(err); }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  /// `Ok(value)` when nothing was collected, `Err(self)` otherwise.
  pub fn into_result<T>(self, value: T) -> Result<T, Self> {
    if self.is_empty() { Ok(value) } else { Err(self) }
  }
}

impl<E> Default for Aggregate<E> {
  fn default() -> Self { Self::new() }
}

impl<E: fmt::Display> fmt::Display for Aggregate<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, err) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{err}")?;
    }
    Ok(())
  }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Aggregate<E> {}
