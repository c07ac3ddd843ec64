//! The single-string tag list stored by both backends.
//!
//! Tags are joined with `", "`. Decoding splits on commas, trims and drops
//! empty pieces, so an empty string is an empty list and never `[""]`.

use crate::{Error, Result};

pub const SEPARATOR: &str = ", ";

pub fn encode(tags: &[String]) -> String { tags.join(SEPARATOR) }

pub fn decode(s: &str) -> Vec<String> {
  s.split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

/// A tag survives the round trip through [`encode`]/[`decode`] only if it is
/// non-empty, has no comma and no surrounding whitespace.
pub fn validate(tag: &str) -> Result<()> {
  if tag.is_empty() || tag.contains(',') || tag.trim() != tag {
    return Err(Error::InvalidTag(tag.to_owned()));
  }
  Ok(())
}
