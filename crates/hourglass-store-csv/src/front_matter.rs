//! The fixed-width first line of a CSV store.
//!
//! ```text
//! # version: 001, last-id: 0000000000000000042\n
//! ```
//!
//! Every front matter encodes to exactly [`FrontMatter::LEN`] bytes, so it can
//! be overwritten at offset 0 without touching the records after it.

use crate::{Error, Result};

const VERSION_PREFIX: &str = "# version: ";
const LAST_ID_PREFIX: &str = ", last-id: ";
const VERSION_DIGITS: usize = 3;
const LAST_ID_DIGITS: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrontMatter {
  pub version: u32,
  pub last_id: i64,
}

impl FrontMatter {
  /// Encoded length in bytes, newline included.
  pub const LEN: usize = VERSION_PREFIX.len()
    + VERSION_DIGITS
    + LAST_ID_PREFIX.len()
    + LAST_ID_DIGITS
    + 1;

  pub fn encode(&self) -> String {
    format!(
      "{VERSION_PREFIX}{:0vw$}{LAST_ID_PREFIX}{:0iw$}\n",
      self.version,
      self.last_id,
      vw = VERSION_DIGITS,
      iw = LAST_ID_DIGITS,
    )
  }

  /// Parse the first [`LEN`](Self::LEN) bytes of a store file.
  ///
  /// An empty file has no front matter yet and yields `None`.
  pub fn parse(bytes: &[u8]) -> Result<Option<Self>> {
    if bytes.is_empty() {
      return Ok(None);
    }
    let invalid = || {
      Error::InvalidFrontMatter(
        String::from_utf8_lossy(&bytes[..bytes.len().min(Self::LEN)]).into_owned(),
      )
    };

    if bytes.len() < Self::LEN {
      return Err(invalid());
    }
    let line = std::str::from_utf8(&bytes[..Self::LEN]).map_err(|_| invalid())?;

    let rest = line.strip_prefix(VERSION_PREFIX).ok_or_else(invalid)?;
    let (version, rest) = take_digits(rest, VERSION_DIGITS).ok_or_else(invalid)?;
    let rest = rest.strip_prefix(LAST_ID_PREFIX).ok_or_else(invalid)?;
    let (last_id, rest) = take_digits(rest, LAST_ID_DIGITS).ok_or_else(invalid)?;
    if rest != "\n" {
      return Err(invalid());
    }

    Ok(Some(Self {
      version: version.parse().map_err(|_| invalid())?,
      last_id: last_id.parse().map_err(|_| invalid())?,
    }))
  }
}

/// Split off exactly `n` leading ASCII digits.
fn take_digits(s: &str, n: usize) -> Option<(&str, &str)> {
  let digits = s.get(..n)?;
  digits
    .bytes()
    .all(|b| b.is_ascii_digit())
    .then(|| (digits, &s[n..]))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_length_is_constant() {
    assert_eq!(FrontMatter::LEN, 45);
    for fm in [
      FrontMatter { version: 0, last_id: 0 },
      FrontMatter { version: 1, last_id: 42 },
      FrontMatter { version: 999, last_id: i64::MAX },
    ] {
      assert_eq!(fm.encode().len(), FrontMatter::LEN);
    }
  }

  #[test]
  fn encode_layout() {
    let fm = FrontMatter { version: 1, last_id: 1 };
    assert_eq!(fm.encode(), "# version: 001, last-id: 0000000000000000001\n");
  }

  #[test]
  fn parse_reads_encoded() {
    let fm = FrontMatter { version: 1, last_id: 1234 };
    let mut bytes = fm.encode().into_bytes();
    bytes.extend_from_slice(b"id,name,project,tags,start,end\n");
    assert_eq!(FrontMatter::parse(&bytes).unwrap(), Some(fm));
  }

  #[test]
  fn empty_file_has_none() {
    assert_eq!(FrontMatter::parse(b"").unwrap(), None);
  }

  #[test]
  fn malformed_lines_are_rejected() {
    for bad in [
      "# version: 1, last-id: 0000000000000000001\n",
      "# version: 001, last-id: 000000000000000001x\n",
      "# version: 001; last-id: 0000000000000000001\n",
      "# version: 001, last-id: 0000000000000000001",
      "id,name,project,tags,start,end\n",
    ] {
      assert!(
        matches!(FrontMatter::parse(bad.as_bytes()), Err(Error::InvalidFrontMatter(_))),
        "accepted {bad:?}"
      );
    }
  }
}
