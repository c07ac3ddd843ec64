//! Textual timestamp encoding shared by both storage backends.
//!
//! Timestamps are written as RFC 3339 in UTC with nanosecond precision, so
//! every encoded value has the same width and sorts lexicographically in
//! chronological order. Decoding accepts any RFC 3339 offset and yields local
//! time.
//!
//! Only years 0000 through 9999 are encodable; outside that range the year
//! would gain a sign and the encoding would no longer parse back.
//!
//! A running activity has no end. On disk that is spelled as the zero
//! timestamp [`ZERO`], which decodes back to `None`.

use chrono::{DateTime, Datelike, Local, Utc};

use crate::{Error, Result};

/// The encoded "unset" timestamp.
pub const ZERO: &str = "0001-01-01T00:00:00.000000000Z";

/// Unix seconds of `0001-01-01T00:00:00Z`.
const ZERO_UNIX_SECONDS: i64 = -62_135_596_800;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

pub fn encode(dt: &DateTime<Local>) -> Result<String> {
  let utc = dt.with_timezone(&Utc);
  if !(0..=9999).contains(&utc.year()) {
    return Err(Error::InvalidTimestamp {
      value:  utc.to_rfc3339(),
      reason: "year is outside 0000-9999".into(),
    });
  }
  Ok(utc.format(FORMAT).to_string())
}

pub fn encode_end(end: Option<&DateTime<Local>>) -> Result<String> {
  end.map_or_else(|| Ok(ZERO.to_owned()), encode)
}

pub fn decode(s: &str) -> Result<DateTime<Local>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Local))
    .map_err(|e| Error::InvalidTimestamp {
      value:  s.to_owned(),
      reason: e.to_string(),
    })
}

/// Decode an end column, mapping the zero timestamp to `None`.
pub fn decode_end(s: &str) -> Result<Option<DateTime<Local>>> {
  if s == ZERO {
    return Ok(None);
  }
  let parsed = DateTime::parse_from_rfc3339(s).map_err(|e| {
    Error::InvalidTimestamp { value: s.to_owned(), reason: e.to_string() }
  })?;
  if parsed.timestamp() == ZERO_UNIX_SECONDS
    && parsed.timestamp_subsec_nanos() == 0
  {
    return Ok(None);
  }
  Ok(Some(parsed.with_timezone(&Local)))
}

#[cfg(test)]
mod tests {
  use chrono::{FixedOffset, TimeZone};

  use super::*;

  #[test]
  fn encoding_is_fixed_width_utc() {
    let dt = FixedOffset::east_opt(2 * 3600)
      .unwrap()
      .with_ymd_and_hms(2024, 3, 9, 10, 15, 0)
      .unwrap()
      .with_timezone(&Local);

    let encoded = encode(&dt).unwrap();
    assert_eq!(encoded, "2024-03-09T08:15:00.000000000Z");
    assert_eq!(encoded.len(), ZERO.len());
  }

  #[test]
  fn decode_preserves_instant() {
    let dt = Local::now();
    assert_eq!(decode(&encode(&dt).unwrap()).unwrap(), dt);
  }

  #[test]
  fn decode_accepts_offsets() {
    let decoded = decode("2024-03-09T10:15:00+02:00").unwrap();
    assert_eq!(encode(&decoded).unwrap(), "2024-03-09T08:15:00.000000000Z");
  }

  #[test]
  fn zero_end_is_none() {
    assert_eq!(encode_end(None).unwrap(), ZERO);
    assert_eq!(decode_end(ZERO).unwrap(), None);
    assert_eq!(decode_end("0001-01-01T00:00:00Z").unwrap(), None);
  }

  #[test]
  fn years_past_9999_are_not_encodable() {
    let far = Utc
      .with_ymd_and_hms(10000, 1, 1, 0, 0, 0)
      .unwrap()
      .with_timezone(&Local);
    assert!(matches!(encode(&far), Err(Error::InvalidTimestamp { .. })));
    assert!(matches!(
      encode_end(Some(&far)),
      Err(Error::InvalidTimestamp { .. })
    ));

    let last = Utc
      .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
      .unwrap()
      .with_timezone(&Local);
    let encoded = encode(&last).unwrap();
    assert_eq!(encoded.len(), ZERO.len());
    assert_eq!(decode(&encoded).unwrap(), last);
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(matches!(
      decode("last tuesday"),
      Err(Error::InvalidTimestamp { .. })
    ));
    assert!(decode_end("").is_err());
  }
}
