//! CSV record encoding and the record scanner.
//!
//! Fields follow RFC 4180: a field containing a comma, a double quote, CR or
//! LF is wrapped in double quotes and embedded quotes are doubled. A record
//! may therefore span several physical lines; [`RecordScanner`] reassembles
//! them and reports the byte span of each record.

use std::io::{self, BufRead};

use hourglass_core::{Activity, tags, timestamp};

use crate::{Error, Result};

/// Column names, in field order.
pub const COLUMNS: [&str; 6] = ["id", "name", "project", "tags", "start", "end"];

/// The header record written right after the front matter.
pub fn header() -> String { encode_fields(&COLUMNS) }

// ─── Encoding ────────────────────────────────────────────────────────────────

fn needs_quotes(field: &str) -> bool {
  field.contains([',', '"', '\r', '\n'])
}

fn push_field(out: &mut String, field: &str) {
  if needs_quotes(field) {
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
  } else {
    out.push_str(field);
  }
}

/// One record, newline-terminated.
pub fn encode_fields<S: AsRef<str>>(fields: &[S]) -> String {
  let mut out = String::new();
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    push_field(&mut out, field.as_ref());
  }
  out.push('\n');
  out
}

pub fn encode_activity(a: &Activity) -> Result<String> {
  Ok(encode_fields(&[
    a.id.to_string(),
    a.name.clone(),
    a.project.clone(),
    tags::encode(&a.tags),
    timestamp::encode(&a.start)?,
    timestamp::encode_end(a.end.as_ref())?,
  ]))
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Split one record (trailing newline optional) into its fields.
pub fn split_fields(record: &str) -> Result<Vec<String>, &'static str> {
  let record = record.strip_suffix('\n').unwrap_or(record);
  let record = record.strip_suffix('\r').unwrap_or(record);

  let mut fields = Vec::new();
  let mut field = String::new();
  let mut chars = record.chars().peekable();
  let mut in_quotes = false;
  // The current field was quoted and its closing quote has been seen.
  let mut closed = false;

  while let Some(c) = chars.next() {
    if in_quotes {
      if c == '"' {
        if chars.peek() == Some(&'"') {
          chars.next();
          field.push('"');
        } else {
          in_quotes = false;
          closed = true;
        }
      } else {
        field.push(c);
      }
      continue;
    }

    match c {
      ',' => {
        fields.push(std::mem::take(&mut field));
        closed = false;
      }
      _ if closed => return Err("data after closing quote"),
      '"' if field.is_empty() => in_quotes = true,
      '"' => return Err("quote inside unquoted field"),
      _ => field.push(c),
    }
  }

  if in_quotes {
    return Err("unterminated quoted field");
  }
  fields.push(field);
  Ok(fields)
}

/// A record exactly as it sits in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
  /// Byte offset of the first byte of the record.
  pub offset: u64,
  /// The record's bytes, trailing newline included.
  pub bytes:  Vec<u8>,
}

impl RawRecord {
  pub fn len(&self) -> u64 { self.bytes.len() as u64 }

  fn invalid(&self, reason: impl Into<String>) -> Error {
    Error::InvalidRecord { offset: self.offset, reason: reason.into() }
  }

  pub fn fields(&self) -> Result<Vec<String>> {
    let text = std::str::from_utf8(&self.bytes)
      .map_err(|_| self.invalid("not valid UTF-8"))?;
    let fields = split_fields(text).map_err(|reason| self.invalid(reason))?;
    if fields.len() != COLUMNS.len() {
      return Err(self.invalid(format!(
        "expected {} fields, found {}",
        COLUMNS.len(),
        fields.len()
      )));
    }
    Ok(fields)
  }

  /// The leading id field, without decoding the rest.
  pub fn id(&self) -> Result<i64> {
    let end = self
      .bytes
      .iter()
      .position(|&b| b == b',')
      .ok_or_else(|| self.invalid("missing id field"))?;
    std::str::from_utf8(&self.bytes[..end])
      .ok()
      .and_then(|s| s.parse().ok())
      .ok_or_else(|| self.invalid("id is not an integer"))
  }

  pub fn decode(&self) -> Result<Activity> {
    let mut fields = self.fields()?.into_iter();
    // `fields()` guarantees exactly six.
    let mut next = || fields.next().unwrap_or_default();

    let id = next()
      .parse()
      .map_err(|_| self.invalid("id is not an integer"))?;
    let name = next();
    let project = next();
    let tag_list = next();
    let start = timestamp::decode(&next())?;
    let end = timestamp::decode_end(&next())?;

    Ok(Activity { id, name, project, tags: tags::decode(&tag_list), start, end })
  }
}

// ─── Scanner ─────────────────────────────────────────────────────────────────

/// Iterates the records of a reader positioned at `offset`.
///
/// A physical line ends a record only when the record holds an even number
/// of double quotes; otherwise the newline is inside a quoted field.
pub struct RecordScanner<R> {
  reader: R,
  offset: u64,
}

impl<R: BufRead> RecordScanner<R> {
  pub fn new(reader: R, offset: u64) -> Self { Self { reader, offset } }

  fn read_record(&mut self) -> io::Result<Option<RawRecord>> {
    let mut bytes = Vec::new();
    let mut quotes = 0usize;
    loop {
      let start = bytes.len();
      if self.reader.read_until(b'\n', &mut bytes)? == 0 {
        break;
      }
      quotes += bytes[start..].iter().filter(|&&b| b == b'"').count();
      if quotes % 2 == 0 {
        break;
      }
    }

    if bytes.is_empty() {
      return Ok(None);
    }
    let record = RawRecord { offset: self.offset, bytes };
    self.offset += record.len();
    Ok(Some(record))
  }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
  type Item = io::Result<RawRecord>;

  fn next(&mut self) -> Option<Self::Item> { self.read_record().transpose() }
}
