//! Byte-range replacement inside an open file.
//!
//! [`splice`] replaces `old_len` bytes at `offset` with `replacement`, which
//! may be shorter, longer or empty. When the lengths match the bytes are
//! overwritten in place. Otherwise everything after the old range is read into
//! memory, the replacement and that tail are written back starting at
//! `offset`, and the file is truncated to its new length.
//!
//! The relocating path is three separate writes and is **not** crash-atomic:
//! a crash between them can leave the tail duplicated or cut short. Callers
//! that need durability across crashes must not rely on it.

use std::{
  fs::File,
  io::{self, Read, Seek, SeekFrom, Write},
};

use tracing::trace;

pub fn splice(
  file: &mut File,
  offset: u64,
  old_len: u64,
  replacement: &[u8],
) -> io::Result<()> {
  let new_len = replacement.len() as u64;

  if new_len == old_len {
    trace!(offset, len = new_len, "overwrite in place");
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(replacement)?;
    return file.flush();
  }

  let mut tail = Vec::new();
  file.seek(SeekFrom::Start(offset + old_len))?;
  file.read_to_end(&mut tail)?;
  trace!(offset, old_len, new_len, tail = tail.len(), "relocate tail");

  file.seek(SeekFrom::Start(offset))?;
  file.write_all(replacement)?;
  file.write_all(&tail)?;
  file.set_len(offset + new_len + tail.len() as u64)?;
  file.flush()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn file_with(content: &str) -> File {
    let mut f = tempfile::tempfile().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
  }

  fn contents(f: &mut File) -> String {
    let mut s = String::new();
    f.seek(SeekFrom::Start(0)).unwrap();
    f.read_to_string(&mut s).unwrap();
    s
  }

  #[test]
  fn same_length_overwrites() {
    let mut f = file_with("aaa\nbbb\nccc\n");
    splice(&mut f, 4, 4, b"BBB\n").unwrap();
    assert_eq!(contents(&mut f), "aaa\nBBB\nccc\n");
  }

  #[test]
  fn longer_replacement_shifts_tail() {
    let mut f = file_with("aaa\nbbb\nccc\n");
    splice(&mut f, 4, 4, b"bbbbbb\n").unwrap();
    assert_eq!(contents(&mut f), "aaa\nbbbbbb\nccc\n");
  }

  #[test]
  fn shorter_replacement_truncates() {
    let mut f = file_with("aaa\nbbbbbb\nccc\n");
    splice(&mut f, 4, 7, b"b\n").unwrap();
    assert_eq!(contents(&mut f), "aaa\nb\nccc\n");
  }

  #[test]
  fn empty_replacement_deletes_range() {
    let mut f = file_with("aaa\nbbb\nccc\n");
    splice(&mut f, 4, 4, b"").unwrap();
    assert_eq!(contents(&mut f), "aaa\nccc\n");
  }

  #[test]
  fn last_range_has_empty_tail() {
    let mut f = file_with("aaa\nbbb\n");
    splice(&mut f, 4, 4, b"").unwrap();
    assert_eq!(contents(&mut f), "aaa\n");

    splice(&mut f, 0, 4, b"first\n").unwrap();
    assert_eq!(contents(&mut f), "first\n");
  }
}
