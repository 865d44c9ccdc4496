//! Rows — the file's lines as byte buffers.
//!
//! A [`Row`] is one line of the file with its line terminator stripped. A
//! [`RowStore`] holds rows in file order; the index of a row is its 0-based
//! line number.
//!
//! Rows are bytes, not `String`s: the editor shows whatever the file
//! contains, one byte per column, and never fails on invalid UTF-8. The store
//! is append-only. There are no in-place edits.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text, without its trailing `\n` / `\r`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
}

impl Row {
    /// Build a row from a raw line, stripping every trailing `\n` and `\r`.
    ///
    /// Bytes are removed one at a time from the end until the last byte is
    /// neither, so `"a\r\n"`, `"a\n\r"`, and `"a\r\r\n"` all become `"a"`.
    #[must_use]
    pub fn from_line(mut line: Vec<u8>) -> Self {
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        Self { chars: line }
    }

    /// The row's bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The first `width` bytes, or the whole row if it is shorter.
    #[inline]
    #[must_use]
    pub fn truncated(&self, width: usize) -> &[u8] {
        &self.chars[..self.chars.len().min(width)]
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// Ordered, append-only sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Open `path` and append one row per line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be opened and
    /// [`Error::Read`] if reading it fails partway.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let added = self
            .read_lines(BufReader::new(file))
            .map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), rows = added, "loaded file");
        Ok(())
    }

    /// Append one row per line of `reader`. Returns the number of rows added.
    ///
    /// A final line without a terminator still becomes a row; an empty
    /// input adds nothing.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying reader.
    pub fn read_lines(&mut self, mut reader: impl BufRead) -> io::Result<usize> {
        let before = self.rows.len();
        loop {
            let mut line = Vec::new();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            self.append_row(line);
        }
        Ok(self.rows.len() - before)
    }

    /// Append a row at the end. Trailing `\n` / `\r` are stripped.
    pub fn append_row(&mut self, line: impl Into<Vec<u8>>) {
        self.rows.push(Row::from_line(line.into()));
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn row_at(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }
}

impl Index<usize> for RowStore {
    type Output = Row;

    /// # Panics
    ///
    /// Panics if `index >= row_count()`.
    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn store(text: &[u8]) -> RowStore {
        let mut rows = RowStore::new();
        rows.read_lines(text).unwrap();
        rows
    }

    fn lines(rows: &RowStore) -> Vec<&[u8]> {
        (0..rows.row_count()).map(|i| rows[i].as_bytes()).collect()
    }

    // -- Row ----------------------------------------------------------------

    #[test]
    fn row_strips_lf() {
        assert_eq!(Row::from_line(b"abc\n".to_vec()).as_bytes(), b"abc");
    }

    #[test]
    fn row_strips_crlf() {
        assert_eq!(Row::from_line(b"abc\r\n".to_vec()).as_bytes(), b"abc");
    }

    #[test]
    fn row_strips_mixed_trailing_run() {
        assert_eq!(Row::from_line(b"abc\n\r\r\n".to_vec()).as_bytes(), b"abc");
    }

    #[test]
    fn row_keeps_interior_cr() {
        assert_eq!(Row::from_line(b"a\rb\n".to_vec()).as_bytes(), b"a\rb");
    }

    #[test]
    fn row_only_newline_is_empty() {
        let row = Row::from_line(b"\n".to_vec());
        assert!(row.is_empty());
        assert_eq!(row.len(), 0);
    }

    #[test]
    fn row_len_matches_bytes() {
        let row = Row::from_line(b"defgh".to_vec());
        assert_eq!(row.len(), 5);
    }

    #[test]
    fn row_truncated() {
        let row = Row::from_line(vec![b'x'; 200]);
        assert_eq!(row.truncated(80).len(), 80);
        assert_eq!(row.truncated(500).len(), 200);
        assert!(row.truncated(0).is_empty());
    }

    #[test]
    fn row_non_utf8_bytes_survive() {
        let row = Row::from_line(vec![0xFF, 0xFE, b'\n']);
        assert_eq!(row.as_bytes(), &[0xFF, 0xFE]);
    }

    // -- RowStore -----------------------------------------------------------

    #[test]
    fn empty_input_has_no_rows() {
        let rows = store(b"");
        assert!(rows.is_empty());
        assert_eq!(rows.row_count(), 0);
    }

    #[test]
    fn lines_in_file_order() {
        let rows = store(b"abc\ndefgh\n\n");
        assert_eq!(rows.row_count(), 3);
        assert_eq!(lines(&rows), vec![&b"abc"[..], b"defgh", b""]);
    }

    #[test]
    fn final_line_without_newline() {
        let rows = store(b"one\ntwo");
        assert_eq!(lines(&rows), vec![&b"one"[..], b"two"]);
    }

    #[test]
    fn crlf_file() {
        let rows = store(b"one\r\ntwo\r\n");
        assert_eq!(lines(&rows), vec![&b"one"[..], b"two"]);
    }

    #[test]
    fn read_lines_appends() {
        let mut rows = store(b"a\n");
        let added = rows.read_lines(&b"b\nc\n"[..]).unwrap();
        assert_eq!(added, 2);
        assert_eq!(lines(&rows), vec![&b"a"[..], b"b", b"c"]);
    }

    #[test]
    fn row_at_bounds() {
        let rows = store(b"x\ny\n");
        assert_eq!(rows.row_at(1).map(Row::as_bytes), Some(&b"y"[..]));
        assert!(rows.row_at(2).is_none());
    }

    #[test]
    fn index_returns_row() {
        let rows = store(b"x\ny\n");
        assert_eq!(rows[0].as_bytes(), b"x");
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_past_end_panics() {
        let rows = store(b"x\n");
        let _ = &rows[1];
    }

    // -- File loading -------------------------------------------------------

    #[test]
    fn load_file_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc\ndefgh\n\n").unwrap();

        let mut rows = RowStore::new();
        rows.load_file(file.path()).unwrap();
        assert_eq!(lines(&rows), vec![&b"abc"[..], b"defgh", b""]);
    }

    #[test]
    fn load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut rows = RowStore::new();
        rows.load_file(file.path()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn load_missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let mut rows = RowStore::new();
        let err = rows.load_file(&path).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(rows.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn load_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut rows = RowStore::new();
        let err = rows.load_file(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
