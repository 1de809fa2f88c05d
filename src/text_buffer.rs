use crate::error::Result;
use crate::row::Row;
use std::cmp;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::slice;

// Contain both actual path sequence and display string
#[derive(Clone)]
pub struct FilePath {
    pub path: PathBuf,
    pub display: String,
}

impl FilePath {
    fn from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        FilePath {
            path: PathBuf::from(path),
            display: path.to_string_lossy().to_string(),
        }
    }

    fn from_string<S: Into<String>>(s: S) -> Self {
        let display = s.into();
        FilePath {
            path: PathBuf::from(&display),
            display,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum CursorDir {
    Left,
    Right,
    Up,
    Down,
}

pub struct Lines<'a>(slice::Iter<'a, Row>);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.buffer())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.as_slice().len();
        (len, Some(len))
    }
}

pub struct TextBuffer {
    // (x, y) coordinate in internal text buffer of rows. cy may point one past
    // the last row as a sentinel to append at end of file
    cx: usize,
    cy: usize,
    // File editor is opening
    file: Option<FilePath>,
    // Lines of text buffer. Never empty; an empty document is one empty row
    row: Vec<Row>,
    // Count of edits since the buffer was loaded or last saved. 0 means the
    // buffer matches disk
    modified: usize,
}

impl TextBuffer {
    pub fn empty() -> Self {
        Self {
            cx: 0,
            cy: 0,
            file: None,
            row: vec![Row::empty()],
            modified: 0,
        }
    }

    pub fn with_lines<'a, I: Iterator<Item = &'a str>>(lines: I) -> Self {
        let mut row: Vec<_> = lines.map(Row::new).collect();
        if row.is_empty() {
            row.push(Row::empty());
        }
        Self {
            cx: 0,
            cy: 0,
            file: None,
            row,
            modified: 0,
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut row = io::BufReader::new(File::open(path)?)
            .lines()
            .map(|r| Ok(Row::new(r?.trim_end_matches('\r'))))
            .collect::<Result<Vec<_>>>()?;
        if row.is_empty() {
            row.push(Row::empty());
        }

        Ok(Self {
            cx: 0,
            cy: 0,
            file: Some(FilePath::from(path)),
            row,
            modified: 0,
        })
    }

    // Width of the line number gutter: digits of the row count plus one space
    pub fn gutter_width(&self) -> usize {
        let mut digits = 1;
        let mut n = self.row.len();
        while n >= 10 {
            digits += 1;
            n /= 10;
        }
        digits + 1
    }

    // Inserts a character at the cursor. Returns true when the edit hits a
    // snapshot point: a typed space, or every third modification
    pub fn insert_char(&mut self, c: char) -> bool {
        if self.cy == self.row.len() {
            self.row.push(Row::empty());
        }
        self.row[self.cy].insert_char(self.cx, c);
        self.cx += 1;
        self.modified += 1;
        c == ' ' || self.modified % 3 == 0
    }

    pub fn insert_line(&mut self) {
        if self.cy >= self.row.len() {
            self.row.push(Row::empty());
        } else if self.cx == 0 {
            // Insert an empty row above the content
            self.row.insert(self.cy, Row::empty());
        } else {
            // The suffix after the cursor becomes a new row right below
            let rest = self.row[self.cy].split_off(self.cx);
            self.row.insert(self.cy + 1, Row::new(rest));
        }
        self.cy += 1;
        self.cx = 0;
        self.modified += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cy == self.row.len() || self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.row[self.cy].delete_char(self.cx - 1);
            self.cx -= 1;
        } else {
            // At top of line, backspace joins current line onto previous line
            let removed = self.row.remove(self.cy);
            self.cy -= 1;
            self.cx = self.row[self.cy].len();
            self.row[self.cy].append(removed.buffer());
        }
        self.modified += 1;
    }

    pub fn delete_right_char(&mut self) {
        self.move_cursor_one(CursorDir::Right);
        self.delete_char();
    }

    pub fn move_cursor_one(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Up => self.cy = self.cy.saturating_sub(1),
            CursorDir::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // When moving to left at top of line, move cursor to end of previous line
                    self.cy -= 1;
                    self.cx = self.row[self.cy].len();
                }
            }
            CursorDir::Down => {
                // Allow to move cursor until next line to the last line of file to enable to
                // add a new line at the end
                if self.cy < self.row.len() {
                    self.cy += 1;
                }
            }
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    let len = self.row[self.cy].len();
                    if self.cx < len {
                        self.cx += 1;
                    } else {
                        // When moving to right at the end of line, move cursor to top of next line
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
        };

        // Snap cursor to end of line when moving up/down from longer line
        let len = self.row.get(self.cy).map(Row::len).unwrap_or(0);
        if self.cx > len {
            self.cx = len;
        }
    }

    pub fn move_cursor_page(&mut self, dir: CursorDir, rowoff: usize, num_rows: usize) {
        self.cy = match dir {
            CursorDir::Up => rowoff, // Top of screen
            CursorDir::Down => {
                cmp::min(rowoff + num_rows - 1, self.row.len()) // Bottom of screen
            }
            _ => unreachable!(),
        };
        for _ in 0..num_rows {
            self.move_cursor_one(dir);
        }
    }

    pub fn move_cursor_to_line_edge(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Left => self.cx = 0,
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    self.cx = self.row[self.cy].len();
                }
            }
            _ => unreachable!(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.row
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn file(&self) -> Option<&FilePath> {
        self.file.as_ref()
    }

    pub fn filename(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.display.as_str())
            .unwrap_or("[No Name]")
    }

    pub fn modified(&self) -> usize {
        self.modified
    }

    pub fn matches_disk(&self) -> bool {
        self.modified == 0
    }

    pub fn cx(&self) -> usize {
        self.cx
    }

    pub fn cy(&self) -> usize {
        self.cy
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cx = x;
        self.cy = y;
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines(self.row.iter())
    }

    pub fn set_file<S: Into<String>>(&mut self, file_path: S) {
        self.file = Some(FilePath::from_string(file_path));
    }

    pub fn set_unnamed(&mut self) {
        self.file = None;
    }

    // Restores a deep-copied state from history as the live state
    pub fn restore(
        &mut self,
        rows: Vec<Row>,
        cursor: (usize, usize),
        modified: usize,
        file: Option<FilePath>,
    ) {
        self.row = rows;
        self.cx = cursor.0;
        self.cy = cursor.1;
        self.modified = modified;
        self.file = file;
    }

    // Serializes all rows newline-joined and rewrites the file truncated to the
    // new exact length. A write failure leaves the buffer state unchanged
    pub fn save(&mut self) -> std::result::Result<String, String> {
        let file = if let Some(file) = &self.file {
            file
        } else {
            return Ok("".to_string()); // Canceled
        };

        let f = match File::create(&file.path) {
            Ok(f) => f,
            Err(e) => return Err(format!("Can't save! I/O error: {}", e)),
        };
        let mut f = BufWriter::new(f);
        let mut bytes = 0;
        for line in self.row.iter() {
            let b = line.buffer();
            writeln!(f, "{}", b).map_err(|e| format!("Can't save! I/O error: {}", e))?;
            bytes += b.as_bytes().len() + 1;
        }
        f.flush()
            .map_err(|e| format!("Can't save! I/O error: {}", e))?;

        self.modified = 0;
        Ok(format!("{} bytes written to {}", bytes, &file.display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_document_is_one_empty_row() {
        let buf = TextBuffer::empty();
        assert_eq!(buf.rows().len(), 1);
        assert!(buf.rows()[0].is_empty());
        assert!(buf.matches_disk());
    }

    #[test]
    fn test_insert_chars() {
        let mut buf = TextBuffer::empty();
        buf.insert_char('h');
        buf.insert_char('i');
        assert_eq!(buf.rows()[0].buffer(), "hi");
        assert_eq!(buf.cursor(), (2, 0));
        assert_eq!(buf.modified(), 2);
    }

    #[test]
    fn test_snapshot_point_on_space_and_every_third_edit() {
        let mut buf = TextBuffer::empty();
        assert!(!buf.insert_char('a')); // 1 modification
        assert!(!buf.insert_char('b')); // 2
        assert!(buf.insert_char(' ')); // Space rule
        assert!(!buf.insert_char('c')); // 4
        assert!(!buf.insert_char('d')); // 5
        assert!(buf.insert_char('e')); // 6, multiple of 3
    }

    #[test]
    fn test_backspace_join() {
        let mut buf = TextBuffer::with_lines(["hello", "world"].iter().copied());
        buf.set_cursor(0, 1);
        buf.delete_char();
        let lines: Vec<_> = buf.lines().collect();
        assert_eq!(lines, vec!["helloworld"]);
        assert_eq!(buf.cursor(), (5, 0));
        assert_eq!(buf.gutter_width(), 2);
    }

    #[test]
    fn test_backspace_join_then_enter_restores_split() {
        let mut buf = TextBuffer::with_lines(["foo", "barbaz"].iter().copied());
        buf.set_cursor(0, 1);
        buf.delete_char();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["foobarbaz"]);
        buf.insert_line();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["foo", "barbaz"]);
        assert_eq!(buf.cursor(), (0, 1));
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut buf = TextBuffer::with_lines(["abc"].iter().copied());
        buf.delete_char();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["abc"]);
        assert_eq!(buf.modified(), 0);
    }

    #[test]
    fn test_enter_at_line_start_inserts_row_above() {
        let mut buf = TextBuffer::with_lines(["abc"].iter().copied());
        buf.insert_line();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["", "abc"]);
        assert_eq!(buf.cursor(), (0, 1));
    }

    #[test]
    fn test_enter_mid_line_splits_row() {
        let mut buf = TextBuffer::with_lines(["abcdef"].iter().copied());
        buf.set_cursor(3, 0);
        buf.insert_line();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["abc", "def"]);
        assert_eq!(buf.cursor(), (0, 1));
    }

    #[test]
    fn test_delete_right_char() {
        let mut buf = TextBuffer::with_lines(["abc"].iter().copied());
        buf.delete_right_char();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["bc"]);
        assert_eq!(buf.cursor(), (0, 0));
    }

    #[test]
    fn test_insert_at_sentinel_row_appends() {
        let mut buf = TextBuffer::with_lines(["a"].iter().copied());
        buf.move_cursor_one(CursorDir::Down);
        assert_eq!(buf.cy(), 1);
        buf.insert_char('b');
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_cursor_snaps_to_shorter_line() {
        let mut buf = TextBuffer::with_lines(["longer line", "ab"].iter().copied());
        buf.set_cursor(10, 0);
        buf.move_cursor_one(CursorDir::Down);
        assert_eq!(buf.cursor(), (2, 1));
    }

    #[test]
    fn test_gutter_width_tracks_row_count() {
        let mut buf = TextBuffer::with_lines(["x"; 9].iter().copied());
        assert_eq!(buf.gutter_width(), 2);
        buf.set_cursor(1, 8);
        buf.insert_line();
        assert_eq!(buf.gutter_width(), 3); // 10 rows now
    }

    #[test]
    fn test_open_strips_cr_lf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "one\r\ntwo\nthree").unwrap();
        file.flush().unwrap();

        let buf = TextBuffer::open(file.path()).unwrap();
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["one", "two", "three"]);
        assert!(buf.matches_disk());
    }

    #[test]
    fn test_open_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let buf = TextBuffer::open(file.path()).unwrap();
        assert_eq!(buf.rows().len(), 1);
        assert!(buf.rows()[0].is_empty());
    }

    #[test]
    fn test_open_missing_file_is_error() {
        assert!(TextBuffer::open("/no/such/file/anywhere").is_err());
    }

    #[test]
    fn test_save_resets_modification_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut buf = TextBuffer::empty();
        buf.set_file(path.to_string_lossy().to_string());
        buf.insert_char('h');
        buf.insert_char('i');
        assert_eq!(buf.modified(), 2);

        let msg = buf.save().unwrap();
        assert!(msg.contains("3 bytes written"), "{}", msg);
        assert!(buf.matches_disk());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");
    }

    #[test]
    fn test_save_truncates_to_exact_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "something much longer than the new content\n").unwrap();

        let mut buf = TextBuffer::open(&path).unwrap();
        buf.restore(vec![Row::new("short")], (0, 0), 1, buf.file().cloned());
        buf.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
    }

    #[test]
    fn test_save_failure_keeps_buffer_state() {
        let mut buf = TextBuffer::empty();
        buf.set_file("/no/such/dir/out.txt");
        buf.insert_char('x');
        assert!(buf.save().is_err());
        assert_eq!(buf.modified(), 1);
        assert_eq!(buf.lines().collect::<Vec<_>>(), vec!["x"]);
    }
}
