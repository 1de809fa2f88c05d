use crate::text_buffer::TextBuffer;

// Model of the status bar line. Rebuilt from the buffer before every frame.
#[derive(Default)]
pub struct StatusBar {
    pub filename: String,
    pub modified: usize,
    pub num_lines: usize,
    // Cursor column and length of the current line
    pub line_pos: (usize, usize),
}

impl StatusBar {
    pub fn from_buffer(buf: &TextBuffer) -> Self {
        let mut bar = StatusBar::default();
        bar.update_from_buf(buf);
        bar
    }

    pub fn update_from_buf(&mut self, buf: &TextBuffer) {
        self.filename = buf.filename().to_string();
        self.modified = buf.modified();
        self.num_lines = buf.rows().len();
        let line_len = buf.rows().get(buf.cy()).map(|r| r.len()).unwrap_or(0);
        self.line_pos = (buf.cx(), line_len);
    }

    pub fn left(&self) -> String {
        let modified = if self.modified > 0 {
            format!("({} modifications)", self.modified)
        } else {
            "".to_string()
        };
        format!("{:<20} - {} lines {}", self.filename, self.num_lines, modified)
    }

    pub fn right(&self) -> String {
        format!("{}/{}", self.line_pos.0, self.line_pos.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_segment_shows_modifications() {
        let mut buf = TextBuffer::with_lines(["hello"].iter().copied());
        let mut bar = StatusBar::from_buffer(&buf);
        assert!(bar.left().contains("[No Name]"));
        assert!(bar.left().contains("1 lines"));
        assert!(!bar.left().contains("modifications"));

        buf.insert_char('x');
        bar.update_from_buf(&buf);
        assert!(bar.left().contains("(1 modifications)"));
    }

    #[test]
    fn test_right_segment_is_column_over_line_length() {
        let mut buf = TextBuffer::with_lines(["hello"].iter().copied());
        buf.set_cursor(3, 0);
        let bar = StatusBar::from_buffer(&buf);
        assert_eq!(bar.right(), "3/5");
    }
}
