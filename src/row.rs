pub const TAB_STOP: usize = 8;

fn byte_index_at<S: AsRef<str>>(at: usize, s: S) -> Option<usize> {
    s.as_ref().char_indices().nth(at).map(|c| c.0)
}

// One line of text. `render` is the tab-expanded form derived from `buf` and is
// recomputed immediately after every mutation so it is never read stale.
#[derive(Default, Clone)]
pub struct Row {
    buf: String,
    render: String,
    len: usize,
}

impl Row {
    pub fn new<S: Into<String>>(line: S) -> Row {
        let mut row = Row {
            buf: line.into(),
            render: "".to_string(),
            len: 0,
        };
        row.update_render();
        row
    }

    pub fn empty() -> Row {
        Row::default()
    }

    pub fn buffer(&self) -> &str {
        self.buf.as_str()
    }

    pub fn render_text(&self) -> &str {
        self.render.as_str()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn update_render(&mut self) {
        let tabs = self.buf.matches('\t').count();
        self.render = String::with_capacity(self.buf.len() + tabs * (TAB_STOP - 1));
        self.len = 0;
        let mut idx = 0;
        for c in self.buf.chars() {
            if c == '\t' {
                // Expand to spaces up to the next multiple of TAB_STOP
                loop {
                    self.render.push(' ');
                    idx += 1;
                    if idx % TAB_STOP == 0 {
                        break;
                    }
                }
            } else {
                self.render.push(c);
                idx += 1;
            }
            self.len += 1;
        }
    }

    pub fn rx_from_cx(&self, cx: usize) -> usize {
        self.buf.chars().take(cx).fold(0, |rx, ch| {
            if ch == '\t' {
                // Proceed TAB_STOP columns then subtract columns by mod TAB_STOP
                rx + TAB_STOP - (rx % TAB_STOP)
            } else {
                rx + 1
            }
        })
    }

    pub fn cx_from_rx(&self, rx: usize) -> usize {
        let mut current_rx = 0;
        for (cx, ch) in self.buf.chars().enumerate() {
            if ch == '\t' {
                current_rx += TAB_STOP - (current_rx % TAB_STOP);
            } else {
                current_rx += 1;
            }
            if current_rx > rx {
                return cx; // First column whose cumulative render position exceeds rx
            }
        }
        self.len // Fall back to end of line
    }

    // Note: 'at' is an index of buffer, not render text
    pub fn insert_char(&mut self, at: usize, c: char) {
        if self.len <= at {
            self.buf.push(c);
        } else {
            let idx = byte_index_at(at, &self.buf).unwrap_or(0);
            self.buf.insert(idx, c);
        }
        self.update_render();
    }

    pub fn delete_char(&mut self, at: usize) {
        if at < self.len {
            let idx = byte_index_at(at, &self.buf).unwrap_or(0);
            self.buf.remove(idx);
            self.update_render();
        }
    }

    pub fn append<S: AsRef<str>>(&mut self, s: S) {
        let s = s.as_ref();
        if s.is_empty() {
            return;
        }
        self.buf.push_str(s);
        self.update_render();
    }

    // Splits the row at 'at' returning the suffix text. Used on Enter in the
    // middle of a line.
    pub fn split_off(&mut self, at: usize) -> String {
        let idx = byte_index_at(at, &self.buf).unwrap_or_else(|| self.buf.len());
        let rest = self.buf.split_off(idx);
        self.update_render();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_expands_tabs() {
        let row = Row::new("\thello");
        assert_eq!(row.render_text(), "        hello");
        let row = Row::new("ab\tc");
        assert_eq!(row.render_text(), "ab      c");
        let row = Row::new("1234567\tx");
        assert_eq!(row.render_text(), "1234567 x");
    }

    #[test]
    fn test_render_derivation_is_idempotent() {
        let mut row = Row::new("a\tb\tc");
        let first = row.render_text().to_string();
        row.update_render();
        assert_eq!(row.render_text(), first);
    }

    #[test]
    fn test_rx_from_cx() {
        let row = Row::new("ab\tcd");
        assert_eq!(row.rx_from_cx(0), 0);
        assert_eq!(row.rx_from_cx(1), 1);
        assert_eq!(row.rx_from_cx(2), 2);
        assert_eq!(row.rx_from_cx(3), 8); // Tab jumps to next tab stop
        assert_eq!(row.rx_from_cx(4), 9);
        assert_eq!(row.rx_from_cx(5), 10);
    }

    #[test]
    fn test_cx_rx_round_trip() {
        let row = Row::new("ab\tcd");
        // Columns outside the tab's expansion span round-trip exactly
        for cx in &[0usize, 1, 2, 3, 4] {
            assert_eq!(row.cx_from_rx(row.rx_from_cx(*cx)), *cx, "cx={}", cx);
        }
        // Columns inside the tab's span normalize to the tab's column
        for rx in 2..8 {
            assert_eq!(row.cx_from_rx(rx), 2, "rx={}", rx);
        }
    }

    #[test]
    fn test_cx_from_rx_past_end() {
        let row = Row::new("abc");
        assert_eq!(row.cx_from_rx(100), 3);
    }

    #[test]
    fn test_insert_then_delete_restores_row() {
        let mut row = Row::new("hello");
        let buf = row.buffer().to_string();
        let render = row.render_text().to_string();
        row.insert_char(2, 'x');
        assert_eq!(row.buffer(), "hexllo");
        row.delete_char(2);
        assert_eq!(row.buffer(), buf);
        assert_eq!(row.render_text(), render);
    }

    #[test]
    fn test_split_off_and_append() {
        let mut row = Row::new("foobar");
        let rest = row.split_off(3);
        assert_eq!(row.buffer(), "foo");
        assert_eq!(rest, "bar");
        row.append(&rest);
        assert_eq!(row.buffer(), "foobar");
        assert_eq!(row.render_text(), "foobar");
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut row = Row::new("ab");
        row.insert_char(10, 'c');
        assert_eq!(row.buffer(), "abc");
    }
}
