use crate::input::{InputSeq, KeySeq};
use crate::screen::Screen;
use crate::text_buffer::TextBuffer;
use std::io::Write;

#[derive(PartialEq, Debug)]
pub enum PromptResult {
    Pending,
    Canceled,
    Committed,
}

// Incremental search session. Lives only while the search prompt is active
pub struct SearchState {
    last_match: Option<usize>,
    forward: bool,
    pub saved_cursor: (usize, usize),
    pub saved_scroll: (usize, usize),
}

impl SearchState {
    pub fn matched(&self) -> bool {
        self.last_match.is_some()
    }

    fn on_key<W: Write>(
        &mut self,
        query: &str,
        seq: &InputSeq,
        buf: &mut TextBuffer,
        screen: &mut Screen<W>,
    ) {
        use KeySeq::*;
        match seq.key {
            RightKey | DownKey => self.forward = true,
            LeftKey | UpKey => self.forward = false,
            _ => {
                // Any other key may have changed the query, restart the cycle
                self.last_match = None;
                self.forward = true;
            }
        }

        if query.is_empty() {
            return;
        }
        self.scan(query, buf, screen);
    }

    // Scans rows from last_match + direction with wraparound for the first row
    // whose render text contains the query
    fn scan<W: Write>(&mut self, query: &str, buf: &mut TextBuffer, screen: &mut Screen<W>) {
        let num_rows = buf.rows().len() as isize;
        let dir: isize = if self.forward { 1 } else { -1 };
        let mut current = self.last_match.map(|y| y as isize).unwrap_or(-1);

        for _ in 0..num_rows {
            current += dir;
            if current < 0 {
                current = num_rows - 1;
            } else if current >= num_rows {
                current = 0;
            }

            let y = current as usize;
            if let Some(rx) = buf.rows()[y].render_text().find(query) {
                self.last_match = Some(y);
                let cx = buf.rows()[y].cx_from_rx(rx);
                buf.set_cursor(cx, y);
                // Scroll so the matched line lands around the middle of screen
                screen.rowoff = y.saturating_sub(screen.rows() / 2);
                screen.coloff = 0;
                return;
            }
        }
    }
}

pub enum PromptAction {
    SaveAs,
    Search(SearchState),
    Command,
}

// One active prompt. The editor holds Option<Prompt> as its mode: while this
// value exists, the control loop routes every key here instead of editing
pub struct Prompt {
    prefix: String,
    suffix: String,
    pub input: String,
    pub action: PromptAction,
}

impl Prompt {
    fn with_template(template: &str, action: PromptAction) -> Self {
        let mut it = template.splitn(2, "{}");
        let prefix = it.next().unwrap().to_string();
        let suffix = it.next().unwrap_or("").to_string();
        Self {
            prefix,
            suffix,
            input: String::new(),
            action,
        }
    }

    pub fn save_as() -> Self {
        Self::with_template("Save as: {} (ESC to cancel)", PromptAction::SaveAs)
    }

    pub fn search<W: Write>(buf: &TextBuffer, screen: &Screen<W>) -> Self {
        Self::with_template(
            "Search: {} (RIGHT/DOWN = forward, LEFT/UP = back, ESC to cancel)",
            PromptAction::Search(SearchState {
                last_match: None,
                forward: true,
                saved_cursor: buf.cursor(),
                saved_scroll: (screen.rowoff, screen.coloff),
            }),
        )
    }

    pub fn command() -> Self {
        Self::with_template(
            "Command: {} (q = force quit, u = undo, ESC to cancel)",
            PromptAction::Command,
        )
    }

    pub fn display(&self) -> String {
        let mut text =
            String::with_capacity(self.prefix.len() + self.input.len() + self.suffix.len());
        text.push_str(&self.prefix);
        text.push_str(&self.input);
        text.push_str(&self.suffix);
        text
    }

    // Terminal column just after the input on the message line
    pub fn cursor_col(&self) -> usize {
        self.prefix.chars().count() + self.input.chars().count() + 1
    }

    pub fn handle_key<W: Write>(
        &mut self,
        seq: InputSeq,
        buf: &mut TextBuffer,
        screen: &mut Screen<W>,
    ) -> PromptResult {
        use KeySeq::*;

        match (&seq.key, seq.ctrl) {
            (Unidentified, ..) => return PromptResult::Pending,
            (Key(0x1b), ..) => return PromptResult::Canceled,
            (Key(b'\r'), ..) | (Key(b'm'), true) => return PromptResult::Committed,
            (Key(0x7f), ..) | (Key(b'h'), true) => {
                self.input.pop();
            }
            (Key(b'u'), true) => self.input.clear(),
            (Key(b), false) if !b.is_ascii_control() => self.input.push(*b as char),
            _ => {}
        }

        if let PromptAction::Search(state) = &mut self.action {
            state.on_key(&self.input, &seq, buf, screen);
        }

        PromptResult::Pending
    }
}
