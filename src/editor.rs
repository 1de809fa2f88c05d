use crate::error::Result;
use crate::history::{History, Snapshot};
use crate::input::{InputSeq, KeySeq};
use crate::prompt::{Prompt, PromptAction, PromptResult};
use crate::screen::Screen;
use crate::status_bar::StatusBar;
use crate::text_buffer::{CursorDir, Lines, TextBuffer};
use std::io::Write;
use std::path::Path;

pub struct Editor<I: Iterator<Item = Result<InputSeq>>, W: Write> {
    input: I, // Escape sequences stream represented as Iterator
    buf: TextBuffer,
    screen: Screen<W>,
    status_bar: StatusBar,
    history: History,
    // Explicit prompt mode. None while editing; while Some, the control loop
    // routes every key to the prompt instead of the edit keymap
    mode: Option<Prompt>,
}

impl<I, W> Editor<I, W>
where
    I: Iterator<Item = Result<InputSeq>>,
    W: Write,
{
    fn with_buf(
        buf: TextBuffer,
        input: I,
        output: W,
        window_size: Option<(usize, usize)>,
    ) -> Result<Editor<I, W>> {
        let screen = Screen::new(window_size, output)?;
        let status_bar = StatusBar::from_buffer(&buf);
        let history = History::new(Snapshot {
            rows: buf.rows().to_vec(),
            cursor: buf.cursor(),
            scroll: (0, 0),
            modified: buf.modified(),
            file: buf.file().cloned(),
        });
        Ok(Editor {
            input,
            buf,
            screen,
            status_bar,
            history,
            mode: None,
        })
    }

    pub fn new(input: I, output: W, window_size: Option<(usize, usize)>) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::empty(), input, output, window_size)
    }

    pub fn with_lines<'a, L: Iterator<Item = &'a str>>(
        lines: L,
        input: I,
        output: W,
        window_size: Option<(usize, usize)>,
    ) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::with_lines(lines), input, output, window_size)
    }

    pub fn open<P: AsRef<Path>>(
        input: I,
        output: W,
        window_size: Option<(usize, usize)>,
        path: P,
    ) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::open(path)?, input, output, window_size)
    }

    // Independent deep copy of the current editor state
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.buf.rows().to_vec(),
            cursor: self.buf.cursor(),
            scroll: (self.screen.rowoff, self.screen.coloff),
            modified: self.buf.modified(),
            file: self.buf.file().cloned(),
        }
    }

    fn undo(&mut self) {
        if self.history.at_seed() && self.buf.matches_disk() {
            self.screen.set_info_message("Buffer already matches disk");
            return;
        }
        let Snapshot {
            rows,
            cursor,
            scroll,
            modified,
            file,
        } = self.history.rollback().clone();
        self.buf.restore(rows, cursor, modified, file);
        self.screen.rowoff = scroll.0;
        self.screen.coloff = scroll.1;
    }

    fn save(&mut self) {
        if !self.buf.has_file() {
            self.mode = Some(Prompt::save_as());
            return;
        }
        self.do_save(false);
    }

    fn do_save(&mut self, created: bool) {
        match self.buf.save() {
            Ok(msg) => {
                self.screen.set_info_message(msg);
                // The just-saved state becomes the new undo boundary
                let seed = self.snapshot();
                self.history.reset(seed);
            }
            Err(msg) => {
                self.screen.set_error_message(msg);
                if created {
                    self.buf.set_unnamed();
                }
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        if self.buf.insert_char(c) {
            // Debounced undo granularity: space or every third edit
            let snapshot = self.snapshot();
            self.history.push(snapshot);
        }
    }

    fn handle_quit(&mut self) -> bool {
        if self.buf.matches_disk() {
            true
        } else {
            self.screen.set_error_message(
                "Unsaved changes! Save with ^S, or force quit with ESC then 'q'",
            );
            false
        }
    }

    fn handle_not_mapped(&mut self, seq: &InputSeq) {
        self.screen
            .set_error_message(format!("Key '{}' not mapped", seq));
    }

    fn restore_search_state(&mut self, prompt: &Prompt) {
        if let PromptAction::Search(state) = &prompt.action {
            let (cx, cy) = state.saved_cursor;
            self.buf.set_cursor(cx, cy);
            self.screen.rowoff = state.saved_scroll.0;
            self.screen.coloff = state.saved_scroll.1;
        }
    }

    fn finish_prompt(&mut self, prompt: Prompt) -> Result<bool> {
        match &prompt.action {
            PromptAction::SaveAs => {
                if prompt.input.is_empty() {
                    self.screen.set_info_message("Canceled");
                } else {
                    self.buf.set_file(prompt.input);
                    self.do_save(true);
                }
            }
            PromptAction::Search(state) => {
                if prompt.input.is_empty() {
                    self.restore_search_state(&prompt);
                    self.screen.set_info_message("Canceled");
                } else if state.matched() {
                    self.screen.set_info_message("Found");
                } else {
                    self.screen.set_info_message("Not found");
                }
            }
            PromptAction::Command => match prompt.input.as_str() {
                "q" => return Ok(true), // Force quit regardless of unsaved changes
                "u" => self.undo(),
                "" => self.screen.set_info_message("Canceled"),
                other => {
                    self.screen
                        .set_error_message(format!("Unknown command '{}'", other));
                }
            },
        }
        Ok(false)
    }

    fn process_prompt_key(&mut self, seq: InputSeq) -> Result<bool> {
        let mut prompt = self.mode.take().unwrap();
        match prompt.handle_key(seq, &mut self.buf, &mut self.screen) {
            PromptResult::Pending => self.mode = Some(prompt),
            PromptResult::Canceled => {
                // Unwind with no side effects beyond the saved search state
                self.restore_search_state(&prompt);
                self.screen.set_info_message("Canceled");
            }
            PromptResult::Committed => return self.finish_prompt(prompt),
        }
        Ok(false)
    }

    fn process_keypress(&mut self, seq: InputSeq) -> Result<bool> {
        use KeySeq::*;

        if self.mode.is_some() {
            return self.process_prompt_key(seq);
        }

        let rowoff = self.screen.rowoff;
        let rows = self.screen.rows();

        match &seq {
            InputSeq { key, ctrl: true } => match key {
                Key(b'q') => return Ok(self.handle_quit()),
                Key(b's') => self.save(),
                Key(b'f') => self.mode = Some(Prompt::search(&self.buf, &self.screen)),
                Key(b'h') => self.buf.delete_char(),
                Key(b'i') => self.insert_char('\t'), // Tab arrives as Ctrl-I in raw mode
                Key(b'm') => self.buf.insert_line(), // Enter arrives as Ctrl-M in raw mode
                _ => self.handle_not_mapped(&seq),
            },
            InputSeq { key, .. } => match key {
                Key(0x1b) => self.mode = Some(Prompt::command()),
                Key(0x7f) => self.buf.delete_char(), // Backspace
                Key(b'\r') => self.buf.insert_line(),
                Key(b) if !b.is_ascii_control() => self.insert_char(*b as char),
                UpKey => self.buf.move_cursor_one(CursorDir::Up),
                LeftKey => self.buf.move_cursor_one(CursorDir::Left),
                DownKey => self.buf.move_cursor_one(CursorDir::Down),
                RightKey => self.buf.move_cursor_one(CursorDir::Right),
                PageUpKey => self.buf.move_cursor_page(CursorDir::Up, rowoff, rows),
                PageDownKey => self.buf.move_cursor_page(CursorDir::Down, rowoff, rows),
                HomeKey => self.buf.move_cursor_to_line_edge(CursorDir::Left),
                EndKey => self.buf.move_cursor_to_line_edge(CursorDir::Right),
                DeleteKey => self.buf.delete_right_char(),
                _ => self.handle_not_mapped(&seq),
            },
        }

        Ok(false)
    }

    fn render_screen(&mut self) -> Result<()> {
        self.status_bar.update_from_buf(&self.buf);
        if let Some(prompt) = &self.mode {
            self.screen.set_info_message(prompt.display());
        }
        self.screen.render(&self.buf, &self.status_bar)?;
        if let Some(prompt) = &self.mode {
            // Park the terminal cursor just after the prompt input on the
            // message line
            let row = self.screen.rows() + 2;
            self.screen.force_set_cursor(row, prompt.cursor_col())?;
        }
        Ok(())
    }

    pub fn edit(&mut self) -> Result<()> {
        self.render_screen()?; // First paint

        while let Some(seq) = self.input.next() {
            let seq = seq?;
            let resized = self.screen.maybe_resize();

            if seq.key == KeySeq::Unidentified {
                // Read timeout tick. Redraw only when something visible changed
                if resized || self.screen.message_expired() {
                    self.render_screen()?;
                }
                continue;
            }

            if self.process_keypress(seq)? {
                break;
            }

            self.render_screen()?;
        }

        self.screen.clear() // Finally clear screen on exit
    }

    pub fn buf(&self) -> &TextBuffer {
        &self.buf
    }

    pub fn lines(&self) -> Lines<'_> {
        self.buf.lines()
    }

    pub fn screen(&self) -> &Screen<W> {
        &self.screen
    }

    pub(crate) fn history(&self) -> &History {
        &self.history
    }
}
