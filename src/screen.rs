use crate::ansi_color::{AnsiColor, ColorSupport};
use crate::error::{Error, Result};
use crate::status_bar::StatusBar;
use crate::text_buffer::TextBuffer;
use signal_hook::consts::SIGWINCH;
use signal_hook::SigId;
use std::cmp;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

pub const HELP_MESSAGE: &str = "HELP: ^S = save | ^Q = quit | ^F = find | ESC = command";

const MESSAGE_TIMEOUT_SECS: u64 = 5;

#[derive(PartialEq)]
enum StatusMessageKind {
    Info,
    Error,
}

struct StatusMessage {
    text: String,
    timestamp: SystemTime,
    kind: StatusMessageKind,
}

impl StatusMessage {
    fn new<S: Into<String>>(message: S, kind: StatusMessageKind) -> StatusMessage {
        StatusMessage {
            text: message.into(),
            timestamp: SystemTime::now(),
            kind,
        }
    }

    fn expired(&self) -> bool {
        SystemTime::now()
            .duration_since(self.timestamp)
            .map(|d| d.as_secs() >= MESSAGE_TIMEOUT_SECS)
            .unwrap_or(false)
    }
}

// Raised flag for SIGWINCH, polled between keys by the control loop
struct SigwinchFlag {
    flag: Arc<AtomicBool>,
    signal_id: Option<SigId>,
}

impl SigwinchFlag {
    fn new() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let signal_id = signal_hook::flag::register(SIGWINCH, Arc::clone(&flag)).ok();
        SigwinchFlag { flag, signal_id }
    }

    fn notified(&self) -> bool {
        self.flag.swap(false, Ordering::Relaxed)
    }
}

impl Drop for SigwinchFlag {
    fn drop(&mut self) {
        if let Some(id) = self.signal_id.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

pub struct Screen<W: Write> {
    output: W,
    // X coordinate in `render` text of the current row
    rx: usize,
    // Screen size; num_rows is 2 lines less than window height due to the
    // status bar and the message bar
    num_rows: usize,
    num_cols: usize,
    // Scroll position (row/col offset)
    pub rowoff: usize,
    pub coloff: usize,
    message: Option<StatusMessage>,
    color_support: ColorSupport,
    sigwinch: SigwinchFlag,
}

impl<W: Write> Screen<W> {
    pub fn new(window_size: Option<(usize, usize)>, output: W) -> Result<Self> {
        let (w, h) = window_size.ok_or(Error::UnknownWindowSize)?;
        if w < 1 || h < 3 {
            return Err(Error::TooSmallWindow(w, h));
        }
        Ok(Self {
            output,
            rx: 0,
            num_rows: h - 2,
            num_cols: w,
            rowoff: 0,
            coloff: 0,
            message: Some(StatusMessage::new(HELP_MESSAGE, StatusMessageKind::Info)),
            color_support: ColorSupport::from_env(),
            sigwinch: SigwinchFlag::new(),
        })
    }

    // Re-queries the window size when SIGWINCH arrived since the last key.
    // Returns true when the screen needs a full redraw
    pub fn maybe_resize(&mut self) -> bool {
        if !self.sigwinch.notified() {
            return false;
        }
        if let Some((w, h)) = term_size::dimensions_stdout() {
            self.resize(w, h);
        }
        true
    }

    // Clamped to the same 1x3 minimum enforced at startup so scroll and
    // cursor arithmetic never see a zero-row viewport
    fn resize(&mut self, w: usize, h: usize) {
        self.num_cols = cmp::max(w, 1);
        self.num_rows = cmp::max(h, 3) - 2;
    }

    // Recomputed each frame, after recomputing the render column from the live
    // cursor. The gutter narrows the usable text width on the right-hand rule
    fn do_scroll(&mut self, buf: &TextBuffer) {
        let (cx, cy) = buf.cursor();
        let rows = buf.rows();

        self.rx = if cy < rows.len() {
            rows[cy].rx_from_cx(cx)
        } else {
            0
        };

        if cy < self.rowoff {
            // Scroll up when cursor is above the top of window
            self.rowoff = cy;
        }
        if cy >= self.rowoff + self.num_rows {
            // Scroll down when cursor is below the bottom of screen
            self.rowoff = cy - self.num_rows + 1;
        }
        if self.rx < self.coloff {
            self.coloff = self.rx;
        }
        let gutter = buf.gutter_width();
        if self.rx + gutter >= self.coloff + self.num_cols {
            self.coloff = self.rx + gutter - self.num_cols + 1;
        }
    }

    fn draw_welcome_message<B: Write>(&self, mut frame: B) -> Result<()> {
        let msg = format!("Yeti editor -- version {}", crate::VERSION);
        let len = cmp::min(msg.len(), self.num_cols);
        let welcome = &msg[..len];
        let mut padding = (self.num_cols - len) / 2;
        if padding > 0 {
            frame.write_all(b"~")?;
            padding -= 1;
        }
        for _ in 0..padding {
            frame.write_all(b" ")?;
        }
        frame.write_all(welcome.as_bytes())?;
        Ok(())
    }

    fn draw_rows<B: Write>(&self, mut frame: B, buf: &TextBuffer) -> Result<()> {
        let rows = buf.rows();
        let gutter = buf.gutter_width();
        let text_cols = self.num_cols.saturating_sub(gutter);
        // Welcome banner shows only while the document is a single untouched empty row
        let welcome = rows.len() == 1 && rows[0].is_empty() && buf.matches_disk();

        for y in 0..self.num_rows {
            let file_row = y + self.rowoff;

            if file_row >= rows.len() {
                if welcome && y == self.num_rows / 3 {
                    self.draw_welcome_message(&mut frame)?;
                } else {
                    frame.write_all(b"~")?;
                }
            } else {
                let row = &rows[file_row];

                // Right-justified line number in the gutter, then one space
                frame.write_all(AnsiColor::Yellow.sequence(self.color_support))?;
                write!(frame, "{:>width$} ", file_row + 1, width = gutter - 1)?;
                frame.write_all(AnsiColor::Reset.sequence(self.color_support))?;

                let text: String = row
                    .render_text()
                    .chars()
                    .skip(self.coloff)
                    .take(text_cols)
                    .collect();
                frame.write_all(text.as_bytes())?;
            }

            // Erase the part of the line right of the text. http://vt100.net/docs/vt100-ug/chapter3.html#EL
            frame.write_all(b"\x1b[K")?;
            frame.write_all(b"\r\n")?;
        }

        Ok(())
    }

    fn draw_status_bar<B: Write>(&self, mut frame: B, status_bar: &StatusBar) -> Result<()> {
        frame.write_all(AnsiColor::Invert.sequence(self.color_support))?;

        // Clip on char boundaries; the filename may not be ASCII
        let left: String = status_bar.left().chars().take(self.num_cols).collect();
        frame.write_all(left.as_bytes())?;

        let rest_len = self.num_cols - left.chars().count();
        let right = status_bar.right();
        if right.len() <= rest_len {
            for _ in 0..rest_len - right.len() {
                frame.write_all(b" ")?;
            }
            frame.write_all(right.as_bytes())?;
        } else {
            for _ in 0..rest_len {
                frame.write_all(b" ")?;
            }
        }

        // Default argument of 'm' command is 0 so it resets attributes
        frame.write_all(b"\x1b[m")?;
        frame.write_all(b"\r\n")?;
        Ok(())
    }

    fn draw_message_bar<B: Write>(&self, mut frame: B) -> Result<()> {
        frame.write_all(b"\x1b[K")?;
        if let Some(message) = &self.message {
            let msg: String = message.text.chars().take(self.num_cols).collect();
            if message.kind == StatusMessageKind::Error {
                frame.write_all(AnsiColor::RedBG.sequence(self.color_support))?;
                frame.write_all(msg.as_bytes())?;
                frame.write_all(AnsiColor::Reset.sequence(self.color_support))?;
            } else {
                frame.write_all(msg.as_bytes())?;
            }
        }
        Ok(())
    }

    // Composes one buffered frame and writes it with a single flush
    pub fn render(&mut self, buf: &TextBuffer, status_bar: &StatusBar) -> Result<()> {
        self.do_scroll(buf);
        if let Some(message) = &self.message {
            if message.expired() {
                self.message = None;
            }
        }

        let mut frame = Vec::with_capacity((self.num_rows + 2) * self.num_cols);

        // Hide cursor while updating screen. 'l' is command to set mode http://vt100.net/docs/vt100-ug/chapter3.html#SM
        frame.write_all(b"\x1b[?25l")?;
        // H: Command to move cursor. Here \x1b[H is the same as \x1b[1;1H
        frame.write_all(b"\x1b[H")?;

        self.draw_rows(&mut frame, buf)?;
        self.draw_status_bar(&mut frame, status_bar)?;
        self.draw_message_bar(&mut frame)?;

        // Move cursor back to its logical position, offset by the gutter
        let cursor_row = buf.cy() - self.rowoff + 1;
        let cursor_col = (self.rx + buf.gutter_width() + 1).saturating_sub(self.coloff);
        write!(frame, "\x1b[{};{}H", cursor_row, cursor_col)?;

        // Reveal cursor again. 'h' is command to reset mode https://vt100.net/docs/vt100-ug/chapter3.html#RM
        frame.write_all(b"\x1b[?25h")?;

        self.output.write_all(&frame)?;
        self.output.flush()?;
        Ok(())
    }

    // Places the terminal cursor directly, used to park it after prompt input
    // on the message line
    pub fn force_set_cursor(&mut self, row: usize, col: usize) -> Result<()> {
        write!(self.output, "\x1b[{};{}H\x1b[?25h", row, col)?;
        self.output.flush()?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        // 2: Argument of 'J' command to reset entire screen
        // J: Command to erase screen http://vt100.net/docs/vt100-ug/chapter3.html#ED
        self.output.write_all(b"\x1b[2J")?;
        self.output.write_all(b"\x1b[H")?;
        self.output.flush()?;
        Ok(())
    }

    pub fn set_info_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Info));
    }

    pub fn set_error_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Error));
    }

    pub fn message_text(&self) -> &str {
        self.message.as_ref().map(|m| m.text.as_str()).unwrap_or("")
    }

    pub fn message_expired(&self) -> bool {
        self.message.as_ref().map(|m| m.expired()).unwrap_or(false)
    }

    pub fn rows(&self) -> usize {
        self.num_rows
    }

    pub fn cols(&self) -> usize {
        self.num_cols
    }
}
