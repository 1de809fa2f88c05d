mod ansi_color;
mod editor;
mod error;
mod history;
mod input;
mod prompt;
mod row;
mod screen;
mod status_bar;
mod text_buffer;


pub use crate::editor::Editor;
pub use crate::error::{Error, Result};
pub use crate::input::{InputSeq, KeySeq, StdinRawMode};
pub use crate::screen::HELP_MESSAGE;
pub use crate::text_buffer::{Lines, TextBuffer};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
