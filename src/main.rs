use std::env;
use std::io;
use std::process::exit;
use yeti::{Editor, Result, StdinRawMode};

fn edit() -> Result<()> {
    let input = StdinRawMode::new()?.input_keys();
    let output = io::stdout();
    let window_size = term_size::dimensions_stdout();

    let mut editor = if let Some(path) = env::args().nth(1) {
        Editor::open(input, output, window_size, path)?
    } else {
        Editor::new(input, output, window_size)?
    };
    editor.edit()
}

fn main() {
    if let Err(err) = edit() {
        eprintln!("Error: {}", err);
        exit(1);
    }
}
