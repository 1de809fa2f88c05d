use crate::error::Result;
use std::fmt;
use std::io::{self, Read};
use std::ops::{Deref, DerefMut};
use std::os::unix::io::AsRawFd;

pub struct StdinRawMode {
    stdin: io::Stdin,
    orig: termios::Termios,
}

impl StdinRawMode {
    pub fn new() -> Result<StdinRawMode> {
        use termios::*;

        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        let mut termios = Termios::from_fd(fd)?;
        let orig = termios;

        // Set terminal raw mode. Disable echo back, canonical mode, signals (SIGINT, SIGTSTP) and Ctrl+V.
        termios.c_lflag &= !(ECHO | ICANON | ISIG | IEXTEN);
        // Disable control flow mode (Ctrl+Q/Ctrl+S) and CR-to-NL translation
        termios.c_iflag &= !(IXON | ICRNL | BRKINT | INPCK | ISTRIP);
        // Disable output processing such as \n to \r\n translation
        termios.c_oflag &= !OPOST;
        // Ensure character size is 8bits
        termios.c_cflag |= CS8;
        // Do not wait for next byte with blocking since reading 0 byte is permitted
        termios.c_cc[VMIN] = 0;
        // Set read timeout to 1/10 second it enables 100ms timeout on read()
        termios.c_cc[VTIME] = 1;
        // Apply terminal configurations
        tcsetattr(fd, TCSAFLUSH, &termios)?;

        Ok(StdinRawMode { stdin, orig })
    }

    pub fn input_keys(self) -> InputSequences {
        InputSequences { stdin: self }
    }
}

impl Drop for StdinRawMode {
    fn drop(&mut self) {
        // Restore original terminal mode
        termios::tcsetattr(self.stdin.as_raw_fd(), termios::TCSAFLUSH, &self.orig).unwrap();
    }
}

impl Deref for StdinRawMode {
    type Target = io::Stdin;

    fn deref(&self) -> &Self::Target {
        &self.stdin
    }
}

impl DerefMut for StdinRawMode {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stdin
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum KeySeq {
    Unidentified,
    Key(u8), // Char code and ctrl mod
    LeftKey,
    RightKey,
    UpKey,
    DownKey,
    PageUpKey,
    PageDownKey,
    HomeKey,
    EndKey,
    DeleteKey,
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeySeq::*;
        match self {
            Unidentified => write!(f, "UNKNOWN"),
            Key(b' ') => write!(f, "SPACE"),
            Key(0x1b) => write!(f, "ESC"),
            Key(b) if b.is_ascii_control() => write!(f, "\\x{:x}", b),
            Key(b) => write!(f, "{}", *b as char),
            LeftKey => write!(f, "LEFT"),
            RightKey => write!(f, "RIGHT"),
            UpKey => write!(f, "UP"),
            DownKey => write!(f, "DOWN"),
            PageUpKey => write!(f, "PAGEUP"),
            PageDownKey => write!(f, "PAGEDOWN"),
            HomeKey => write!(f, "HOME"),
            EndKey => write!(f, "END"),
            DeleteKey => write!(f, "DELETE"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct InputSeq {
    pub key: KeySeq,
    pub ctrl: bool,
}

impl InputSeq {
    pub fn new(key: KeySeq) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: KeySeq) -> Self {
        Self { key, ctrl: true }
    }
}

impl fmt::Display for InputSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        write!(f, "{}", self.key)
    }
}

pub struct InputSequences {
    stdin: StdinRawMode,
}

impl InputSequences {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut one_byte: [u8; 1] = [0];
        Ok(if self.stdin.read(&mut one_byte)? == 0 {
            None
        } else {
            Some(one_byte[0])
        })
    }

    // Reads the bytes following an ESC byte. Escape sequences here are at most
    // '[' followed by one letter or one digit and '~'. Anything unmatched or
    // incomplete falls back to a bare ESC key.
    fn decode_escape_sequence(&mut self) -> Result<InputSeq> {
        use KeySeq::*;

        let esc = InputSeq::new(Key(0x1b));

        match self.read_byte()? {
            Some(b'[') => { /* fall through */ }
            _ => return Ok(esc), // Including timeout, when ESC key was pressed alone
        }

        match self.read_byte()? {
            Some(b @ b'0'..=b'9') => match self.read_byte()? {
                // e.g. Home => \x1b[1~, PageUp => \x1b[5~
                Some(b'~') => Ok(match b {
                    b'1' | b'7' => InputSeq::new(HomeKey),
                    b'3' => InputSeq::new(DeleteKey),
                    b'4' | b'8' => InputSeq::new(EndKey),
                    b'5' => InputSeq::new(PageUpKey),
                    b'6' => InputSeq::new(PageDownKey),
                    _ => esc,
                }),
                _ => Ok(esc),
            },
            // e.g. Up => \x1b[A
            Some(b'A') => Ok(InputSeq::new(UpKey)),
            Some(b'B') => Ok(InputSeq::new(DownKey)),
            Some(b'C') => Ok(InputSeq::new(RightKey)),
            Some(b'D') => Ok(InputSeq::new(LeftKey)),
            Some(b'H') => Ok(InputSeq::new(HomeKey)),
            Some(b'F') => Ok(InputSeq::new(EndKey)),
            _ => Ok(esc),
        }
    }

    fn decode(&mut self, b: u8) -> Result<InputSeq> {
        use KeySeq::*;
        match b {
            // (Maybe) Escape sequence. Ctrl-[ is not available due to this
            0x1b => self.decode_escape_sequence(),
            // Ctrl-SPACE and Ctrl-?. 0x40, 0x3f, 0x60, 0x5f are not available
            0x00 | 0x1f => Ok(InputSeq::ctrl(Key(b | 0b0010_0000))),
            // Ctrl-\ and Ctrl-]. 0x3c, 0x3d, 0x7c, 0x7d are not available
            0x1c | 0x1d => Ok(InputSeq::ctrl(Key(b | 0b0100_0000))),
            // 0x00~0x1f keys are ascii keys with ctrl. Ctrl mod masks key with 0b11111.
            // Here unmask it with 0b1100000. It only works with 0x61~0x7f.
            0x00..=0x1f => Ok(InputSeq::ctrl(Key(b | 0b0110_0000))),
            // Ascii key inputs including backspace (0x7f)
            0x20..=0x7f => Ok(InputSeq::new(Key(b))),
            // Editing is per byte column. Multi-byte input is not supported
            0x80..=0xff => Ok(InputSeq::new(Unidentified)),
        }
    }

    fn read_seq(&mut self) -> Result<InputSeq> {
        if let Some(b) = self.read_byte()? {
            self.decode(b)
        } else {
            Ok(InputSeq::new(KeySeq::Unidentified))
        }
    }
}

impl Iterator for InputSequences {
    type Item = Result<InputSeq>;

    // Read next byte from stdin with timeout 100ms. If nothing was read, it returns
    // InputSeq::Unidentified. This method never returns None so for loop never ends
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_seq())
    }
}
