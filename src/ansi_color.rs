use std::env;
use term::terminfo::TermInfo;

#[derive(Clone, Copy)]
pub enum ColorSupport {
    TrueColor,
    Extended256,
    Only16,
}

impl ColorSupport {
    pub fn from_env() -> ColorSupport {
        env::var("COLORTERM")
            .ok()
            .and_then(|v| {
                if v == "truecolor" {
                    Some(ColorSupport::TrueColor)
                } else {
                    None
                }
            })
            .or_else(|| {
                TermInfo::from_env().ok().and_then(|info| {
                    info.numbers.get("colors").map(|colors| {
                        if *colors == 256 {
                            ColorSupport::Extended256
                        } else {
                            ColorSupport::Only16
                        }
                    })
                })
            })
            .unwrap_or(ColorSupport::Only16)
    }
}

#[derive(PartialEq)]
pub enum AnsiColor {
    Reset,
    Yellow,
    RedBG,
    Invert,
}

impl AnsiColor {
    pub fn sequence(&self, support: ColorSupport) -> &'static [u8] {
        // 'm' sets attributes to text printed after: https://vt100.net/docs/vt100-ug/chapter3.html#SGR
        // 256 colors sequences are '\x1b[38;5;<n>m' (fg) or '\x1b[48;5;<n>m' (bg)
        // 24bit colors sequences are '\x1b[38;2;<r>;<g>;<b>m' (fg) or '\x1b[48;2;<r>;<g>;<b>m' (bg)
        use AnsiColor::*;
        match support {
            ColorSupport::TrueColor => match self {
                Reset => b"\x1b[39;0m",
                Yellow => b"\x1b[1m\x1b[38;2;250;189;47m",
                RedBG => b"\x1b[48;2;204;36;29m",
                Invert => b"\x1b[7m",
            },
            ColorSupport::Extended256 => match self {
                Reset => b"\x1b[39;0m",
                Yellow => b"\x1b[1m\x1b[38;5;214m",
                RedBG => b"\x1b[48;5;124m",
                Invert => b"\x1b[7m",
            },
            ColorSupport::Only16 => match self {
                Reset => b"\x1b[39;0m",
                Yellow => b"\x1b[1;33m",
                RedBG => b"\x1b[41m",
                Invert => b"\x1b[7m",
            },
        }
    }
}
