//! Byte → text decoding for `\'hh` escapes and raw 8-bit text.

/// Code page selected by `\ansicpg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Codepage {
    #[default]
    Windows1252,
    Utf8,
    /// Anything else: bytes map straight to U+0000..U+00FF.
    Latin1,
}

impl Codepage {
    pub(crate) fn from_ansicpg(cp: i32) -> Self {
        match cp {
            1252 => Self::Windows1252,
            65001 => Self::Utf8,
            _ => Self::Latin1,
        }
    }

    /// Decode a run of bytes collected from hex escapes and 8-bit text.
    pub(crate) fn decode(self, bytes: &[u8], out: &mut String) {
        match self {
            Self::Utf8 => out.push_str(&String::from_utf8_lossy(bytes)),
            Self::Windows1252 => out.extend(bytes.iter().map(|&b| windows_1252(b))),
            Self::Latin1 => out.extend(bytes.iter().map(|&b| char::from(b))),
        }
    }
}

fn windows_1252(b: u8) -> char {
    const HIGH: [char; 32] = [
        '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}',
        '\u{2021}', '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}',
        '\u{017D}', '\u{FFFD}', '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
        '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}',
        '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
    ];
    match b {
        0x80..=0x9F => HIGH[usize::from(b - 0x80)],
        _ => char::from(b),
    }
}
