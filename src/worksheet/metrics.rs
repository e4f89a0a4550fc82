//! Glyph metrics for the two standard fonts the worksheet uses.
//!
//! Widths come from the Adobe Core14 AFM files and are in 1/1000 em.
//! Text is measured byte-for-byte as it will be encoded (WinAnsi), so a
//! character the encoding lacks is measured as the `?` that replaces it.

/// Built-in PDF font faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

impl FontFace {
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Helvetica => "F1",
            FontFace::HelveticaBold => "F2",
        }
    }
}

const MM_PER_PT: f32 = 25.4 / 72.0;

// Printable ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Map a character to its WinAnsi byte, if the encoding has it.
pub fn winansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{00A0}'..='\u{00FF}' => Some(c as u32 as u8),
        '\u{20AC}' => Some(0x80), // €
        '\u{2026}' => Some(0x85), // …
        '\u{2022}' => Some(0x95), // •
        '\u{2122}' => Some(0x99), // ™
        _ => None,
    }
}

/// Encode text for a simple-font `Tj` string; unknown characters become `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| winansi_byte(c).unwrap_or(b'?'))
        .collect()
}

/// Latin-1 letters share the advance width of their unaccented base letter.
fn latin1_base(byte: u8) -> Option<u8> {
    let base = match byte {
        0xC0..=0xC5 => b'A',
        0xC7 => b'C',
        0xC8..=0xCB => b'E',
        0xCC..=0xCF => b'I',
        0xD1 => b'N',
        0xD2..=0xD6 | 0xD8 => b'O',
        0xD9..=0xDC => b'U',
        0xDD => b'Y',
        0xE0..=0xE5 => b'a',
        0xE7 => b'c',
        0xE8..=0xEB => b'e',
        0xEC..=0xEF => b'i',
        0xF1 => b'n',
        0xF2..=0xF6 | 0xF8 => b'o',
        0xF9..=0xFC => b'u',
        0xFD | 0xFF => b'y',
        _ => return None,
    };
    Some(base)
}

/// Advance width of one encoded byte, in 1/1000 em.
pub fn byte_width(face: FontFace, byte: u8) -> u16 {
    let table = match face {
        FontFace::Helvetica => &HELVETICA,
        FontFace::HelveticaBold => &HELVETICA_BOLD,
    };
    match byte {
        0x20..=0x7E => table[(byte - 0x20) as usize],
        0x85 => 1000,
        0x95 => 350,
        _ => match latin1_base(byte) {
            Some(base) => table[(base - 0x20) as usize],
            None => table[(b'?' - 0x20) as usize],
        },
    }
}

/// Width of `text` in millimetres at `size_pt`.
pub fn text_width_mm(text: &str, face: FontFace, size_pt: f32) -> f32 {
    let units: u32 = encode_winansi(text)
        .into_iter()
        .map(|b| byte_width(face, b) as u32)
        .sum();
    units as f32 / 1000.0 * size_pt * MM_PER_PT
}
