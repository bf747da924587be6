//! ASCII to USB HID keycode mapping (US layout).
//!
//! One static table covers every character the typer can produce.  Each
//! entry packs the usage code in the low byte and a shift flag above it;
//! a zero entry is the "no keycode" sentinel.  Characters without an
//! entry are dropped silently when typed - this is intentional, the
//! host simply sees no keystroke for them.

use crate::hid::keyboard::MODIFIER_LEFT_SHIFT;

/// USB HID keyboard usage codes (HID Usage Tables, page 0x07).
pub mod keycode {
    pub const A: u8 = 0x04;
    pub const Z: u8 = 0x1D;
    pub const KEY_1: u8 = 0x1E;
    pub const KEY_9: u8 = 0x26;
    /// `0` follows `9` in the usage table.
    pub const KEY_0: u8 = 0x27;
    pub const ENTER: u8 = 0x28;
    pub const SPACE: u8 = 0x2C;
    pub const MINUS: u8 = 0x2D;
    pub const EQUAL: u8 = 0x2E;
    pub const BRACKET_LEFT: u8 = 0x2F;
    pub const BRACKET_RIGHT: u8 = 0x30;
    pub const BACKSLASH: u8 = 0x31;
    pub const SEMICOLON: u8 = 0x33;
    pub const APOSTROPHE: u8 = 0x34;
    pub const COMMA: u8 = 0x36;
    pub const PERIOD: u8 = 0x37;
    pub const SLASH: u8 = 0x38;
}

use keycode::*;

/// A single key press: usage code plus modifier bitfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyStroke {
    pub keycode: u8,
    pub modifier: u8,
}

impl KeyStroke {
    /// The "no keycode" value returned for NUL and unmapped characters.
    pub const SENTINEL: KeyStroke = KeyStroke {
        keycode: 0,
        modifier: 0,
    };

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    pub fn is_shifted(&self) -> bool {
        self.modifier & MODIFIER_LEFT_SHIFT != 0
    }
}

/// Shift flag in a table entry.
const SHIFT: u16 = 0x100;

/// No keycode.
const NONE: u16 = 0;

/// Unshifted key.
const fn n(code: u8) -> u16 {
    code as u16
}

/// Key that needs shift held.
const fn s(code: u8) -> u16 {
    SHIFT | (code as u16)
}

const PUNCTUATION: [(u8, u16); 30] = [
    (b'!', s(KEY_1)),
    (b'@', s(KEY_1 + 1)),
    (b'#', s(KEY_1 + 2)),
    (b'$', s(KEY_1 + 3)),
    (b'%', s(KEY_1 + 4)),
    (b'^', s(KEY_1 + 5)),
    (b'&', s(KEY_1 + 6)),
    (b'*', s(KEY_1 + 7)),
    (b'(', s(KEY_9)),
    (b')', s(KEY_0)),
    (b'-', n(MINUS)),
    (b'_', s(MINUS)),
    (b'=', n(EQUAL)),
    (b'+', s(EQUAL)),
    (b'[', n(BRACKET_LEFT)),
    (b'{', s(BRACKET_LEFT)),
    (b']', n(BRACKET_RIGHT)),
    (b'}', s(BRACKET_RIGHT)),
    (b'\\', n(BACKSLASH)),
    (b'|', s(BACKSLASH)),
    (b';', n(SEMICOLON)),
    (b':', s(SEMICOLON)),
    (b'\'', n(APOSTROPHE)),
    (b'"', s(APOSTROPHE)),
    (b',', n(COMMA)),
    (b'<', s(COMMA)),
    (b'.', n(PERIOD)),
    (b'>', s(PERIOD)),
    (b'/', n(SLASH)),
    (b'?', s(SLASH)),
];

static KEY_TABLE: [u16; 128] = build_table();

const fn build_table() -> [u16; 128] {
    let mut table = [NONE; 128];

    let mut i = 0;
    while i < 26 {
        table[(b'a' + i) as usize] = n(A + i);
        table[(b'A' + i) as usize] = s(A + i);
        i += 1;
    }

    // 1..9 are contiguous, 0 comes after 9.
    let mut d = 0;
    while d < 9 {
        table[(b'1' + d) as usize] = n(KEY_1 + d);
        d += 1;
    }
    table[b'0' as usize] = n(KEY_0);

    let mut p = 0;
    while p < PUNCTUATION.len() {
        let (ch, entry) = PUNCTUATION[p];
        table[ch as usize] = entry;
        p += 1;
    }

    table
}

const fn decode(entry: u16) -> KeyStroke {
    KeyStroke {
        keycode: (entry & 0xFF) as u8,
        modifier: if entry & SHIFT != 0 {
            MODIFIER_LEFT_SHIFT
        } else {
            0
        },
    }
}

/// Map one character to its key stroke.
///
/// Returns [`KeyStroke::SENTINEL`] for NUL and for anything outside the
/// supported set.
pub fn map(ch: u8) -> KeyStroke {
    match KEY_TABLE.get(ch as usize) {
        Some(&entry) => decode(entry),
        None => KeyStroke::SENTINEL,
    }
}

/// Inverse of [`map`]: the character a stroke would type.
pub fn unmap(stroke: KeyStroke) -> Option<u8> {
    if stroke.is_sentinel() {
        return None;
    }
    KEY_TABLE
        .iter()
        .position(|&entry| entry != NONE && decode(entry) == stroke)
        .map(|idx| idx as u8)
}

/// `true` if typing `ch` produces a keystroke.
pub fn is_mappable(ch: u8) -> bool {
    !map(ch).is_sentinel()
}
