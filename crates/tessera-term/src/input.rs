// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into `RawEvent`s: characters, key codes, and
// mouse reports. Handles the protocols `AnsiBackend` enables:
//
// - Legacy CSI sequences (arrows, editing keys, function keys) with the
//   xterm modifier parameter
// - SS3 sequences (cursor keys in application mode, F1–F4, keypad Enter)
// - SGR mouse protocol (press / release / motion / wheel)
// - UTF-8 multi-byte characters
//
// Control characters and DEL are passed through as `Char` unchanged;
// naming them is the key-name decoder's job.
//
// # Design
//
// Escape sequences can span multiple `read()` calls, so the parser keeps
// a small byte buffer. Feed bytes with [`Parser::advance`] and collect
// the returned events. After `escape_delay` with no new bytes, call
// [`Parser::flush`] to emit a pending lone ESC as the Escape key.
//
// Number parsing is done directly on `&[u8]`.

use crate::backend::{MouseReport, MouseReportKind, RawEvent};
use crate::keycode::{KeyCode, PadKey};

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte could be the Escape key or the start of a sequence.
/// The parser holds a lone ESC back until more bytes arrive or the caller
/// gives up waiting and calls [`flush`](Parser::flush).
#[derive(Debug)]
pub struct Parser {
    /// Raw bytes not yet consumed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every event that can be parsed.
    ///
    /// Bytes forming an incomplete sequence stay buffered and are
    /// combined with the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<RawEvent> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up on pending bytes and emit them as plain characters.
    ///
    /// A lone ESC becomes `Char('\x1b')`; a truncated sequence becomes its
    /// ASCII bytes one by one. Partial UTF-8 is dropped.
    pub fn flush(&mut self) -> Vec<RawEvent> {
        let events = self
            .buf
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| RawEvent::Char(char::from(b)))
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// Each function reads from the start of `buf` and returns what it found
// plus how many bytes to consume.

/// Result of trying to parse one event.
#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    /// An event, consuming `usize` bytes.
    Event(RawEvent, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognised bytes; skip `usize` of them.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&lead) = buf.first() else {
        return Parsed::Skip(0);
    };

    match lead {
        0x1B => parse_escape(buf),
        // Controls, printable ASCII and DEL are all single characters.
        b @ 0x00..=0x7F => Parsed::Event(RawEvent::Char(char::from(b)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        // Bare continuation byte.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    match buf.get(1) {
        None => Parsed::Incomplete,
        Some(b'[') => parse_csi(buf),
        Some(b'O') => parse_ss3(buf),
        // ESC followed by anything else is the Escape key; the next byte
        // is parsed on its own.
        Some(_) => Parsed::Event(RawEvent::Char('\x1b'), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    if buf[2] == b'<' {
        return parse_sgr_mouse(buf);
    }

    // Scan for the final byte (0x40..=0x7E). Parameter bytes are
    // 0x30..=0x3F, intermediates 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifier = params.get(1).copied().unwrap_or(1);

    // ── Tilde-terminated: editing keys and F5 upwards ────────────────
    if final_byte == b'~' {
        let code = match params.first().copied().unwrap_or(0) {
            1 | 7 => pad_key(PadKey::Home, modifier),
            2 => pad_key(PadKey::Insert, modifier),
            3 => pad_key(PadKey::Delete, modifier),
            4 | 8 => pad_key(PadKey::End, modifier),
            5 => pad_key(PadKey::PageUp, modifier),
            6 => pad_key(PadKey::PageDown, modifier),
            11 => function_key(1, modifier),
            12 => function_key(2, modifier),
            13 => function_key(3, modifier),
            14 => function_key(4, modifier),
            15 => function_key(5, modifier),
            17 => function_key(6, modifier),
            18 => function_key(7, modifier),
            19 => function_key(8, modifier),
            20 => function_key(9, modifier),
            21 => function_key(10, modifier),
            23 => function_key(11, modifier),
            24 => function_key(12, modifier),
            25 => function_key(13, modifier),
            26 => function_key(14, modifier),
            28 => function_key(15, modifier),
            29 => function_key(16, modifier),
            31 => function_key(17, modifier),
            32 => function_key(18, modifier),
            33 => function_key(19, modifier),
            34 => function_key(20, modifier),
            _ => None,
        };
        return code.map_or(Parsed::Skip(consumed), |c| {
            Parsed::Event(RawEvent::Key(c), consumed)
        });
    }

    // ── Letter-terminated ────────────────────────────────────────────
    let code = match final_byte {
        b'A' => pad_key(PadKey::Up, modifier),
        b'B' => pad_key(PadKey::Down, modifier),
        b'C' => pad_key(PadKey::Right, modifier),
        b'D' => pad_key(PadKey::Left, modifier),
        b'H' => pad_key(PadKey::Home, modifier),
        b'F' => pad_key(PadKey::End, modifier),
        b'P' => function_key(1, modifier),
        b'Q' => function_key(2, modifier),
        b'R' => function_key(3, modifier),
        b'S' => function_key(4, modifier),
        b'Z' => Some(KeyCode::BTAB),
        _ => None,
    };

    code.map_or(Parsed::Skip(consumed), |c| {
        Parsed::Event(RawEvent::Key(c), consumed)
    })
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match b {
        b'A' => Some(KeyCode::UP),
        b'B' => Some(KeyCode::DOWN),
        b'C' => Some(KeyCode::RIGHT),
        b'D' => Some(KeyCode::LEFT),
        b'H' => Some(KeyCode::HOME),
        b'F' => Some(KeyCode::END),
        b'M' => Some(KeyCode::ENTER),
        b'P' => KeyCode::f(1),
        b'Q' => KeyCode::f(2),
        b'R' => KeyCode::f(3),
        b'S' => KeyCode::f(4),
        _ => None,
    };

    code.map_or(Parsed::Skip(3), |c| Parsed::Event(RawEvent::Key(c), 3))
}

// ── SGR Mouse Protocol ─────────────────────────────────────────────────────

fn parse_sgr_mouse(buf: &[u8]) -> Parsed {
    // Format: ESC [ < Pb ; Px ; Py M    (press/motion)
    //         ESC [ < Pb ; Px ; Py m    (release)
    debug_assert!(buf.len() >= 3 && buf[2] == b'<');

    let start = 3;
    let mut end = start;
    while end < buf.len() {
        if buf[end] == b'M' || buf[end] == b'm' {
            break;
        }
        if !buf[end].is_ascii_digit() && buf[end] != b';' {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let is_release = buf[end] == b'm';
    let consumed = end + 1;

    let params = &buf[start..end];
    let (cb, rest) = parse_u16_from(params);
    let rest = skip_byte(rest, b';');
    let (raw_x, rest) = parse_u16_from(rest);
    let rest = skip_byte(rest, b';');
    let (raw_y, _) = parse_u16_from(rest);

    // SGR coordinates are 1-indexed.
    let x = raw_x.saturating_sub(1);
    let y = raw_y.saturating_sub(1);

    let is_wheel = cb & 64 != 0;
    let is_motion = cb & 32 != 0;
    let base = cb & 3;

    let kind = if is_wheel {
        match base {
            0 => MouseReportKind::Pressed(4),
            1 => MouseReportKind::Pressed(5),
            // Horizontal wheel.
            _ => return Parsed::Skip(consumed),
        }
    } else if is_motion {
        MouseReportKind::Moved
    } else if base == 3 {
        return Parsed::Skip(consumed);
    } else {
        let button = button_number(base);
        if is_release {
            MouseReportKind::Released(button)
        } else {
            MouseReportKind::Pressed(button)
        }
    };

    Parsed::Event(RawEvent::Mouse(MouseReport { x, y, kind }), consumed)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    for &b in &buf[1..expected] {
        if b & 0xC0 != 0x80 {
            return Parsed::Skip(1);
        }
    }

    std::str::from_utf8(&buf[..expected]).map_or(Parsed::Skip(1), |s| {
        s.chars()
            .next()
            .map_or(Parsed::Skip(expected), |ch| {
                Parsed::Event(RawEvent::Char(ch), expected)
            })
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// A cursor-pad key with xterm modifier parameter `m` (`1 + bitmask` of
/// shift=1, alt=2, ctrl=4).
///
/// Shift alone maps to the standard shifted code where curses has one.
/// Anything else modified lands in the extended block, whose capability
/// name carries the parameter (`kLFT5`).
fn pad_key(key: PadKey, m: u16) -> Option<KeyCode> {
    match m {
        0 | 1 => Some(key.code()),
        2 => Some(key.shifted().unwrap_or(KeyCode::modified(key, 2))),
        3..=15 => u8::try_from(m).ok().map(|m| KeyCode::modified(key, m)),
        _ => Some(key.code()),
    }
}

/// Function key `n` with modifier parameter `m`.
///
/// Modified F1–F12 fold into the upper function keys the way xterm's
/// terminfo numbers them: shift +12, ctrl +24, shift-ctrl +36, alt +48,
/// shift-alt +60. Folds past F63 and other modifiers are dropped.
fn function_key(n: u8, m: u16) -> Option<KeyCode> {
    let offset = match m {
        2 => 12,
        5 => 24,
        6 => 36,
        3 => 48,
        4 => 60,
        _ => 0,
    };
    if n <= 12 {
        KeyCode::f(n + offset).or_else(|| KeyCode::f(n))
    } else {
        KeyCode::f(n)
    }
}

/// SGR base button value (0 left, 1 middle, 2 right) to X11 number.
#[allow(clippy::cast_possible_truncation)] // base is masked to 0..=2.
const fn button_number(base: u16) -> u8 {
    base as u8 + 1
}

/// Parse semicolon-separated CSI parameters.
///
/// Examples:
/// - `1;5` → `[1, 5]`
/// - (empty) → `[]`
///
/// Colon sub-parameters are skipped.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut params = Vec::with_capacity(4);
    let mut pos = 0;

    while pos <= raw.len() {
        let (val, next) = parse_u16_at(raw, pos);
        pos = next;
        params.push(val);

        while pos < raw.len() && raw[pos] == b':' {
            pos = parse_u16_at(raw, pos + 1).1;
        }

        if pos < raw.len() && raw[pos] == b';' {
            pos += 1;
        } else {
            break;
        }
    }

    params
}

/// Parse a u16 from bytes starting at `start`, stopping at non-digit.
/// Returns `(value, next_position)`.
fn parse_u16_at(buf: &[u8], start: usize) -> (u16, usize) {
    let mut val: u16 = 0;
    let mut pos = start;
    while pos < buf.len() && buf[pos].is_ascii_digit() {
        val = val
            .saturating_mul(10)
            .saturating_add(u16::from(buf[pos] - b'0'));
        pos += 1;
    }
    (val, pos)
}

/// Parse a u16 from the start of a byte slice.
/// Returns `(value, remaining_bytes)`.
fn parse_u16_from(buf: &[u8]) -> (u16, &[u8]) {
    let (val, pos) = parse_u16_at(buf, 0);
    (val, &buf[pos..])
}

/// Skip a leading byte if it matches `expected`.
fn skip_byte(buf: &[u8], expected: u8) -> &[u8] {
    if buf.first() == Some(&expected) {
        &buf[1..]
    } else {
        buf
    }
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: parse bytes and return all events.
    fn parse(data: &[u8]) -> Vec<RawEvent> {
        Parser::new().advance(data)
    }

    /// Helper: parse bytes, return exactly one event.
    fn parse_one(data: &[u8]) -> RawEvent {
        let events = parse(data);
        assert_eq!(events.len(), 1, "expected 1 event, got {events:?}");
        events[0]
    }

    fn key(code: KeyCode) -> RawEvent {
        RawEvent::Key(code)
    }

    fn mouse(x: u16, y: u16, kind: MouseReportKind) -> RawEvent {
        RawEvent::Mouse(MouseReport { x, y, kind })
    }

    // ── Characters ──────────────────────────────────────────────────────

    #[test]
    fn ascii_single_char() {
        assert_eq!(parse_one(b"a"), RawEvent::Char('a'));
    }

    #[test]
    fn ascii_multiple_chars() {
        assert_eq!(
            parse(b"hi!"),
            vec![RawEvent::Char('h'), RawEvent::Char('i'), RawEvent::Char('!')]
        );
    }

    #[test]
    fn controls_pass_through() {
        assert_eq!(parse_one(b"\x01"), RawEvent::Char('\x01'));
        assert_eq!(parse_one(b"\r"), RawEvent::Char('\r'));
        assert_eq!(parse_one(b"\t"), RawEvent::Char('\t'));
        assert_eq!(parse_one(b"\x00"), RawEvent::Char('\0'));
    }

    #[test]
    fn del_passes_through() {
        assert_eq!(parse_one(b"\x7f"), RawEvent::Char('\x7f'));
    }

    // ── Cursor Keys ─────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse_one(b"\x1b[A"), key(KeyCode::UP));
        assert_eq!(parse_one(b"\x1b[B"), key(KeyCode::DOWN));
        assert_eq!(parse_one(b"\x1b[C"), key(KeyCode::RIGHT));
        assert_eq!(parse_one(b"\x1b[D"), key(KeyCode::LEFT));
    }

    #[test]
    fn ss3_arrows_and_home_end() {
        assert_eq!(parse_one(b"\x1bOA"), key(KeyCode::UP));
        assert_eq!(parse_one(b"\x1bOH"), key(KeyCode::HOME));
        assert_eq!(parse_one(b"\x1bOF"), key(KeyCode::END));
    }

    #[test]
    fn ss3_keypad_enter() {
        assert_eq!(parse_one(b"\x1bOM"), key(KeyCode::ENTER));
    }

    #[test]
    fn shift_arrows_use_standard_codes() {
        assert_eq!(parse_one(b"\x1b[1;2A"), key(KeyCode::SR));
        assert_eq!(parse_one(b"\x1b[1;2B"), key(KeyCode::SF));
        assert_eq!(parse_one(b"\x1b[1;2D"), key(KeyCode::SLEFT));
        assert_eq!(parse_one(b"\x1b[1;2C"), key(KeyCode::SRIGHT));
        assert_eq!(parse_one(b"\x1b[1;2H"), key(KeyCode::SHOME));
        assert_eq!(parse_one(b"\x1b[3;2~"), key(KeyCode::SDC));
    }

    #[test]
    fn shift_page_keys_are_extended() {
        assert_eq!(
            parse_one(b"\x1b[5;2~"),
            key(KeyCode::modified(PadKey::PageUp, 2))
        );
    }

    #[test]
    fn ctrl_right() {
        assert_eq!(
            parse_one(b"\x1b[1;5C"),
            key(KeyCode::modified(PadKey::Right, 5))
        );
    }

    #[test]
    fn alt_shift_ctrl_combinations() {
        assert_eq!(
            parse_one(b"\x1b[1;3D"),
            key(KeyCode::modified(PadKey::Left, 3))
        );
        assert_eq!(
            parse_one(b"\x1b[1;6H"),
            key(KeyCode::modified(PadKey::Home, 6))
        );
        assert_eq!(
            parse_one(b"\x1b[1;7F"),
            key(KeyCode::modified(PadKey::End, 7))
        );
    }

    #[test]
    fn out_of_range_modifier_is_plain() {
        assert_eq!(parse_one(b"\x1b[1;99A"), key(KeyCode::UP));
    }

    // ── Editing Keys ────────────────────────────────────────────────────

    #[test]
    fn tilde_editing_keys() {
        assert_eq!(parse_one(b"\x1b[1~"), key(KeyCode::HOME));
        assert_eq!(parse_one(b"\x1b[2~"), key(KeyCode::IC));
        assert_eq!(parse_one(b"\x1b[3~"), key(KeyCode::DC));
        assert_eq!(parse_one(b"\x1b[4~"), key(KeyCode::END));
        assert_eq!(parse_one(b"\x1b[5~"), key(KeyCode::PPAGE));
        assert_eq!(parse_one(b"\x1b[6~"), key(KeyCode::NPAGE));
        assert_eq!(parse_one(b"\x1b[7~"), key(KeyCode::HOME));
        assert_eq!(parse_one(b"\x1b[8~"), key(KeyCode::END));
    }

    #[test]
    fn ctrl_delete() {
        assert_eq!(
            parse_one(b"\x1b[3;5~"),
            key(KeyCode::modified(PadKey::Delete, 5))
        );
    }

    #[test]
    fn back_tab() {
        assert_eq!(parse_one(b"\x1b[Z"), key(KeyCode::BTAB));
    }

    // ── Function Keys ───────────────────────────────────────────────────

    fn f(n: u8) -> RawEvent {
        key(KeyCode::f(n).unwrap())
    }

    #[test]
    fn f1_to_f4_ss3_and_csi() {
        assert_eq!(parse_one(b"\x1bOP"), f(1));
        assert_eq!(parse_one(b"\x1bOS"), f(4));
        assert_eq!(parse_one(b"\x1b[P"), f(1));
        assert_eq!(parse_one(b"\x1b[11~"), f(1));
    }

    #[test]
    fn tilde_function_keys() {
        assert_eq!(parse_one(b"\x1b[15~"), f(5));
        assert_eq!(parse_one(b"\x1b[17~"), f(6));
        assert_eq!(parse_one(b"\x1b[21~"), f(10));
        assert_eq!(parse_one(b"\x1b[24~"), f(12));
        assert_eq!(parse_one(b"\x1b[34~"), f(20));
    }

    #[test]
    fn modified_function_keys_fold_upwards() {
        assert_eq!(parse_one(b"\x1b[1;2P"), f(13));
        assert_eq!(parse_one(b"\x1b[15;5~"), f(29));
        assert_eq!(parse_one(b"\x1b[15;6~"), f(41));
        assert_eq!(parse_one(b"\x1b[1;3Q"), f(50));
        assert_eq!(parse_one(b"\x1b[1;4P"), f(61));
    }

    #[test]
    fn fold_past_f63_stays_plain() {
        assert_eq!(parse_one(b"\x1b[24;4~"), f(12));
    }

    #[test]
    fn unknown_tilde_is_skipped() {
        assert_eq!(parse(b"\x1b[99~x"), vec![RawEvent::Char('x')]);
    }

    // ── Escape ──────────────────────────────────────────────────────────

    #[test]
    fn escape_then_letter_is_two_events() {
        assert_eq!(
            parse(b"\x1bx"),
            vec![RawEvent::Char('\x1b'), RawEvent::Char('x')]
        );
    }

    #[test]
    fn lone_escape_pending() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
    }

    #[test]
    fn lone_escape_flushed() {
        let mut p = Parser::new();
        p.advance(b"\x1b");
        assert_eq!(p.flush(), vec![RawEvent::Char('\x1b')]);
        assert!(!p.has_pending());
    }

    #[test]
    fn truncated_sequence_flushes_as_characters() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[1;").is_empty());
        assert_eq!(
            p.flush(),
            vec![
                RawEvent::Char('\x1b'),
                RawEvent::Char('['),
                RawEvent::Char('1'),
                RawEvent::Char(';'),
            ]
        );
    }

    // ── SGR Mouse ───────────────────────────────────────────────────────

    #[test]
    fn mouse_left_press_and_release() {
        assert_eq!(
            parse_one(b"\x1b[<0;4;5M"),
            mouse(3, 4, MouseReportKind::Pressed(1))
        );
        assert_eq!(
            parse_one(b"\x1b[<0;4;5m"),
            mouse(3, 4, MouseReportKind::Released(1))
        );
    }

    #[test]
    fn mouse_middle_and_right() {
        assert_eq!(
            parse_one(b"\x1b[<1;1;1M"),
            mouse(0, 0, MouseReportKind::Pressed(2))
        );
        assert_eq!(
            parse_one(b"\x1b[<2;1;1M"),
            mouse(0, 0, MouseReportKind::Pressed(3))
        );
    }

    #[test]
    fn mouse_wheel_is_buttons_four_and_five() {
        assert_eq!(
            parse_one(b"\x1b[<64;10;20M"),
            mouse(9, 19, MouseReportKind::Pressed(4))
        );
        assert_eq!(
            parse_one(b"\x1b[<65;10;20M"),
            mouse(9, 19, MouseReportKind::Pressed(5))
        );
    }

    #[test]
    fn horizontal_wheel_is_skipped() {
        assert!(parse(b"\x1b[<66;1;1M").is_empty());
    }

    #[test]
    fn mouse_motion() {
        assert_eq!(
            parse_one(b"\x1b[<35;7;8M"),
            mouse(6, 7, MouseReportKind::Moved)
        );
        assert_eq!(
            parse_one(b"\x1b[<32;7;8M"),
            mouse(6, 7, MouseReportKind::Moved)
        );
    }

    #[test]
    fn mouse_modifier_bits_ignored() {
        assert_eq!(
            parse_one(b"\x1b[<16;2;2M"),
            mouse(1, 1, MouseReportKind::Pressed(1))
        );
    }

    // ── UTF-8 ───────────────────────────────────────────────────────────

    #[test]
    fn utf8_multi_byte() {
        assert_eq!(parse_one("é".as_bytes()), RawEvent::Char('é'));
        assert_eq!(parse_one("中".as_bytes()), RawEvent::Char('中'));
        assert_eq!(parse_one("🎉".as_bytes()), RawEvent::Char('🎉'));
    }

    #[test]
    fn utf8_incomplete_waits() {
        let bytes = "中".as_bytes();
        let mut p = Parser::new();
        assert!(p.advance(&bytes[..2]).is_empty());
        assert_eq!(p.advance(&bytes[2..]), vec![RawEvent::Char('中')]);
    }

    #[test]
    fn invalid_continuation_is_skipped() {
        assert_eq!(parse(b"\x80a"), vec![RawEvent::Char('a')]);
    }

    // ── Incremental Parsing ─────────────────────────────────────────────

    #[test]
    fn split_escape_sequence() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert!(p.advance(b"1;5").is_empty());
        assert_eq!(
            p.advance(b"D"),
            vec![key(KeyCode::modified(PadKey::Left, 5))]
        );
    }

    #[test]
    fn split_sgr_mouse() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[<0;3").is_empty());
        assert_eq!(
            p.advance(b";4M"),
            vec![mouse(2, 3, MouseReportKind::Pressed(1))]
        );
    }

    #[test]
    fn interleaved_keys_and_mouse() {
        assert_eq!(
            parse(b"\x1b[DA\x1b[<0;4;5M\x1b[<0;4;5m"),
            vec![
                key(KeyCode::LEFT),
                RawEvent::Char('A'),
                mouse(3, 4, MouseReportKind::Pressed(1)),
                mouse(3, 4, MouseReportKind::Released(1)),
            ]
        );
    }

    // ── Number Parsing ──────────────────────────────────────────────────

    #[test]
    fn csi_params() {
        assert_eq!(parse_csi_params(b""), Vec::<u16>::new());
        assert_eq!(parse_csi_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_csi_params(b"97;5:2"), vec![97, 5]);
        assert_eq!(parse_csi_params(b";3"), vec![0, 3]);
    }

    #[test]
    fn parse_u16_saturates() {
        assert_eq!(parse_u16_at(b"999999", 0), (u16::MAX, 6));
    }

    #[test]
    fn utf8_len() {
        assert_eq!(utf8_char_len(b'a'), 1);
        assert_eq!(utf8_char_len(0xC3), 2);
        assert_eq!(utf8_char_len(0xE4), 3);
        assert_eq!(utf8_char_len(0xF0), 4);
        assert_eq!(utf8_char_len(0x80), 0);
    }
}
