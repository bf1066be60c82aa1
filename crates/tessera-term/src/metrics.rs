// SPDX-License-Identifier: MIT
//
// Text metrics — how many terminal columns a string occupies.
//
// Both scans are single forward passes over code points. Control
// characters (C0, DEL, C1) are zero-width rather than an error; every
// other code point takes its width from the Unicode East Asian Width
// tables (1 for most scripts, 2 for CJK and wide emoji, 0 for combining
// marks).

use unicode_width::UnicodeWidthChar;

/// Whether `c` is a control character (C0, DEL, or C1).
#[inline]
#[must_use]
pub fn is_control(c: char) -> bool {
    c.is_control()
}

/// Terminal column width of a single code point.
#[inline]
#[must_use]
pub fn char_width(c: char) -> usize {
    if is_control(c) {
        0
    } else {
        c.width().unwrap_or(0)
    }
}

/// Whether `c` would draw something: printable with positive width.
#[inline]
#[must_use]
pub fn is_printable(c: char) -> bool {
    char_width(c) > 0
}

/// Total column width of `s`.
///
/// ```
/// use tessera_term::metrics::display_width;
///
/// assert_eq!(display_width(""), 0);
/// assert_eq!(display_width("A"), 1);
/// assert_eq!(display_width("日本"), 4);
/// assert_eq!(display_width("a\tb"), 2);
/// ```
#[must_use]
pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// The longest prefix of `s` that fits in `max_width` columns.
///
/// Stops at the last code point boundary before the budget would be
/// exceeded; a wide character that would straddle the edge is dropped
/// whole. Zero-width code points after the last visible one are kept.
///
/// ```
/// use tessera_term::metrics::truncate_to_width;
///
/// assert_eq!(truncate_to_width("hello", 3), "hel");
/// assert_eq!(truncate_to_width("日本語", 3), "日");
/// assert_eq!(truncate_to_width("abc", 10), "abc");
/// ```
#[must_use]
pub fn truncate_to_width(s: &str, max_width: usize) -> &str {
    let mut remaining = max_width;
    for (i, c) in s.char_indices() {
        let w = char_width(c);
        if w > remaining {
            return &s[..i];
        }
        remaining -= w;
    }
    s
}

/// Number of bytes the UTF-8 encoding of code point `cp` takes.
///
/// Total over `u32`: values outside the Unicode range are sized as if
/// the 4-byte form were stretched to hold them.
#[must_use]
pub const fn bytes_of_character(cp: u32) -> usize {
    if cp < 0x80 {
        1
    } else if cp < 0x800 {
        2
    } else if cp < 0x1_0000 {
        3
    } else {
        4
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
