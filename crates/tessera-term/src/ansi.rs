// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; `AnsiBackend` tracks what the terminal
// already has. This module only knows the byte-level encoding of every
// command the back-end sends.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

use crate::attr::TermAttr;
use crate::color::CellColor;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2) in the current background.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Replace the whole SGR state in one sequence: reset, attributes,
/// foreground, background.
///
/// `\x1b[0;1;4;38;5;196;49m` is red bold underlined text on the default
/// background. Starting from `0` means no attribute from the previous
/// style can leak into this one.
pub fn style(
    w: &mut impl Write,
    attr: TermAttr,
    fg: CellColor,
    bg: CellColor,
) -> io::Result<()> {
    w.write_all(b"\x1b[0")?;

    for (flag, code) in [
        (TermAttr::BOLD, "1"),
        (TermAttr::DIM, "2"),
        (TermAttr::ITALIC, "3"),
        (TermAttr::UNDERLINE, "4"),
        (TermAttr::REVERSE, "7"),
    ] {
        if attr.contains(flag) {
            write!(w, ";{code}")?;
        }
    }

    w.write_all(b";")?;
    color_params(w, fg, 30, 90, 38, 39)?;
    w.write_all(b";")?;
    color_params(w, bg, 40, 100, 48, 49)?;
    w.write_all(b"m")
}

/// Write the SGR parameters selecting `color`.
///
/// Compact codes for the 16 standard colours (`base`+n, `bright`+n−8),
/// the 256-colour form `ext;5;n` for the rest of the palette, `ext;2;r;g;b`
/// for `TrueColor`, and `default` for the terminal's own colour.
fn color_params(
    w: &mut impl Write,
    color: CellColor,
    base: u16,
    bright: u16,
    ext: u16,
    default: u16,
) -> io::Result<()> {
    match color {
        CellColor::Default => write!(w, "{default}"),
        CellColor::Ansi256(idx @ 0..8) => write!(w, "{}", base + u16::from(idx)),
        CellColor::Ansi256(idx @ 8..16) => write!(w, "{}", bright + u16::from(idx) - 8),
        CellColor::Ansi256(idx) => write!(w, "{ext};5;{idx}"),
        CellColor::Rgb(r, g, b) => write!(w, "{ext};2;{r};{g};{b}"),
    }
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// The terminal holds everything until [`end_sync`], so a refresh never
/// shows half-drawn. Terminals without support ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Application cursor keys (DECCKM) and application keypad (DECKPAM).
///
/// Cursor keys then arrive as `ESC O A` and keypad Enter as `ESC O M`;
/// the parser accepts both forms.
#[inline]
pub fn enter_keypad_mode(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1h\x1b=")
}

/// Back to normal cursor keys and numeric keypad.
#[inline]
pub fn exit_keypad_mode(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1l\x1b>")
}

// ─── Mouse Protocol ─────────────────────────────────────────────────────────

/// Mouse tracking granularity for SGR mouse protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    /// No mouse reporting.
    Off,
    /// Report button press and release events (DEC 1000).
    Click,
    /// Report button events and drag motion (DEC 1000 + 1002).
    Drag,
    /// Report all mouse motion, even without buttons held (DEC 1000 + 1002 + 1003).
    #[default]
    Motion,
}

/// Enable SGR mouse tracking at the specified granularity.
///
/// Uses SGR format (DEC 1006) which supports coordinates beyond column 223
/// and distinguishes button press from release. Wheel movement is reported
/// in every mode but `Off`.
pub fn enable_mouse(w: &mut impl Write, mode: MouseMode) -> io::Result<()> {
    if mode == MouseMode::Off {
        return Ok(());
    }
    w.write_all(b"\x1b[?1000h")?;
    if matches!(mode, MouseMode::Drag | MouseMode::Motion) {
        w.write_all(b"\x1b[?1002h")?;
    }
    if mode == MouseMode::Motion {
        w.write_all(b"\x1b[?1003h")?;
    }
    w.write_all(b"\x1b[?1006h")
}

/// Disable all mouse tracking.
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l")
}

// ─── Restore ─────────────────────────────────────────────────────────────────

/// Everything needed to hand the screen back, as one constant so it can
/// be written from a panic hook or `atexit` without allocating.
///
/// End synchronized output, stop mouse reporting, normal keypad, reset
/// SGR, show the cursor, and leave the alternate screen last so the shell
/// content reappears with no artifacts.
#[rustfmt::skip]
pub const RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l\
    \x1b[?1l\x1b>\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

// ─── Tests ───────────────────────────────────────────────────────────────────
