// SPDX-License-Identifier: MIT
//
// Output buffering and stateful pen tracking.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer — accumulates all ANSI bytes in memory so a whole refresh
//   is written in a single write() syscall.
//
//   Pen — remembers where the terminal's cursor is and which SGR state it
//   last received, and skips sequences that would change nothing. Text
//   drawn left to right in one style is a single cursor move, a single
//   SGR sequence, and the characters.
//
// The pen's idea of the cursor is advanced by the display width of each
// string written. That matches the terminal only when the text has no
// control characters, which the cell writer guarantees.

use std::io::{self, Write};

use crate::ansi;
use crate::attr::TermAttr;
use crate::color::CellColor;
use crate::metrics::display_width;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 16 KB, enough for a full refresh of a large screen
/// without reallocation.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append UTF-8 text verbatim.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w`, flush it, and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails; the bytes stay buffered.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing is `flush_to`.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Pen ─────────────────────────────────────────────────────────────────────

/// The SGR state a terminal has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sgr {
    pub attr: TermAttr,
    pub fg: CellColor,
    pub bg: CellColor,
}

impl Sgr {
    /// Terminal defaults.
    pub const PLAIN: Self = Self {
        attr: TermAttr::empty(),
        fg: CellColor::Default,
        bg: CellColor::Default,
    };
}

/// What the terminal is believed to hold: cursor position and SGR state.
///
/// `None` means unknown, so the next request always emits.
#[derive(Debug, Clone, Default)]
pub struct Pen {
    at: Option<(u32, u16)>,
    sgr: Option<Sgr>,
}

impl Pen {
    /// A pen that knows nothing about the terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self { at: None, sgr: None }
    }

    /// Forget everything. Call after anything that moves the cursor or
    /// changes SGR behind the pen's back (screen clear, reset, resize).
    pub const fn invalidate(&mut self) {
        self.at = None;
        self.sgr = None;
    }

    /// Position the cursor, unless it is already there.
    pub fn move_to(&mut self, out: &mut OutputBuffer, x: u16, y: u16) {
        if self.at != Some((u32::from(x), y)) {
            ansi::cursor_to(out, x, y).ok();
            self.at = Some((u32::from(x), y));
        }
    }

    /// Switch SGR state, unless the terminal already has it.
    pub fn apply(&mut self, out: &mut OutputBuffer, sgr: Sgr) {
        if self.sgr != Some(sgr) {
            ansi::style(out, sgr.attr, sgr.fg, sgr.bg).ok();
            self.sgr = Some(sgr);
        }
    }

    /// Write text at the current position and advance past it.
    pub fn text(&mut self, out: &mut OutputBuffer, s: &str) {
        out.push_str(s);
        if let Some((x, _)) = self.at.as_mut() {
            *x = x.saturating_add(u32::try_from(display_width(s)).unwrap_or(u32::MAX));
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
