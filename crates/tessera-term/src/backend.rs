// SPDX-License-Identifier: MIT
//
// The physical terminal seam.
//
// Everything above this trait (allocator, attribute resolution, cell
// writer, input decoding) is terminal-agnostic. Everything below it
// (termios, escape sequences, poll) lives in one implementation,
// `AnsiBackend`. Tests plug in a scripted back-end instead.
//
// Drawing calls are buffered by the implementation and only reach the
// screen on `refresh`. Input is delivered as `RawEvent`s: a character, a
// raw key code, or a mouse report. Turning those into application events
// is the input decoder's job, not the back-end's.

use std::time::Duration;

use crate::attr::Style;
use crate::error::Result;
use crate::keycode::KeyCode;
use crate::palette::ColorTable;

/// What the terminal can render, negotiated at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Programmable colours are in use.
    pub colour: bool,
    /// Real italics (SGR 3) render as italics.
    pub italics: bool,
    /// Wheel movements are reported (as buttons 4 and 5).
    pub mouse_wheel: bool,
}

/// Screen size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

// ─── Raw input ──────────────────────────────────────────────────────────────

/// One undecoded input event as the terminal reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// A character, including control characters (Ctrl-A arrives as
    /// `'\x01'`, Escape as `'\x1b'`).
    Char(char),
    /// A non-character key.
    Key(KeyCode),
    /// A mouse report.
    Mouse(MouseReport),
}

/// A mouse report at a 0-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseReport {
    pub x: u16,
    pub y: u16,
    pub kind: MouseReportKind,
}

/// What happened in a mouse report.
///
/// Buttons are numbered 1–5 the way X11 numbers them: 1 left, 2 middle,
/// 3 right, 4 wheel up, 5 wheel down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseReportKind {
    Pressed(u8),
    Released(u8),
    /// Pointer motion, with or without a button held.
    Moved,
}

// ─── Backend ────────────────────────────────────────────────────────────────

/// A character-cell terminal.
pub trait Backend: ColorTable {
    /// Enter full-screen mode and report what the terminal can do.
    ///
    /// # Errors
    ///
    /// Fails when the terminal cannot be driven at all.
    fn start(&mut self) -> Result<Capabilities>;

    /// Leave full-screen mode, restoring the terminal as it was.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from writing the restore sequence.
    fn stop(&mut self) -> Result<()>;

    /// Current screen size.
    fn size(&self) -> Size;

    /// Style for subsequent `put_str` calls.
    fn set_style(&mut self, style: Style);

    /// Draw `text` starting at cell `(x, y)`.
    fn put_str(&mut self, x: u16, y: u16, text: &str);

    /// Place the hardware cursor.
    fn move_cursor(&mut self, x: u16, y: u16);

    /// Show or hide the hardware cursor.
    fn set_cursor_visible(&mut self, visible: bool);

    /// Push everything buffered so far to the screen.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from the write.
    fn refresh(&mut self) -> Result<()>;

    /// Wait up to `timeout` (forever if `None`) for one input event.
    /// `Ok(None)` means the timeout elapsed.
    ///
    /// # Errors
    ///
    /// Returns I/O errors, or [`Error::InputClosed`](crate::Error::InputClosed)
    /// at end of input.
    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<RawEvent>>;

    /// The terminfo-style capability name of a key code, if it has one.
    fn key_capability_name(&self, code: KeyCode) -> Option<String> {
        crate::keycode::capability_name(code)
    }
}
