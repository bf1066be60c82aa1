// SPDX-License-Identifier: MIT
//
// The display session — everything an application talks to.
//
// `Display` owns the back-end and the session state that sits on top of
// it: the colour palette, the attribute state machine, the logical
// cursor, the cell writer's Unicode mode, and the input decoder. There
// are no globals; two displays over two back-ends are independent.
//
// Drawing is buffered by the back-end. The logical cursor is only pushed
// to the terminal by `sync`, which `next_event` also does before it
// blocks, so the user always sees the cursor where the application put
// it while waiting for input.
//
// Lifecycle:
//
//   new ──▶ start ──▶ (draw / sync / next_event)* ──▶ shutdown ──▶ start ...
//
// `shutdown` is idempotent and also runs on drop.

use std::time::Duration;

use tracing::{debug, warn};

use crate::attr::{AttrState, DisplayAttr, RenderCaps};
use crate::backend::{Backend, Capabilities, Size};
use crate::color::Rgb;
use crate::config::DisplayConfig;
use crate::decoder::{InputDecoder, InputEvent};
use crate::error::{Error, Result};
use crate::metrics;
use crate::palette::Palette;
use crate::writer::CellWriter;

/// Logical cursor: where the application wants it, not where the
/// terminal has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub x: u16,
    pub y: u16,
    pub visible: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            visible: true,
        }
    }
}

/// A character-cell display session over back-end `B`.
///
/// ```no_run
/// use tessera_term::{AnsiBackend, Display, DisplayConfig, InputEvent};
///
/// let config = DisplayConfig::from_args(std::env::args().skip(1));
/// let mut display = Display::new(AnsiBackend::new(&config), config);
/// display.start()?;
/// display.write_text(0, 0, "press any key");
/// let event = display.next_event(None)?;
/// display.shutdown()?;
/// # let _ = event;
/// # Ok::<(), tessera_term::Error>(())
/// ```
pub struct Display<B: Backend> {
    backend: B,
    config: DisplayConfig,
    caps: Capabilities,
    palette: Palette,
    attrs: AttrState,
    cursor: CursorState,
    writer: CellWriter,
    decoder: InputDecoder,
    started: bool,
}

impl<B: Backend> Display<B> {
    /// A display over `backend`. Nothing happens on screen until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(backend: B, config: DisplayConfig) -> Self {
        let decoder = InputDecoder::new(config.mouse_bindings);
        Self {
            backend,
            config,
            caps: Capabilities::default(),
            palette: Palette::new(),
            attrs: AttrState::new(),
            cursor: CursorState::default(),
            writer: CellWriter::default(),
            decoder,
            started: false,
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Take over the terminal. Starting a running session does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedTerminal`] if the terminal cannot be driven,
    /// or an I/O error from the back-end.
    pub fn start(&mut self) -> Result<Capabilities> {
        if self.started {
            return Ok(self.caps);
        }

        let mut caps = self.backend.start()?;
        caps.colour &= self.config.colour;
        self.caps = caps;

        self.palette.clear();
        self.attrs.reset();
        self.cursor = CursorState::default();
        self.decoder.reset();
        self.started = true;
        self.apply_attributes();

        debug!(?caps, "display session started");
        Ok(caps)
    }

    /// Hand the terminal back. Safe to call repeatedly; if the back-end
    /// fails to stop, the session stays open and can be shut down again.
    ///
    /// # Errors
    ///
    /// Returns back-end I/O errors from restoring the terminal.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        self.backend.stop()?;
        self.started = false;
        self.palette.clear();
        debug!("display session stopped");
        Ok(())
    }

    /// Whether a session is running.
    #[inline]
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Negotiated capabilities (all off before `start`).
    #[inline]
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// The back-end.
    #[inline]
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The back-end, mutably. Drawing through it bypasses the session.
    #[inline]
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The colour palette.
    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    // ── Drawing ─────────────────────────────────────────────────────

    /// Blank the whole screen with the current attributes.
    pub fn clear_screen(&mut self) {
        let Size { cols, rows } = self.backend.size();
        if cols > 0 && rows > 0 {
            self.clear_region(0, 0, cols - 1, rows - 1);
        }
    }

    /// Blank the inclusive rectangle `(x1, y1)`–`(x2, y2)`.
    pub fn clear_region(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) {
        self.writer.clear_region(&mut self.backend, x1, y1, x2, y2);
    }

    /// Draw `text` at `(x, y)`; returns the column after it.
    pub fn write_text(&mut self, x: u16, y: u16, text: &str) -> u16 {
        self.writer.write_text(&mut self.backend, x, y, text)
    }

    /// Draw one code point at `(x, y)`.
    pub fn write_codepoint(&mut self, x: u16, y: u16, cp: u32) {
        self.writer.write_codepoint(&mut self.backend, x, y, cp);
    }

    // ── Cursor ──────────────────────────────────────────────────────

    /// Place and show or hide the cursor at the next sync.
    pub const fn set_cursor(&mut self, x: u16, y: u16, visible: bool) {
        self.cursor = CursorState { x, y, visible };
    }

    pub const fn goto(&mut self, x: u16, y: u16) {
        self.cursor.x = x;
        self.cursor.y = y;
    }

    pub const fn show_cursor(&mut self) {
        self.cursor.visible = true;
    }

    pub const fn hide_cursor(&mut self) {
        self.cursor.visible = false;
    }

    /// The logical cursor.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Push the cursor and everything drawn so far to the screen.
    ///
    /// # Errors
    ///
    /// [`Error::NotStarted`] before `start`, or a back-end I/O error.
    pub fn sync(&mut self) -> Result<()> {
        if !self.started {
            return Err(Error::NotStarted);
        }
        let CursorState { x, y, visible } = self.cursor;
        self.backend.move_cursor(x, y);
        self.backend.set_cursor_visible(visible);
        self.backend.refresh()
    }

    // ── Attributes & colour ─────────────────────────────────────────

    /// Masked update of the attribute flags, `attrs = (attrs & and) | or`,
    /// then re-apply.
    pub fn set_attribute_flags(&mut self, and: DisplayAttr, or: DisplayAttr) {
        self.attrs.update(and, or);
        self.apply_attributes();
    }

    /// Turn `attr` on, leaving the others alone.
    pub fn add_attributes(&mut self, attr: DisplayAttr) {
        self.set_attribute_flags(DisplayAttr::all(), attr);
    }

    /// Turn `attr` off, leaving the others alone.
    pub fn remove_attributes(&mut self, attr: DisplayAttr) {
        self.set_attribute_flags(!attr, DisplayAttr::empty());
    }

    /// Current logical attribute flags.
    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> DisplayAttr {
        self.attrs.attrs()
    }

    /// Draw subsequent text as `fg` on `bg`. Ignored when colour is off.
    pub fn set_color(&mut self, fg: Rgb, bg: Rgb) {
        if !self.caps.colour {
            return;
        }
        let pair = self.palette.acquire_pair(&mut self.backend, fg, bg);
        self.attrs.select_pair(pair);
        self.apply_attributes();
    }

    /// Clear every attribute flag. The selected colour pair is kept.
    pub fn reset_attributes(&mut self) {
        self.set_attribute_flags(DisplayAttr::empty(), DisplayAttr::empty());
    }

    fn apply_attributes(&mut self) {
        let caps = RenderCaps {
            colour: self.caps.colour,
            italics: self.caps.italics,
        };
        self.backend.set_style(self.attrs.resolve(caps));
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Screen size in cells.
    #[must_use]
    pub fn screen_size(&self) -> Size {
        self.backend.size()
    }

    /// Column width of `text`.
    #[must_use]
    pub fn display_width(&self, text: &str) -> usize {
        metrics::display_width(text)
    }

    /// The longest prefix of `text` that fits in `columns`.
    #[must_use]
    pub fn truncate_to_width<'a>(&self, text: &'a str, columns: usize) -> &'a str {
        metrics::truncate_to_width(text, columns)
    }

    /// UTF-8 length of code point `cp`.
    #[must_use]
    pub const fn bytes_of_character(&self, cp: u32) -> usize {
        metrics::bytes_of_character(cp)
    }

    /// Whether code points above Latin-1 are drawn as themselves.
    #[must_use]
    pub const fn unicode(&self) -> bool {
        self.writer.unicode()
    }

    pub const fn set_unicode(&mut self, enabled: bool) {
        self.writer.set_unicode(enabled);
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Sync, then wait up to `timeout` (forever if `None`) for the next
    /// meaningful input event.
    ///
    /// # Errors
    ///
    /// [`Error::NotStarted`] before `start`, [`Error::InputClosed`] at end
    /// of input, or a back-end I/O error.
    pub fn next_event(&mut self, timeout: Option<Duration>) -> Result<InputEvent> {
        self.sync()?;
        self.decoder.next_event(&mut self.backend, timeout)
    }
}

impl<B: Backend> Drop for Display<B> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(%err, "display shutdown failed");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
