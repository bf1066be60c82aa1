// SPDX-License-Identifier: MIT
//
// Cell writer — code points and blank rectangles onto the grid.
//
// Everything is drawn through the back-end's current style; this module
// never changes it. Coordinates are 0-based and are not clipped: callers
// query the screen size first.
//
// With Unicode output off, code points above Latin-1 are drawn as `?`.
// Control characters have no cell of their own and are never sent to
// the terminal, where they would move the cursor behind our back.

use crate::backend::Backend;
use crate::metrics::{char_width, is_control};

/// Drawn in place of anything the terminal cannot show.
const REPLACEMENT: char = '?';

/// Highest code point drawn as itself when Unicode output is off.
const LATIN1_MAX: u32 = 0xFF;

/// Draws text and blanks with the back-end's current style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWriter {
    unicode: bool,
}

impl Default for CellWriter {
    fn default() -> Self {
        Self { unicode: true }
    }
}

impl CellWriter {
    #[must_use]
    pub const fn new(unicode: bool) -> Self {
        Self { unicode }
    }

    /// Whether code points above Latin-1 are drawn as themselves.
    #[inline]
    #[must_use]
    pub const fn unicode(&self) -> bool {
        self.unicode
    }

    pub const fn set_unicode(&mut self, enabled: bool) {
        self.unicode = enabled;
    }

    /// The character actually drawn for code point `cp`.
    #[must_use]
    pub fn glyph(&self, cp: u32) -> char {
        if !self.unicode && cp > LATIN1_MAX {
            return REPLACEMENT;
        }
        char::from_u32(cp).unwrap_or(REPLACEMENT)
    }

    /// Draw one code point at `(x, y)`.
    pub fn write_codepoint<B: Backend + ?Sized>(&self, backend: &mut B, x: u16, y: u16, cp: u32) {
        let c = self.glyph(cp);
        if is_control(c) {
            return;
        }
        let mut utf8 = [0u8; 4];
        backend.put_str(x, y, c.encode_utf8(&mut utf8));
    }

    /// Draw `text` starting at `(x, y)` and return the column after it.
    ///
    /// The column advances by each character's display width, so wide
    /// characters take two cells and combining marks none. A substitute
    /// glyph sits in the cells of the character it replaces, so the drawn
    /// line is exactly as wide as `display_width` says.
    pub fn write_text<B: Backend + ?Sized>(&self, backend: &mut B, x: u16, y: u16, text: &str) -> u16 {
        let mut run = String::with_capacity(text.len());
        let mut run_x = x;
        let mut end = x;

        for c in text.chars() {
            if is_control(c) {
                continue;
            }
            let width = cells(c);
            let glyph = self.glyph(u32::from(c));
            if cells(glyph) == width {
                run.push(glyph);
            } else {
                if !run.is_empty() {
                    backend.put_str(run_x, y, &run);
                    run.clear();
                }
                let mut utf8 = [0u8; 4];
                backend.put_str(end, y, glyph.encode_utf8(&mut utf8));
                run_x = end.saturating_add(width);
            }
            end = end.saturating_add(width);
        }

        if !run.is_empty() {
            backend.put_str(run_x, y, &run);
        }
        end
    }

    /// Fill the inclusive rectangle `(x1, y1)`–`(x2, y2)` with blanks.
    /// An inverted rectangle draws nothing.
    pub fn clear_region<B: Backend + ?Sized>(&self, backend: &mut B, x1: u16, y1: u16, x2: u16, y2: u16) {
        if x2 < x1 || y2 < y1 {
            return;
        }
        let blanks = " ".repeat(usize::from(x2 - x1) + 1);
        for y in y1..=y2 {
            backend.put_str(x1, y, &blanks);
        }
    }
}

/// Columns `c` occupies.
fn cells(c: char) -> u16 {
    u16::try_from(char_width(c)).unwrap_or(u16::MAX)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::attr::Style;
    use crate::backend::{Capabilities, RawEvent, Size};
    use crate::color::Rgb;
    use crate::error::Result;
    use crate::metrics::display_width;
    use crate::palette::{ColorSlot, ColorTable, PairId};
    use pretty_assertions::assert_eq;

    /// Records every `put_str`.
    #[derive(Default)]
    struct Recorder {
        puts: Vec<(u16, u16, String)>,
    }

    impl ColorTable for Recorder {
        fn define_color(&mut self, _: ColorSlot, _: Rgb) {}
        fn define_pair(&mut self, _: PairId, _: ColorSlot, _: ColorSlot) {}
    }

    impl Backend for Recorder {
        fn start(&mut self) -> Result<Capabilities> {
            Ok(Capabilities::default())
        }
        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
        fn size(&self) -> Size {
            Size { cols: 80, rows: 24 }
        }
        fn set_style(&mut self, _: Style) {}
        fn put_str(&mut self, x: u16, y: u16, text: &str) {
            self.puts.push((x, y, text.to_owned()));
        }
        fn move_cursor(&mut self, _: u16, _: u16) {}
        fn set_cursor_visible(&mut self, _: bool) {}
        fn refresh(&mut self) -> Result<()> {
            Ok(())
        }
        fn read(&mut self, _: Option<Duration>) -> Result<Option<RawEvent>> {
            Ok(None)
        }
    }

    fn put(x: u16, y: u16, s: &str) -> (u16, u16, String) {
        (x, y, s.to_owned())
    }

    #[test]
    fn codepoint_is_encoded() {
        let mut r = Recorder::default();
        CellWriter::default().write_codepoint(&mut r, 2, 3, 0x4E2D);
        assert_eq!(r.puts, vec![put(2, 3, "中")]);
    }

    #[test]
    fn latin1_survives_without_unicode() {
        let mut r = Recorder::default();
        let w = CellWriter::new(false);
        w.write_codepoint(&mut r, 0, 0, 0xE9);
        w.write_codepoint(&mut r, 1, 0, 0x4E2D);
        assert_eq!(r.puts, vec![put(0, 0, "é"), put(1, 0, "?")]);
    }

    #[test]
    fn invalid_codepoint_is_replaced() {
        let w = CellWriter::default();
        assert_eq!(w.glyph(0xD800), '?');
        assert_eq!(w.glyph(0x11_0000), '?');
    }

    #[test]
    fn control_codepoint_is_not_drawn() {
        let mut r = Recorder::default();
        CellWriter::default().write_codepoint(&mut r, 0, 0, 0x0A);
        assert!(r.puts.is_empty());
    }

    #[test]
    fn text_advances_by_display_width() {
        let mut r = Recorder::default();
        let end = CellWriter::default().write_text(&mut r, 1, 0, "a中e\u{301}");
        assert_eq!(end, 5);
        assert_eq!(r.puts, vec![put(1, 0, "a中e\u{301}")]);
    }

    #[test]
    fn text_skips_control_characters() {
        let mut r = Recorder::default();
        let end = CellWriter::default().write_text(&mut r, 0, 0, "a\tb\x1b[2Jc");
        assert_eq!(end, 6);
        assert_eq!(r.puts, vec![put(0, 0, "ab[2Jc")]);
    }

    #[test]
    fn text_substitutes_without_unicode() {
        let mut r = Recorder::default();
        let end = CellWriter::new(false).write_text(&mut r, 0, 0, "中x");
        assert_eq!(end, 3);
        assert_eq!(end, u16::try_from(display_width("中x")).unwrap());
        assert_eq!(r.puts, vec![put(0, 0, "?"), put(2, 0, "x")]);
    }

    #[test]
    fn substituted_combining_mark_takes_no_column() {
        let mut r = Recorder::default();
        let text = "e\u{301}x";
        let end = CellWriter::new(false).write_text(&mut r, 0, 0, text);
        assert_eq!(end, 2);
        assert_eq!(end, u16::try_from(display_width(text)).unwrap());
        assert_eq!(r.puts, vec![put(0, 0, "e"), put(1, 0, "?"), put(1, 0, "x")]);
    }

    #[test]
    fn narrow_substitute_stays_in_the_run() {
        let mut r = Recorder::default();
        let end = CellWriter::new(false).write_text(&mut r, 1, 0, "aĀb");
        assert_eq!(end, 4);
        assert_eq!(r.puts, vec![put(1, 0, "a?b")]);
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut r = Recorder::default();
        assert_eq!(CellWriter::default().write_text(&mut r, 7, 1, ""), 7);
        assert!(r.puts.is_empty());
    }

    #[test]
    fn clear_region_is_inclusive() {
        let mut r = Recorder::default();
        CellWriter::default().clear_region(&mut r, 2, 1, 4, 2);
        assert_eq!(r.puts, vec![put(2, 1, "   "), put(2, 2, "   ")]);
    }

    #[test]
    fn clear_single_cell() {
        let mut r = Recorder::default();
        CellWriter::default().clear_region(&mut r, 5, 5, 5, 5);
        assert_eq!(r.puts, vec![put(5, 5, " ")]);
    }

    #[test]
    fn inverted_region_is_empty() {
        let mut r = Recorder::default();
        CellWriter::default().clear_region(&mut r, 4, 0, 2, 3);
        CellWriter::default().clear_region(&mut r, 0, 3, 2, 1);
        assert!(r.puts.is_empty());
    }

    #[test]
    fn unicode_toggle() {
        let mut w = CellWriter::default();
        assert!(w.unicode());
        w.set_unicode(false);
        assert!(!w.unicode());
    }
}
