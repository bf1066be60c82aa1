// SPDX-License-Identifier: MIT
//
// Attribute state machine.
//
// The application sets *logical* attributes (bold, underline, reverse,
// dim, bright, italic) with masked updates: `attrs = (attrs & and) | or`.
// After every change the logical state is resolved into the *physical*
// style the terminal receives, which depends on what the terminal can
// do:
//
//   ITALIC     → italic if the terminal has it, bold otherwise
//   BOLD       → bold
//   BRIGHT/DIM → bold/dim, but only when colour is off (with colour on,
//                brightness is already baked into the RGB values)
//   UNDERLINE  → underline
//   REVERSE    → reverse
//
// With colour on, the selected pair travels with the attribute bits;
// with colour off the pair is always the neutral one.
//
// Resolution is a pure function of (logical state, capabilities), so
// applying the same state twice produces the same style.

use bitflags::bitflags;

use crate::palette::PairId;

bitflags! {
    /// Logical text attributes, as the application sees them.
    ///
    /// ```
    /// use tessera_term::attr::DisplayAttr;
    ///
    /// let a = DisplayAttr::BOLD | DisplayAttr::ITALIC;
    /// assert!(a.contains(DisplayAttr::BOLD));
    /// assert!(!a.contains(DisplayAttr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct DisplayAttr: u8 {
        const BOLD      = 1 << 0;
        const UNDERLINE = 1 << 1;
        const REVERSE   = 1 << 2;
        const DIM       = 1 << 3;
        const BRIGHT    = 1 << 4;
        const ITALIC    = 1 << 5;
    }
}

bitflags! {
    /// Physical attributes, mapping one-to-one onto SGR parameters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct TermAttr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2 — decreased intensity.
        const DIM       = 1 << 1;
        /// SGR 3 — italic.
        const ITALIC    = 1 << 2;
        /// SGR 4 — underline.
        const UNDERLINE = 1 << 3;
        /// SGR 7 — swap foreground and background.
        const REVERSE   = 1 << 4;
    }
}

/// The resolved style handed to the terminal: attribute bits plus a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub attr: TermAttr,
    pub pair: PairId,
}

/// The subset of terminal capabilities that affect attribute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderCaps {
    /// Colour pairs are in use.
    pub colour: bool,
    /// The terminal renders real italics.
    pub italics: bool,
}

/// The live logical attribute state: flags plus the selected colour pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrState {
    attrs: DisplayAttr,
    pair: PairId,
}

impl AttrState {
    /// Default state: no attributes, neutral pair.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attrs: DisplayAttr::empty(),
            pair: PairId::NONE,
        }
    }

    /// Current logical flags.
    #[inline]
    #[must_use]
    pub const fn attrs(&self) -> DisplayAttr {
        self.attrs
    }

    /// Currently selected pair.
    #[inline]
    #[must_use]
    pub const fn pair(&self) -> PairId {
        self.pair
    }

    /// Masked update: `attrs = (attrs & and) | or`.
    pub fn update(&mut self, and: DisplayAttr, or: DisplayAttr) {
        self.attrs = (self.attrs & and) | or;
    }

    /// Select the pair subsequent text is drawn in.
    pub const fn select_pair(&mut self, pair: PairId) {
        self.pair = pair;
    }

    /// Back to defaults (used at session start).
    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    /// Resolve into the physical style for a terminal with `caps`.
    #[must_use]
    pub fn resolve(&self, caps: RenderCaps) -> Style {
        let a = self.attrs;
        let mut attr = TermAttr::empty();

        if a.contains(DisplayAttr::ITALIC) {
            attr |= if caps.italics {
                TermAttr::ITALIC
            } else {
                TermAttr::BOLD
            };
        }
        if a.contains(DisplayAttr::BOLD) {
            attr |= TermAttr::BOLD;
        }
        if !caps.colour && a.contains(DisplayAttr::BRIGHT) {
            attr |= TermAttr::BOLD;
        }
        if !caps.colour && a.contains(DisplayAttr::DIM) {
            attr |= TermAttr::DIM;
        }
        if a.contains(DisplayAttr::UNDERLINE) {
            attr |= TermAttr::UNDERLINE;
        }
        if a.contains(DisplayAttr::REVERSE) {
            attr |= TermAttr::REVERSE;
        }

        let pair = if caps.colour { self.pair } else { PairId::NONE };
        Style { attr, pair }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
