// SPDX-License-Identifier: MIT
//
// Colour values — what the application asks for, and what the terminal
// can actually show.
//
// Applications speak in RGB with float channels in 0.0–1.0. Terminals
// speak in SGR: 24-bit `TrueColor` where supported, otherwise an index
// into the xterm-256 palette. `Rgb` is the former; `CellColor` is the
// latter.
//
// Identity of an `Rgb` is by value. Channels are clamped to 0.0–1.0 and
// NaN is flushed to zero on construction, so equality is reflexive.
// Distinct values may still scale to the same terminal colour.

use std::fmt;

// ─── Rgb ────────────────────────────────────────────────────────────────────

/// An sRGB colour with float channels in `0.0..=1.0`.
///
/// # Examples
///
/// ```
/// use tessera_term::color::Rgb;
///
/// let orange = Rgb::new(1.0, 0.5, 0.0);
/// assert_eq!(orange, Rgb::new(1.0, 0.5, 0.0));
/// assert_eq!(Rgb::hex("#ff0000"), Some(Rgb::rgb8(255, 0, 0)));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Rgb {
    r: f32,
    g: f32,
    b: f32,
}

/// Clamp a channel to `0.0..=1.0`, mapping NaN to 0.
#[inline]
fn channel(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    /// White.
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    /// Create from float channels. Out-of-range values are clamped.
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    /// Create from 8-bit channels.
    #[must_use]
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&s[i..=i], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

        match s.len() {
            3 => Some(Self::rgb8(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
            )),
            6 => Some(Self::rgb8(byte(0)?, byte(2)?, byte(4)?)),
            _ => None,
        }
    }

    /// Channels scaled into `0..=max`, the way a terminal colour table
    /// wants them (curses uses 1000, SGR uses 255).
    // Channels are clamped to 0..=1, so the product fits in u16.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn scaled(self, max: u16) -> [u16; 3] {
        let m = f32::from(max);
        [
            (self.r * m).round() as u16,
            (self.g * m).round() as u16,
            (self.b * m).round() as u16,
        ]
    }

    /// 8-bit channels.
    #[allow(clippy::cast_possible_truncation)] // scaled(255) never exceeds 255.
    #[must_use]
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let [r, g, b] = self.scaled(255);
        (r as u8, g as u8, b as u8)
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

// ─── CellColor ──────────────────────────────────────────────────────────────

/// A colour in the form the terminal receives it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// xterm-256 palette index.
    Ansi256(u8),

    /// Terminal default colour (whatever the user's theme says).
    #[default]
    Default,
}

impl CellColor {
    /// Build the terminal colour for `rgb`, downgrading to the nearest
    /// palette entry when `TrueColor` is not available.
    #[must_use]
    pub fn from_rgb(rgb: Rgb, truecolor: bool) -> Self {
        let (r, g, b) = rgb.to_rgb8();
        if truecolor {
            Self::Rgb(r, g, b)
        } else {
            Self::Ansi256(nearest_ansi256(r, g, b))
        }
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

// ─── xterm-256 palette ──────────────────────────────────────────────────────
//
// - Colors 0–15: the standard + bright ANSI colours
// - Colors 16–231: a 6×6×6 RGB cube
// - Colors 232–255: a 24-step grayscale ramp

/// The standard ANSI-16 palette (xterm defaults).
const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Convert an xterm-256 palette index to RGB.
#[must_use]
pub fn ansi256_to_rgb(idx: u8) -> (u8, u8, u8) {
    match idx {
        0..=15 => ANSI16_RGB[idx as usize],
        16..=231 => {
            let idx = idx - 16;
            // The cube steps are 0, 95, 135, 175, 215, 255.
            let level = |i: u8| if i == 0 { 0 } else { 55 + 40 * i };
            (level(idx / 36), level((idx % 36) / 6), level(idx % 6))
        }
        232..=255 => {
            let v = 8 + 10 * (idx - 232);
            (v, v, v)
        }
    }
}

/// Nearest xterm-256 index by squared RGB distance.
///
/// Only indices 16–255 are candidates: the first sixteen are commonly
/// re-themed by the user, so they make unreliable targets.
#[must_use]
pub fn nearest_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let dist = |idx: u8| {
        let (pr, pg, pb) = ansi256_to_rgb(idx);
        let dr = i32::from(r) - i32::from(pr);
        let dg = i32::from(g) - i32::from(pg);
        let db = i32::from(b) - i32::from(pb);
        dr * dr + dg * dg + db * db
    };
    (16..=255).min_by_key(|&idx| dist(idx)).unwrap_or(16)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
