// SPDX-License-Identifier: MIT
//
// Colour allocator — deduplicating colour and pair slots.
//
// A character terminal does not take arbitrary colours per cell. It has a
// small table of colour *slots*, and a second table of *pairs* that each
// name a foreground slot and a background slot. Text is drawn "in pair N".
//
// The allocator hands out slots on demand: the first time an RGB value is
// seen it is appended to the registry and programmed into the terminal's
// table; every later request for the same value returns the same slot.
// Pairs work the same way over (fg slot, bg slot) tuples.
//
// Sessions use a handful of colours, so lookup is a linear scan and slots
// are never evicted. Both tables are cleared (not dropped) on shutdown so
// the session can be started again.

use tracing::debug;

use crate::color::Rgb;

/// First physical slot handed out for colours. Slot 0 is the terminal's
/// own default and is never reprogrammed.
pub const FIRST_COLOR_SLOT: u16 = 1;

/// First physical pair handed out. Pair 0 means "no colour".
pub const FIRST_PAIR: u16 = 1;

// ─── Slot identifiers ───────────────────────────────────────────────────────

/// Physical terminal colour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorSlot(pub u16);

/// Physical terminal colour-pair slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PairId(pub u16);

impl PairId {
    /// The neutral pair: terminal default foreground and background.
    pub const NONE: Self = Self(0);

    /// Whether this is the neutral pair.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

// ─── ColorTable ─────────────────────────────────────────────────────────────

/// The terminal's programmable colour tables.
///
/// Implemented by every [`Backend`](crate::backend::Backend); split out so
/// the allocator only sees the part of the terminal it needs.
pub trait ColorTable {
    /// Program colour slot `slot` with `rgb`. The implementation scales
    /// the channels into whatever range the terminal natively uses.
    fn define_color(&mut self, slot: ColorSlot, rgb: Rgb);

    /// Program pair `pair` as `fg` on `bg`.
    fn define_pair(&mut self, pair: PairId, fg: ColorSlot, bg: ColorSlot);
}

// ─── Palette ────────────────────────────────────────────────────────────────

/// Insertion-ordered, value-deduplicated colour and pair registries.
///
/// Invariants: no two entries of `colors` are equal, no two entries of
/// `pairs` are equal, and index `i` always maps to slot `i + FIRST_*`.
#[derive(Debug, Default)]
pub struct Palette {
    colors: Vec<Rgb>,
    pairs: Vec<(ColorSlot, ColorSlot)>,
}

impl Palette {
    /// An empty palette.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            colors: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Return the slot for `rgb`, programming a new one on first sight.
    pub fn acquire_color(&mut self, table: &mut impl ColorTable, rgb: Rgb) -> ColorSlot {
        if let Some(i) = self.colors.iter().position(|c| *c == rgb) {
            return ColorSlot(slot_at(FIRST_COLOR_SLOT, i).unwrap_or(u16::MAX));
        }

        let slot = ColorSlot(
            slot_at(FIRST_COLOR_SLOT, self.colors.len()).unwrap_or(u16::MAX),
        );
        self.colors.push(rgb);
        table.define_color(slot, rgb);
        debug!(slot = slot.0, color = ?rgb, "allocated colour slot");
        slot
    }

    /// Return the pair for `fg` on `bg`, allocating both colours and the
    /// pair itself on first sight.
    pub fn acquire_pair(&mut self, table: &mut impl ColorTable, fg: Rgb, bg: Rgb) -> PairId {
        let fg = self.acquire_color(table, fg);
        let bg = self.acquire_color(table, bg);

        if let Some(i) = self.pairs.iter().position(|p| *p == (fg, bg)) {
            return PairId(slot_at(FIRST_PAIR, i).unwrap_or(u16::MAX));
        }

        let pair = PairId(slot_at(FIRST_PAIR, self.pairs.len()).unwrap_or(u16::MAX));
        self.pairs.push((fg, bg));
        table.define_pair(pair, fg, bg);
        debug!(pair = pair.0, fg = fg.0, bg = bg.0, "allocated colour pair");
        pair
    }

    /// Number of distinct colours registered.
    #[inline]
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Number of distinct pairs registered.
    #[inline]
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Forget every colour and pair. Capacity is kept for the next session.
    pub fn clear(&mut self) {
        self.colors.clear();
        self.pairs.clear();
    }
}

/// `base + index` as a slot number. Exhausting the slot space is not
/// guarded against; past `u16::MAX` every request shares the last slot.
fn slot_at(base: u16, index: usize) -> Option<u16> {
    u16::try_from(index).ok().and_then(|i| i.checked_add(base))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Records every programming call the allocator makes.
    #[derive(Default)]
    struct RecordingTable {
        colors: Vec<(ColorSlot, Rgb)>,
        pairs: Vec<(PairId, ColorSlot, ColorSlot)>,
    }

    impl ColorTable for RecordingTable {
        fn define_color(&mut self, slot: ColorSlot, rgb: Rgb) {
            self.colors.push((slot, rgb));
        }

        fn define_pair(&mut self, pair: PairId, fg: ColorSlot, bg: ColorSlot) {
            self.pairs.push((pair, fg, bg));
        }
    }

    fn red() -> Rgb {
        Rgb::new(1.0, 0.0, 0.0)
    }

    fn blue() -> Rgb {
        Rgb::new(0.0, 0.0, 1.0)
    }

    #[test]
    fn first_color_gets_first_slot() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        assert_eq!(palette.acquire_color(&mut table, red()), ColorSlot(FIRST_COLOR_SLOT));
    }

    #[test]
    fn same_color_same_slot_programmed_once() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        let a = palette.acquire_color(&mut table, red());
        let b = palette.acquire_color(&mut table, red());
        assert_eq!(a, b);
        assert_eq!(table.colors.len(), 1);
    }

    #[test]
    fn distinct_colors_distinct_slots() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        let a = palette.acquire_color(&mut table, red());
        let b = palette.acquire_color(&mut table, blue());
        assert_ne!(a, b);
        assert_eq!(b, ColorSlot(FIRST_COLOR_SLOT + 1));
    }

    #[test]
    fn pair_programs_colors_then_pair() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        let pair = palette.acquire_pair(&mut table, red(), blue());
        assert_eq!(pair, PairId(FIRST_PAIR));
        assert_eq!(
            table.colors,
            vec![(ColorSlot(1), red()), (ColorSlot(2), blue())]
        );
        assert_eq!(table.pairs, vec![(PairId(1), ColorSlot(1), ColorSlot(2))]);
    }

    #[test]
    fn reversed_pair_is_a_new_pair_sharing_slots() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        let a = palette.acquire_pair(&mut table, red(), blue());
        let b = palette.acquire_pair(&mut table, blue(), red());
        assert_ne!(a, b);
        assert_eq!(palette.color_count(), 2);
        assert_eq!(palette.pair_count(), 2);
    }

    #[test]
    fn repeated_pair_is_stable() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        let a = palette.acquire_pair(&mut table, red(), blue());
        let b = palette.acquire_pair(&mut table, red(), blue());
        assert_eq!(a, b);
        assert_eq!(table.pairs.len(), 1);
    }

    #[test]
    fn clear_allows_reuse_from_the_first_slot() {
        let mut table = RecordingTable::default();
        let mut palette = Palette::new();
        palette.acquire_pair(&mut table, red(), blue());
        palette.clear();
        assert_eq!(palette.color_count(), 0);
        assert_eq!(palette.pair_count(), 0);
        assert_eq!(palette.acquire_color(&mut table, blue()), ColorSlot(1));
    }

    #[test]
    fn pair_none_is_zero() {
        assert!(PairId::NONE.is_none());
        assert!(!PairId(FIRST_PAIR).is_none());
    }

    fn arb_rgb() -> impl Strategy<Value = Rgb> {
        (0u8..4, 0u8..4, 0u8..4).prop_map(|(r, g, b)| Rgb::rgb8(r * 85, g * 85, b * 85))
    }

    proptest! {
        #[test]
        fn slots_match_value_identity(colors in prop::collection::vec(arb_rgb(), 0..40)) {
            let mut table = RecordingTable::default();
            let mut palette = Palette::new();
            let slots: Vec<_> = colors
                .iter()
                .map(|&c| palette.acquire_color(&mut table, c))
                .collect();

            for (i, a) in colors.iter().enumerate() {
                for (j, b) in colors.iter().enumerate() {
                    prop_assert_eq!(a == b, slots[i] == slots[j]);
                }
            }

            let unique = colors
                .iter()
                .enumerate()
                .filter(|(i, c)| !colors[..*i].contains(c))
                .count();
            prop_assert_eq!(palette.color_count(), unique);
            prop_assert_eq!(table.colors.len(), unique);
        }

        #[test]
        fn pairs_match_value_identity(
            pairs in prop::collection::vec((arb_rgb(), arb_rgb()), 0..30)
        ) {
            let mut table = RecordingTable::default();
            let mut palette = Palette::new();
            let ids: Vec<_> = pairs
                .iter()
                .map(|&(fg, bg)| palette.acquire_pair(&mut table, fg, bg))
                .collect();

            for (i, a) in pairs.iter().enumerate() {
                for (j, b) in pairs.iter().enumerate() {
                    prop_assert_eq!(a == b, ids[i] == ids[j]);
                }
            }
        }
    }
}
