// SPDX-License-Identifier: MIT
//
// Mouse sub-decoder.
//
// Turns raw mouse reports into what applications want: the primary
// button as a pointer with click detection, and the other buttons as
// synthetic keys. A "click" is the transition from not-pressed to
// pressed; holding the button and dragging reports `clicked = false`.
//
// Which key the middle button, right button and wheel produce is policy,
// not protocol, so it lives in `MouseBindings`. The defaults open a
// context menu on middle or right and scroll on the wheel.

use tracing::trace;

use crate::backend::{MouseReport, MouseReportKind};
use crate::keycode::KeyCode;

/// A decoded pointer event for the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    /// The button is down.
    pub pressed: bool,
    /// The button went down with this event.
    pub clicked: bool,
}

/// Keys synthesised from the secondary buttons. `None` swallows the
/// button entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseBindings {
    pub middle: Option<KeyCode>,
    pub right: Option<KeyCode>,
    pub wheel_up: Option<KeyCode>,
    pub wheel_down: Option<KeyCode>,
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self {
            middle: Some(KeyCode::MENU),
            right: Some(KeyCode::MENU),
            wheel_up: Some(KeyCode::SCROLL_UP),
            wheel_down: Some(KeyCode::SCROLL_DOWN),
        }
    }
}

impl MouseBindings {
    /// The key bound to press of `button` (2–5).
    #[must_use]
    pub const fn key_for(&self, button: u8) -> Option<KeyCode> {
        match button {
            2 => self.middle,
            3 => self.right,
            4 => self.wheel_up,
            5 => self.wheel_down,
            _ => None,
        }
    }
}

/// What a single report decoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseOutcome {
    Pointer(MouseEvent),
    Key(KeyCode),
    /// Nothing worth reporting; the caller reads again.
    Absorbed,
}

/// Last known pointer state, kept across reports.
#[derive(Debug, Clone, Default)]
pub struct MouseDecoder {
    x: u16,
    y: u16,
    pressed: bool,
    /// `pressed` as of the last reported pointer event.
    reported_pressed: bool,
    bindings: MouseBindings,
}

impl MouseDecoder {
    #[must_use]
    pub fn new(bindings: MouseBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// The active bindings.
    #[must_use]
    pub const fn bindings(&self) -> &MouseBindings {
        &self.bindings
    }

    /// Forget the pointer state (used at session start).
    pub const fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
        self.pressed = false;
        self.reported_pressed = false;
    }

    /// Decode one report.
    pub fn decode(&mut self, report: MouseReport) -> MouseOutcome {
        match report.kind {
            MouseReportKind::Pressed(1) => self.pointer(report, true),
            MouseReportKind::Released(1) => self.pointer(report, false),
            MouseReportKind::Moved if self.pressed => self.pointer(report, true),
            MouseReportKind::Moved => {
                trace!(x = report.x, y = report.y, "absorbed hover motion");
                MouseOutcome::Absorbed
            }
            MouseReportKind::Pressed(button) => self
                .bindings
                .key_for(button)
                .map_or(MouseOutcome::Absorbed, MouseOutcome::Key),
            MouseReportKind::Released(_) => MouseOutcome::Absorbed,
        }
    }

    fn pointer(&mut self, report: MouseReport, pressed: bool) -> MouseOutcome {
        self.x = report.x;
        self.y = report.y;
        self.pressed = pressed;

        let clicked = pressed && !self.reported_pressed;
        self.reported_pressed = pressed;
        MouseOutcome::Pointer(MouseEvent {
            x: self.x,
            y: self.y,
            pressed,
            clicked,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(x: u16, y: u16, kind: MouseReportKind) -> MouseReport {
        MouseReport { x, y, kind }
    }

    fn press(x: u16, y: u16) -> MouseReport {
        report(x, y, MouseReportKind::Pressed(1))
    }

    fn release(x: u16, y: u16) -> MouseReport {
        report(x, y, MouseReportKind::Released(1))
    }

    fn pointer(x: u16, y: u16, pressed: bool, clicked: bool) -> MouseOutcome {
        MouseOutcome::Pointer(MouseEvent {
            x,
            y,
            pressed,
            clicked,
        })
    }

    #[test]
    fn press_from_initial_state_is_a_click() {
        let mut m = MouseDecoder::default();
        assert_eq!(m.decode(press(3, 4)), pointer(3, 4, true, true));
    }

    #[test]
    fn press_after_release_is_a_click() {
        let mut m = MouseDecoder::default();
        m.decode(press(1, 1));
        m.decode(release(1, 1));
        assert_eq!(m.decode(press(2, 2)), pointer(2, 2, true, true));
    }

    #[test]
    fn press_while_held_is_not_a_click() {
        let mut m = MouseDecoder::default();
        m.decode(press(1, 1));
        assert_eq!(m.decode(press(1, 2)), pointer(1, 2, true, false));
    }

    #[test]
    fn release_reports_unpressed() {
        let mut m = MouseDecoder::default();
        m.decode(press(3, 4));
        assert_eq!(m.decode(release(3, 4)), pointer(3, 4, false, false));
    }

    #[test]
    fn drag_reports_position_without_click() {
        let mut m = MouseDecoder::default();
        m.decode(press(0, 0));
        let moved = m.decode(report(5, 6, MouseReportKind::Moved));
        assert_eq!(moved, pointer(5, 6, true, false));
    }

    #[test]
    fn hover_is_absorbed() {
        let mut m = MouseDecoder::default();
        let moved = m.decode(report(5, 6, MouseReportKind::Moved));
        assert_eq!(moved, MouseOutcome::Absorbed);
    }

    #[test]
    fn secondary_buttons_use_default_bindings() {
        let mut m = MouseDecoder::default();
        let key = |m: &mut MouseDecoder, b| m.decode(report(0, 0, MouseReportKind::Pressed(b)));
        assert_eq!(key(&mut m, 2), MouseOutcome::Key(KeyCode::MENU));
        assert_eq!(key(&mut m, 3), MouseOutcome::Key(KeyCode::MENU));
        assert_eq!(key(&mut m, 4), MouseOutcome::Key(KeyCode::SCROLL_UP));
        assert_eq!(key(&mut m, 5), MouseOutcome::Key(KeyCode::SCROLL_DOWN));
    }

    #[test]
    fn secondary_releases_are_absorbed() {
        let mut m = MouseDecoder::default();
        for b in 2..=5 {
            let r = report(0, 0, MouseReportKind::Released(b));
            assert_eq!(m.decode(r), MouseOutcome::Absorbed);
        }
    }

    #[test]
    fn unbound_button_is_absorbed() {
        let bindings = MouseBindings {
            right: None,
            ..MouseBindings::default()
        };
        let mut m = MouseDecoder::new(bindings);
        let r = report(0, 0, MouseReportKind::Pressed(3));
        assert_eq!(m.decode(r), MouseOutcome::Absorbed);
    }

    #[test]
    fn custom_binding() {
        let bindings = MouseBindings {
            middle: KeyCode::f(2),
            ..MouseBindings::default()
        };
        let mut m = MouseDecoder::new(bindings);
        let r = report(0, 0, MouseReportKind::Pressed(2));
        assert_eq!(m.decode(r), MouseOutcome::Key(KeyCode::f(2).unwrap()));
    }

    #[test]
    fn secondary_buttons_leave_pointer_state_alone() {
        let mut m = MouseDecoder::default();
        m.decode(press(1, 1));
        m.decode(report(9, 9, MouseReportKind::Pressed(4)));
        assert_eq!(m.decode(press(1, 1)), pointer(1, 1, true, false));
    }

    #[test]
    fn reset_forgets_held_button() {
        let mut m = MouseDecoder::default();
        m.decode(press(1, 1));
        m.reset();
        assert_eq!(m.decode(press(1, 1)), pointer(1, 1, true, true));
    }
}
