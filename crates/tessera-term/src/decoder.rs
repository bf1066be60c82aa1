// SPDX-License-Identifier: MIT
//
// Input decoder — raw terminal events to application events.
//
// One call to `next_event` runs the machine from `Idle` until it returns:
//
//   Idle ──(budget left)──▶ Waiting ──(raw event)──▶ Dispatching ──▶ return
//    ▲  └─(budget spent)──▶ Timeout     └─(read timed out)──▶ Timeout
//    └────────────────(absorbed)────────────────────┘
//
// Absorbed events are the ones that mean nothing on their own: hover
// motion with no button held, zero-width code points, releases of the
// secondary buttons. They send the machine back to `Idle`, which
// recomputes the remaining budget from the wall clock. The budget can
// therefore only shrink, and the loop ends once it reaches zero.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::backend::{Backend, RawEvent};
use crate::error::Result;
use crate::keycode::KeyCode;
use crate::keyname::key_name;
use crate::metrics::{char_width, is_control};
use crate::mouse::{MouseBindings, MouseDecoder, MouseEvent, MouseOutcome};

/// An input event as the application sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A printable character.
    Text(char),
    /// A named key (`KEY_LEFT`, `KEY_^S`, `KEY_RESIZE`, ...).
    Key(String),
    /// Primary-button pointer activity.
    Mouse(MouseEvent),
    /// The requested timeout elapsed with nothing to report.
    Timeout,
}

impl InputEvent {
    /// The key name, if this is a key event.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Key(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Waiting { remaining: Option<Duration> },
    Dispatching(RawEvent),
}

/// Stateful decoder; owns the mouse state that click detection needs.
#[derive(Debug, Default)]
pub struct InputDecoder {
    mouse: MouseDecoder,
}

impl InputDecoder {
    #[must_use]
    pub fn new(bindings: MouseBindings) -> Self {
        Self {
            mouse: MouseDecoder::new(bindings),
        }
    }

    /// Forget mouse state (used at session start).
    pub const fn reset(&mut self) {
        self.mouse.reset();
    }

    /// Read until there is something to report, or `timeout` runs out.
    ///
    /// # Errors
    ///
    /// Propagates back-end read failures.
    pub fn next_event<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        timeout: Option<Duration>,
    ) -> Result<InputEvent> {
        let started = Instant::now();
        let mut phase = Phase::Idle;

        loop {
            phase = match phase {
                Phase::Idle => {
                    let remaining = timeout.map(|t| t.saturating_sub(started.elapsed()));
                    if remaining == Some(Duration::ZERO) {
                        return Ok(InputEvent::Timeout);
                    }
                    Phase::Waiting { remaining }
                }
                Phase::Waiting { remaining } => match backend.read(remaining)? {
                    Some(raw) => Phase::Dispatching(raw),
                    None => return Ok(InputEvent::Timeout),
                },
                Phase::Dispatching(raw) => match self.dispatch(&*backend, raw) {
                    Some(event) => return Ok(event),
                    None => {
                        trace!(?raw, "absorbed input");
                        Phase::Idle
                    }
                },
            };
        }
    }

    /// Classify one raw event. `None` means absorb it.
    fn dispatch<B: Backend + ?Sized>(&mut self, backend: &B, raw: RawEvent) -> Option<InputEvent> {
        match raw {
            RawEvent::Mouse(report) => match self.mouse.decode(report) {
                MouseOutcome::Pointer(m) => Some(InputEvent::Mouse(m)),
                MouseOutcome::Key(code) => Some(Self::key(backend, code)),
                MouseOutcome::Absorbed => None,
            },
            RawEvent::Key(code) => Some(Self::key(backend, code)),
            RawEvent::Char(c) if is_control(c) => Some(Self::key(backend, KeyCode(u32::from(c)))),
            RawEvent::Char(c) if char_width(c) > 0 => Some(InputEvent::Text(c)),
            RawEvent::Char(_) => None,
        }
    }

    fn key<B: Backend + ?Sized>(backend: &B, code: KeyCode) -> InputEvent {
        let capability = backend.key_capability_name(code);
        InputEvent::Key(key_name(code, capability.as_deref()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
