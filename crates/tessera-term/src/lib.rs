// SPDX-License-Identifier: MIT
//
// tessera-term — a character-cell display and input layer.
//
// Turns a raw terminal into an addressable grid with one attribute state,
// one colour pair and one cursor, and turns raw terminal input into a
// small vocabulary of events: printable text, named keys (`KEY_LEFT`,
// `KEY_^S`, `KEY_SHOME`), primary-button mouse events with click
// detection, and timeouts.
//
// Layers, leaves first:
//
//   palette  — deduplicating colour and pair allocator
//   attr     — logical attributes resolved against terminal capabilities
//   writer   — code points and blank rectangles
//   decoder  — raw events to application events (with mouse and keyname)
//   metrics  — display width and truncation
//   display  — the session object applications hold
//
// The physical terminal sits behind the `Backend` trait. `AnsiBackend`
// drives a real one with termios and escape sequences; tests drive a
// scripted one.

pub mod ansi;
pub mod attr;
pub mod backend;
pub mod color;
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod input;
pub mod keycode;
pub mod keyname;
pub mod metrics;
pub mod mouse;
pub mod output;
pub mod palette;
pub mod terminal;
pub mod writer;

pub use attr::{DisplayAttr, Style, TermAttr};
pub use backend::{Backend, Capabilities, MouseReport, MouseReportKind, RawEvent, Size};
pub use color::Rgb;
pub use config::DisplayConfig;
pub use decoder::{InputDecoder, InputEvent};
pub use display::{CursorState, Display};
pub use error::{Error, Result};
pub use keycode::KeyCode;
pub use keyname::key_name;
pub use mouse::{MouseBindings, MouseEvent};
pub use palette::{ColorSlot, ColorTable, PairId};
pub use terminal::AnsiBackend;
