// SPDX-License-Identifier: MIT
//
// Key name decoder — raw key codes to stable symbolic names.
//
// Applications bind to strings like `KEY_LEFT`, `KEY_^S` or `KEY_SA^HOME`
// rather than to whatever integer a given terminal happens to send. The
// decoder is total: every code yields *some* name, because unknown keys
// are an everyday occurrence across terminal vendors.
//
// Resolution order:
//
//   1. Exact match in the special table (arrows, editing keys, Return,
//      Escape, backspace in both of its common encodings, ...).
//   2. Control characters 0–31 → `KEY_^@` … `KEY_^_`.
//   3. Function keys F0–F63 → `KEY_F<n>`.
//   4. The back-end's capability name for the code, split into an
//      alphabetic prefix and a modifier digit:
//        prefix → semantic key   (`kHOM` → HOME)       via `PadKey`
//        digit  → modifier combo (`6`    → shift-ctrl) via `ModifierCombo`
//      composed as `KEY_<combo><key>`, e.g. `kHOM6` → `KEY_S^HOME`.
//   5. Anything else → `KEY_UNKNOWN_<code> (<capability name or ???>)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::keycode::{KeyCode, PadKey};

/// Splits a capability name into its prefix and first digit.
static CAPABILITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([^0-9]*)([0-9])").ok());

// ─── Modifier combinations ──────────────────────────────────────────────────

/// Modifier combination encoded by the xterm parameter digit 3–7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierCombo {
    Alt,
    ShiftAlt,
    Ctrl,
    ShiftCtrl,
    AltCtrl,
}

impl ModifierCombo {
    /// Decode the parameter digit. Plain (1) and shift-only (2) forms
    /// are not modifier combinations and yield `None`.
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            3 => Some(Self::Alt),
            4 => Some(Self::ShiftAlt),
            5 => Some(Self::Ctrl),
            6 => Some(Self::ShiftCtrl),
            7 => Some(Self::AltCtrl),
            _ => None,
        }
    }

    /// Annotation placed between `KEY_` and the key's name.
    #[must_use]
    pub const fn annotation(self) -> &'static str {
        match self {
            Self::Alt => "A",
            Self::ShiftAlt => "SA",
            Self::Ctrl => "^",
            Self::ShiftCtrl => "S^",
            Self::AltCtrl => "A^",
        }
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Names with a fixed code.
fn special(code: KeyCode) -> Option<&'static str> {
    let name = match code {
        // Some misconfigured terminals send DEL for backspace.
        KeyCode(127) | KeyCode::BACKSPACE => "KEY_BACKSPACE",
        KeyCode(13) | KeyCode::ENTER => "KEY_RETURN",
        KeyCode(27) => "KEY_ESCAPE",

        KeyCode::SCROLL_UP => "KEY_SCROLLUP",
        KeyCode::SCROLL_DOWN => "KEY_SCROLLDOWN",
        KeyCode::MENU => "KEY_MENU",
        KeyCode::TIMEOUT => "KEY_TIMEOUT",

        KeyCode::DOWN => "KEY_DOWN",
        KeyCode::UP => "KEY_UP",
        KeyCode::LEFT => "KEY_LEFT",
        KeyCode::RIGHT => "KEY_RIGHT",
        KeyCode::HOME => "KEY_HOME",
        KeyCode::END => "KEY_END",
        KeyCode::DC => "KEY_DELETE",
        KeyCode::IC => "KEY_INSERT",
        KeyCode::NPAGE => "KEY_PGDN",
        KeyCode::PPAGE => "KEY_PGUP",
        KeyCode::STAB => "KEY_STAB",
        KeyCode::CTAB => "KEY_^TAB",
        KeyCode::CATAB => "KEY_^ATAB",
        KeyCode::BTAB => "KEY_BTAB",
        KeyCode::SIC => "KEY_SINSERT",
        KeyCode::SDC => "KEY_SDELETE",
        KeyCode::SHOME => "KEY_SHOME",
        KeyCode::SEND => "KEY_SEND",
        KeyCode::SR => "KEY_SUP",
        KeyCode::SF => "KEY_SDOWN",
        KeyCode::SLEFT => "KEY_SLEFT",
        KeyCode::SRIGHT => "KEY_SRIGHT",
        KeyCode::MOUSE => "KEY_MOUSE",
        KeyCode::RESIZE => "KEY_RESIZE",
        _ => return None,
    };
    Some(name)
}

/// Decode a capability name like `kLFT5` into `KEY_^LEFT`.
fn from_capability(name: &str) -> Option<String> {
    let caps = CAPABILITY.as_ref()?.captures(name)?;
    let key = PadKey::from_capability(caps.get(1)?.as_str())?;
    let digit = caps.get(2)?.as_str().bytes().next()? - b'0';
    let combo = ModifierCombo::from_digit(digit)?;
    Some(format!("KEY_{}{}", combo.annotation(), key.label()))
}

/// Symbolic name for `code`.
///
/// `capability` is the back-end's capability name for the code, if it has
/// one; it is only consulted when the code is not recognised by value.
///
/// ```
/// use tessera_term::keycode::{KeyCode, PadKey};
/// use tessera_term::keyname::key_name;
///
/// assert_eq!(key_name(KeyCode::LEFT, None), "KEY_LEFT");
/// assert_eq!(key_name(KeyCode(19), None), "KEY_^S");
/// assert_eq!(key_name(KeyCode::modified(PadKey::Home, 6), Some("kHOM6")), "KEY_S^HOME");
/// assert_eq!(key_name(KeyCode(4000), None), "KEY_UNKNOWN_4000 (???)");
/// ```
#[must_use]
pub fn key_name(code: KeyCode, capability: Option<&str>) -> String {
    if let Some(name) = special(code) {
        return name.to_owned();
    }

    if let Ok(c @ 0..32) = u8::try_from(code.0) {
        return format!("KEY_^{}", char::from(c + b'@'));
    }

    if let Some(n) = code.f_number() {
        return format!("KEY_F{n}");
    }

    if let Some(name) = capability.and_then(from_capability) {
        return name;
    }

    format!("KEY_UNKNOWN_{} ({})", code.0, capability.unwrap_or("???"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
