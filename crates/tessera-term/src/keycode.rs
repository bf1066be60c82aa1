// SPDX-License-Identifier: MIT
//
// Raw key codes — the integer vocabulary the terminal back-end speaks.
//
// Standard keys use the curses numbering (DOWN = 0o402 … RESIZE = 0o632),
// which every character-terminal program already knows. Control
// characters are their own value (Ctrl-A = 1, ESC = 27, DEL = 127).
// Above the curses range sit a few synthetic codes the input decoder
// injects (timeout, menu, scroll), and then an extended block for
// cursor-pad keys pressed with a modifier combination.
//
// Extended codes carry no meaning of their own: the only way to learn what
// one is, is to ask for its capability name ("kLFT5" = Ctrl+Left in xterm
// terminfo) and decode that. The key-name decoder does exactly that.

use std::fmt;

/// A raw key code as reported by the terminal back-end.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const DOWN: Self = Self(0o402);
    pub const UP: Self = Self(0o403);
    pub const LEFT: Self = Self(0o404);
    pub const RIGHT: Self = Self(0o405);
    pub const HOME: Self = Self(0o406);
    pub const BACKSPACE: Self = Self(0o407);
    /// F0; `F(n)` is `F0 + n` for `n < 64`.
    pub const F0: Self = Self(0o410);
    pub const DC: Self = Self(0o512);
    pub const IC: Self = Self(0o513);
    /// Shift+Down (scroll forward).
    pub const SF: Self = Self(0o520);
    /// Shift+Up (scroll reverse).
    pub const SR: Self = Self(0o521);
    pub const NPAGE: Self = Self(0o522);
    pub const PPAGE: Self = Self(0o523);
    pub const STAB: Self = Self(0o524);
    pub const CTAB: Self = Self(0o525);
    pub const CATAB: Self = Self(0o526);
    /// Keypad Enter.
    pub const ENTER: Self = Self(0o527);
    /// Back-tab (Shift+Tab).
    pub const BTAB: Self = Self(0o541);
    pub const END: Self = Self(0o550);
    pub const SDC: Self = Self(0o577);
    pub const SEND: Self = Self(0o602);
    pub const SHOME: Self = Self(0o607);
    pub const SIC: Self = Self(0o610);
    pub const SLEFT: Self = Self(0o611);
    pub const SRIGHT: Self = Self(0o622);
    pub const MOUSE: Self = Self(0o631);
    pub const RESIZE: Self = Self(0o632);

    // ── Synthetic (above the curses range) ──────────────────────────
    pub const TIMEOUT: Self = Self(0o1000);
    pub const MENU: Self = Self(0o1001);
    pub const SCROLL_UP: Self = Self(0o1002);
    pub const SCROLL_DOWN: Self = Self(0o1003);

    /// Number of function keys in the curses block.
    pub const F_COUNT: u8 = 64;

    /// Function key `n`. `None` past F63.
    #[must_use]
    pub const fn f(n: u8) -> Option<Self> {
        if n < Self::F_COUNT {
            Some(Self(Self::F0.0 + n as u32))
        } else {
            None
        }
    }

    /// The function-key number, if this is one.
    #[allow(clippy::cast_possible_truncation)] // range-checked below 64.
    #[must_use]
    pub const fn f_number(self) -> Option<u8> {
        if self.0 >= Self::F0.0 && self.0 < Self::F0.0 + Self::F_COUNT as u32 {
            Some((self.0 - Self::F0.0) as u8)
        } else {
            None
        }
    }

    /// A cursor-pad key pressed with xterm modifier parameter `param`
    /// (`1 + bitmask` of shift=1, alt=2, ctrl=4).
    #[must_use]
    pub const fn modified(key: PadKey, param: u8) -> Self {
        Self(EXTENDED_BASE + key as u32 * EXTENDED_STRIDE + (param as u32 % EXTENDED_STRIDE))
    }
}

impl fmt::Debug for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyCode({:#o})", self.0)
    }
}

// ─── Extended cursor-pad keys ───────────────────────────────────────────────

/// Start of the extended (modifier-qualified) block.
const EXTENDED_BASE: u32 = 0o2000;
/// Codes reserved per pad key; indexed by modifier parameter.
const EXTENDED_STRIDE: u32 = 16;

/// Cursor-pad keys that xterm reports with a modifier parameter.
///
/// Each carries the terminfo capability prefix for its modified forms
/// (`kLFT3` … `kLFT7`) and the semantic name applications bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PadKey {
    Delete,
    Down,
    End,
    Home,
    Insert,
    Left,
    PageDown,
    PageUp,
    Right,
    Up,
}

impl PadKey {
    pub const ALL: [Self; 10] = [
        Self::Delete,
        Self::Down,
        Self::End,
        Self::Home,
        Self::Insert,
        Self::Left,
        Self::PageDown,
        Self::PageUp,
        Self::Right,
        Self::Up,
    ];

    /// Terminfo capability prefix of the modified forms.
    #[must_use]
    pub const fn capability(self) -> &'static str {
        match self {
            Self::Delete => "kDC",
            Self::Down => "kDN",
            Self::End => "kEND",
            Self::Home => "kHOM",
            Self::Insert => "kIC",
            Self::Left => "kLFT",
            Self::PageDown => "kNXT",
            Self::PageUp => "kPRV",
            Self::Right => "kRIT",
            Self::Up => "kUP",
        }
    }

    /// Name used in symbolic key names (`KEY_^LEFT`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Down => "DOWN",
            Self::End => "END",
            Self::Home => "HOME",
            Self::Insert => "INSERT",
            Self::Left => "LEFT",
            Self::PageDown => "PGDN",
            Self::PageUp => "PGUP",
            Self::Right => "RIGHT",
            Self::Up => "UP",
        }
    }

    /// The unmodified key's code.
    #[must_use]
    pub const fn code(self) -> KeyCode {
        match self {
            Self::Delete => KeyCode::DC,
            Self::Down => KeyCode::DOWN,
            Self::End => KeyCode::END,
            Self::Home => KeyCode::HOME,
            Self::Insert => KeyCode::IC,
            Self::Left => KeyCode::LEFT,
            Self::PageDown => KeyCode::NPAGE,
            Self::PageUp => KeyCode::PPAGE,
            Self::Right => KeyCode::RIGHT,
            Self::Up => KeyCode::UP,
        }
    }

    /// The standard shifted code, for keys curses has one for.
    #[must_use]
    pub const fn shifted(self) -> Option<KeyCode> {
        match self {
            Self::Delete => Some(KeyCode::SDC),
            Self::Down => Some(KeyCode::SF),
            Self::End => Some(KeyCode::SEND),
            Self::Home => Some(KeyCode::SHOME),
            Self::Insert => Some(KeyCode::SIC),
            Self::Left => Some(KeyCode::SLEFT),
            Self::Right => Some(KeyCode::SRIGHT),
            Self::Up => Some(KeyCode::SR),
            Self::PageDown | Self::PageUp => None,
        }
    }

    /// Look up a capability prefix.
    #[must_use]
    pub fn from_capability(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.capability() == prefix)
    }
}

/// The terminfo-style capability name of `code`, where one exists.
///
/// Only the extended block has names (`kLFT5`); standard codes are
/// recognised by value before anyone needs to ask.
#[must_use]
pub fn capability_name(code: KeyCode) -> Option<String> {
    let offset = code.0.checked_sub(EXTENDED_BASE)?;
    let key = usize::try_from(offset / EXTENDED_STRIDE).ok()?;
    let param = offset % EXTENDED_STRIDE;
    PadKey::ALL
        .get(key)
        .map(|k| format!("{}{param}", k.capability()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
