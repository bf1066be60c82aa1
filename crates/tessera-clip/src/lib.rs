// SPDX-License-Identifier: MIT
//
// tessera-clip — an in-memory clipboard keyed by format.
//
// The host keeps up to one payload per format: plain text for pasting
// into other places, and the host's own native encoding for lossless
// copy and paste within the application. A copy gesture replaces the
// whole clipboard at once, so stale payloads of another format can never
// be pasted by mistake.
//
// Payloads are stored without a terminating NUL. Callers coming from
// C-string land may hand one in; it is stripped on the way in, whatever
// the format.

use std::collections::BTreeMap;

use tracing::debug;

/// A clipboard format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    /// UTF-8 plain text.
    Text,
    /// The host application's own encoding.
    Native,
}

impl Format {
    /// Numeric format ID as the host's scripting layer knows it.
    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::Text => 1,
            Self::Native => 100,
        }
    }

    /// Look up a numeric format ID.
    #[must_use]
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Text),
            100 => Some(Self::Native),
            _ => None,
        }
    }
}

/// Format-tagged payloads, at most one per format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    data: BTreeMap<Format, Vec<u8>>,
}

impl Clipboard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Drop every payload.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Store `bytes` as the payload for `format`, replacing any previous
    /// one. A single trailing NUL is stripped.
    pub fn set(&mut self, format: Format, bytes: &[u8]) {
        let bytes = bytes.strip_suffix(&[0]).unwrap_or(bytes);
        debug!(format = format.id(), len = bytes.len(), "clipboard set");
        self.data.insert(format, bytes.to_vec());
    }

    /// The payload for `format`, if there is one.
    #[must_use]
    pub fn get(&self, format: Format) -> Option<&[u8]> {
        self.data.get(&format).map(Vec::as_slice)
    }

    /// The text payload, if there is one and it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.get(Format::Text)
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Whether a payload for `format` is present.
    #[must_use]
    pub fn contains(&self, format: Format) -> bool {
        self.data.contains_key(&format)
    }

    /// Length of the payload for `format`; 0 when absent.
    #[must_use]
    pub fn len(&self, format: Format) -> usize {
        self.data.get(&format).map_or(0, Vec::len)
    }

    /// Whether no format has a payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The copy gesture: clear, then store whichever payloads are given.
    pub fn replace(&mut self, text: Option<&[u8]>, native: Option<&[u8]>) {
        self.clear();
        if let Some(text) = text {
            self.set(Format::Text, text);
        }
        if let Some(native) = native {
            self.set(Format::Native, native);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_ids() {
        assert_eq!(Format::Text.id(), 1);
        assert_eq!(Format::Native.id(), 100);
        assert_eq!(Format::from_id(1), Some(Format::Text));
        assert_eq!(Format::from_id(100), Some(Format::Native));
        assert_eq!(Format::from_id(2), None);
    }

    #[test]
    fn new_is_empty() {
        let clip = Clipboard::new();
        assert!(clip.is_empty());
        assert!(!clip.contains(Format::Text));
        assert_eq!(clip.get(Format::Text), None);
        assert_eq!(clip.len(Format::Native), 0);
    }

    #[test]
    fn set_and_get() {
        let mut clip = Clipboard::new();
        clip.set(Format::Native, b"\x01\x02");
        assert!(clip.contains(Format::Native));
        assert_eq!(clip.get(Format::Native), Some(&b"\x01\x02"[..]));
        assert_eq!(clip.len(Format::Native), 2);
        assert!(!clip.contains(Format::Text));
    }

    #[test]
    fn set_replaces_previous_payload() {
        let mut clip = Clipboard::new();
        clip.set(Format::Text, b"one");
        clip.set(Format::Text, b"two");
        assert_eq!(clip.text(), Some("two"));
    }

    #[test]
    fn text_nul_is_stripped() {
        let mut clip = Clipboard::new();
        clip.set(Format::Text, b"hello\0");
        assert_eq!(clip.get(Format::Text), Some(&b"hello"[..]));
        assert_eq!(clip.len(Format::Text), 5);
    }

    #[test]
    fn native_nul_is_stripped() {
        let mut clip = Clipboard::new();
        clip.set(Format::Native, b"x\0");
        assert_eq!(clip.get(Format::Native), Some(&b"x"[..]));
    }

    #[test]
    fn only_one_nul_is_stripped() {
        let mut clip = Clipboard::new();
        clip.set(Format::Native, b"\x01\0\0");
        assert_eq!(clip.get(Format::Native), Some(&b"\x01\0"[..]));
    }

    #[test]
    fn empty_text_is_present() {
        let mut clip = Clipboard::new();
        clip.set(Format::Text, b"");
        assert!(clip.contains(Format::Text));
        assert_eq!(clip.text(), Some(""));
    }

    #[test]
    fn invalid_utf8_has_no_text() {
        let mut clip = Clipboard::new();
        clip.set(Format::Text, b"\xff");
        assert_eq!(clip.text(), None);
        assert!(clip.contains(Format::Text));
    }

    #[test]
    fn replace_drops_stale_formats() {
        let mut clip = Clipboard::new();
        clip.set(Format::Native, b"old");
        clip.replace(Some(&b"new text"[..]), None);
        assert!(!clip.contains(Format::Native));
        assert_eq!(clip.text(), Some("new text"));
    }

    #[test]
    fn replace_stores_both() {
        let mut clip = Clipboard::new();
        clip.replace(Some(&b"t"[..]), Some(&b"n"[..]));
        assert_eq!(clip.get(Format::Text), Some(&b"t"[..]));
        assert_eq!(clip.get(Format::Native), Some(&b"n"[..]));
    }

    #[test]
    fn clear_drops_everything() {
        let mut clip = Clipboard::new();
        clip.replace(Some(&b"t"[..]), Some(&b"n"[..]));
        clip.clear();
        assert!(clip.is_empty());
    }
}
