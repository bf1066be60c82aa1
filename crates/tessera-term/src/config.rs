// SPDX-License-Identifier: MIT
//
// Display configuration, read once from the command line.
//
// The display layer shares argv with its host application, so unknown
// arguments are ignored rather than rejected. Scanning stops at `--`.
//
// | Flag                   | Effect                                    |
// |------------------------|-------------------------------------------|
// | `--no-colour`          | Disable colour negotiation                |
// | `--no-color`           | Same                                      |
// | `--no-mouse`           | Do not enable mouse tracking              |
// | `--escape-delay=MS`    | How long a lone ESC waits (default 30 ms) |

use std::time::Duration;

use crate::ansi::MouseMode;
use crate::mouse::MouseBindings;

/// Default wait for the rest of an escape sequence.
pub const DEFAULT_ESCAPE_DELAY: Duration = Duration::from_millis(30);

/// Session settings for a [`Display`](crate::Display) and its back-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Negotiate colour with the terminal. When `false`, everything is
    /// drawn in the terminal's default colours.
    pub colour: bool,
    /// How long a lone ESC waits for the rest of a sequence before it is
    /// reported as the Escape key.
    pub escape_delay: Duration,
    /// Mouse tracking granularity.
    pub mouse: MouseMode,
    /// Keys produced by the secondary mouse buttons.
    pub mouse_bindings: MouseBindings,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colour: true,
            escape_delay: DEFAULT_ESCAPE_DELAY,
            mouse: MouseMode::default(),
            mouse_bindings: MouseBindings::default(),
        }
    }
}

impl DisplayConfig {
    /// Build a configuration from command-line arguments.
    ///
    /// Pass the arguments without the program name.
    ///
    /// ```
    /// use tessera_term::DisplayConfig;
    ///
    /// let cfg = DisplayConfig::from_args(["notes.txt", "--no-colour"]);
    /// assert!(!cfg.colour);
    /// ```
    #[must_use]
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg = Self::default();
        for arg in args {
            match arg.as_ref() {
                "--" => break,
                "--no-colour" | "--no-color" => cfg.colour = false,
                "--no-mouse" => cfg.mouse = MouseMode::Off,
                other => {
                    if let Some(ms) = other
                        .strip_prefix("--escape-delay=")
                        .and_then(|v| v.parse::<u64>().ok())
                    {
                        cfg.escape_delay = Duration::from_millis(ms);
                    }
                }
            }
        }
        cfg
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cfg = DisplayConfig::default();
        assert!(cfg.colour);
        assert_eq!(cfg.escape_delay, Duration::from_millis(30));
        assert_eq!(cfg.mouse, MouseMode::Motion);
    }

    #[test]
    fn no_args_is_default() {
        let cfg = DisplayConfig::from_args(std::iter::empty::<&str>());
        assert_eq!(cfg, DisplayConfig::default());
    }

    #[test]
    fn both_spellings_disable_colour() {
        assert!(!DisplayConfig::from_args(["--no-colour"]).colour);
        assert!(!DisplayConfig::from_args(["--no-color"]).colour);
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        let cfg = DisplayConfig::from_args(["-x", "file.txt", "--verbose"]);
        assert_eq!(cfg, DisplayConfig::default());
    }

    #[test]
    fn double_dash_stops_scanning() {
        let cfg = DisplayConfig::from_args(["--", "--no-colour"]);
        assert!(cfg.colour);
    }

    #[test]
    fn no_mouse() {
        let cfg = DisplayConfig::from_args(["--no-mouse"]);
        assert_eq!(cfg.mouse, MouseMode::Off);
    }

    #[test]
    fn escape_delay() {
        let cfg = DisplayConfig::from_args(["--escape-delay=100"]);
        assert_eq!(cfg.escape_delay, Duration::from_millis(100));

        let bad = DisplayConfig::from_args(["--escape-delay=soon"]);
        assert_eq!(bad.escape_delay, DEFAULT_ESCAPE_DELAY);
    }

    #[test]
    fn accepts_owned_strings() {
        let args = vec![String::from("--no-color")];
        assert!(!DisplayConfig::from_args(args).colour);
    }
}
