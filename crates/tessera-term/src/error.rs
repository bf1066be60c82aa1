// SPDX-License-Identifier: MIT
//
// Error types for the display layer.
//
// Unusual terminals are the normal case here. Missing colours, missing
// italics and unknown key codes degrade silently. What remains are I/O
// failures and the one fatal condition: a terminal we cannot drive at
// all.

use std::io;

use thiserror::Error;

/// Display layer error type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while talking to the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal type cannot be driven (e.g. `TERM` unset or `dumb`).
    #[error("unsupported terminal: {0}")]
    UnsupportedTerminal(String),

    /// A session operation was attempted before `start()`.
    #[error("display session has not been started")]
    NotStarted,

    /// Standard input reached end-of-file; no further events will arrive.
    #[error("terminal input closed")]
    InputClosed,
}

/// Result type for display operations.
pub type Result<T> = std::result::Result<T, Error>;
