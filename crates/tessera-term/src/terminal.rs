// SPDX-License-Identifier: MIT
//
// ANSI terminal back-end: raw mode, alternate screen, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, poll, sigaction, atexit, and raw
// fd reads and writes. These are the standard POSIX interfaces for
// terminal control. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// `AnsiBackend` owns the terminal's raw state. `start` enters raw mode via
// termios, switches to the alternate screen, puts the keypad in
// application mode, and enables SGR mouse tracking. Everything is undone
// by `stop`, by `Drop`, by the panic hook and by an `atexit` hook, so the
// user's shell survives whatever happens to the process.
//
// The panic and exit hooks bypass Rust's stdout lock entirely, writing
// `ansi::RESTORE` directly to fd 1. That avoids deadlock if the process
// dies while holding the lock mid-refresh.
//
// Colour slots are kept in an in-process table. A pair is rendered as a
// 24-bit SGR colour when the terminal advertises direct colour and as
// the nearest xterm-256 entry otherwise.
//
// Input is read with poll(2) so a timeout can bound each wait. Bytes go
// through the escape-sequence `Parser`; a lone ESC is flushed as a key
// once `escape_delay` has passed since it arrived, however short the
// caller's timeouts are. SIGWINCH sets a flag that
// the next read reports as `KEY_RESIZE`.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::ansi::{self, MouseMode};
use crate::attr::Style;
use crate::backend::{Backend, Capabilities, RawEvent, Size};
use crate::color::{CellColor, Rgb};
use crate::config::DisplayConfig;
use crate::error::{Error, Result};
use crate::input::Parser;
use crate::keycode::KeyCode;
use crate::output::{OutputBuffer, Pen, Sgr};
use crate::palette::{ColorSlot, ColorTable, PairId};

/// Size assumed when the terminal will not say.
const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

/// Bytes read from stdin per syscall.
const READ_BUF_SIZE: usize = 4096;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Negotiation ────────────────────────────────────────────────────────────

/// Accept or reject a terminal type. `TERM` unset, empty or `dumb` leaves
/// nothing to drive.
///
/// # Errors
///
/// [`Error::UnsupportedTerminal`] naming the rejected type.
pub fn supported_term(term: Option<&str>) -> Result<&str> {
    match term {
        None => Err(Error::UnsupportedTerminal("TERM is not set".into())),
        Some("") => Err(Error::UnsupportedTerminal("TERM is empty".into())),
        Some("dumb") => Err(Error::UnsupportedTerminal("dumb".into())),
        Some(t) => Ok(t),
    }
}

/// What the terminal can do, judged from `TERM` and `COLORTERM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Negotiated {
    pub caps: Capabilities,
    /// Pairs render as 24-bit colour rather than palette indices.
    pub truecolor: bool,
}

/// Negotiate capabilities. `colour` is the user's permission to use
/// colour at all.
#[must_use]
pub fn negotiate(term: &str, colorterm: Option<&str>, colour: bool, mouse: MouseMode) -> Negotiated {
    let direct = matches!(colorterm, Some("truecolor" | "24bit"));
    let rich = term.contains("256color") || term.contains("direct") || direct;
    let colour = colour && rich;

    Negotiated {
        caps: Capabilities {
            colour,
            italics: !matches!(term, "linux" | "screen"),
            mouse_wheel: mouse != MouseMode::Off,
        },
        truecolor: colour && direct,
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for the panic and exit hooks.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// A session is live and the hooks should restore the terminal.
static SESSION_LIVE: AtomicBool = AtomicBool::new(false);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Hook guard: installed at most once per process.
static HOOKS_INSTALLED: Once = Once::new();

/// Install the panic hook and the `atexit` hook.
fn install_exit_hooks() {
    HOOKS_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));

        #[cfg(unix)]
        unsafe {
            if libc::atexit(restore_at_exit) != 0 {
                warn!("could not register the at-exit terminal restore");
            }
        }
    });
}

#[cfg(unix)]
extern "C" fn restore_at_exit() {
    emergency_restore();
}

/// Write the restore sequence straight to stdout's descriptor and put
/// termios back. Does nothing when no session is live.
fn emergency_restore() {
    if !SESSION_LIVE.swap(false, Ordering::SeqCst) {
        return;
    }

    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            ansi::RESTORE.as_ptr().cast::<libc::c_void>(),
            ansi::RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(ansi::RESTORE);
        let _ = io::stdout().flush();
    }

    #[cfg(unix)]
    restore_termios_from_backup();
}

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, taken by the next read.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── Raw input ──────────────────────────────────────────────────────────────

#[cfg(unix)]
const STDIN_FD: libc::c_int = libc::STDIN_FILENO;

#[cfg(not(unix))]
const STDIN_FD: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Ready,
    TimedOut,
    Interrupted,
}

/// Wait for `fd` to become readable, at most `timeout` (forever if `None`).
#[cfg(unix)]
fn poll_input(fd: libc::c_int, timeout: Option<Duration>) -> io::Result<Readiness> {
    let ms = timeout.map_or(-1, |t| {
        libc::c_int::try_from(t.as_micros().div_ceil(1000)).unwrap_or(libc::c_int::MAX)
    });
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&raw mut pfd, 1, ms) };

    match ready {
        0 => Ok(Readiness::TimedOut),
        n if n > 0 => Ok(Readiness::Ready),
        _ => {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                Ok(Readiness::Interrupted)
            } else {
                Err(err)
            }
        }
    }
}

#[cfg(not(unix))]
fn poll_input(_fd: i32, _timeout: Option<Duration>) -> io::Result<Readiness> {
    Ok(Readiness::Ready)
}

/// Read whatever `fd` has. `Ok(0)` is end of input.
#[cfg(unix)]
fn read_input(fd: libc::c_int, buf: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    usize::try_from(n).map_err(|_| io::Error::last_os_error())
}

#[cfg(not(unix))]
fn read_input(_fd: i32, buf: &mut [u8]) -> io::Result<usize> {
    use std::io::Read;
    io::stdin().read(buf)
}

// ─── AnsiBackend ────────────────────────────────────────────────────────────

/// The real terminal, driven with ANSI escape sequences on stdin/stdout.
///
/// Nothing touches the terminal until [`start`](Backend::start). The
/// terminal is restored when the back-end is dropped, even on panic.
pub struct AnsiBackend {
    escape_delay: Duration,
    mouse: MouseMode,
    colour_allowed: bool,

    negotiated: Negotiated,
    size: Size,
    active: bool,

    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    // ── Output ──
    colors: HashMap<ColorSlot, Rgb>,
    pairs: HashMap<PairId, (ColorSlot, ColorSlot)>,
    style: Style,
    cursor: (u16, u16),
    cursor_visible: bool,
    /// Visibility last sent to the terminal.
    shown: Option<bool>,
    pen: Pen,
    out: OutputBuffer,

    // ── Input ──
    input_fd: i32,
    parser: Parser,
    /// When the bytes held back by `parser` started waiting.
    pending_since: Option<Instant>,
    pending: VecDeque<RawEvent>,
}

impl AnsiBackend {
    /// A back-end for stdin/stdout with the settings in `config`.
    #[must_use]
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            escape_delay: config.escape_delay,
            mouse: config.mouse,
            colour_allowed: config.colour,
            negotiated: Negotiated::default(),
            size: get_size().unwrap_or(FALLBACK_SIZE),
            active: false,
            #[cfg(unix)]
            original_termios: None,
            colors: HashMap::new(),
            pairs: HashMap::new(),
            style: Style::default(),
            cursor: (0, 0),
            cursor_visible: true,
            shown: None,
            pen: Pen::new(),
            out: OutputBuffer::new(),
            input_fd: STDIN_FD,
            parser: Parser::new(),
            pending_since: None,
            pending: VecDeque::new(),
        }
    }

    /// Whether a session is running.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The SGR state `style` renders as.
    fn sgr_for(&self, style: Style) -> Sgr {
        let colors = if self.negotiated.caps.colour && !style.pair.is_none() {
            self.pairs.get(&style.pair).map(|&(fg, bg)| {
                (self.cell_color(fg), self.cell_color(bg))
            })
        } else {
            None
        };
        let (fg, bg) = colors.unwrap_or((CellColor::Default, CellColor::Default));
        Sgr {
            attr: style.attr,
            fg,
            bg,
        }
    }

    fn cell_color(&self, slot: ColorSlot) -> CellColor {
        self.colors
            .get(&slot)
            .map_or(CellColor::Default, |&rgb| {
                CellColor::from_rgb(rgb, self.negotiated.truecolor)
            })
    }

    /// Open a synchronized-output frame if nothing is buffered yet.
    fn begin_frame(&mut self) {
        if self.out.is_empty() {
            ansi::begin_sync(&mut self.out).ok();
        }
    }

    /// Pick up a pending resize. Returns `true` if there was one.
    fn take_resize(&mut self) -> bool {
        if !SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
            return false;
        }
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.pen.invalidate();
        debug!(cols = self.size.cols, rows = self.size.rows, "terminal resized");
        true
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let fd = libc::STDIN_FILENO;

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // cfmakeraw equivalent.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;

            // VMIN=1, VTIME=0: read() blocks until at least 1 byte available.
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ColorTable for AnsiBackend {
    fn define_color(&mut self, slot: ColorSlot, rgb: Rgb) {
        self.colors.insert(slot, rgb);
        self.pen.invalidate();
    }

    fn define_pair(&mut self, pair: PairId, fg: ColorSlot, bg: ColorSlot) {
        self.pairs.insert(pair, (fg, bg));
        self.pen.invalidate();
    }
}

impl Backend for AnsiBackend {
    fn start(&mut self) -> Result<Capabilities> {
        if self.active {
            return Ok(self.negotiated.caps);
        }

        let term = std::env::var("TERM").ok();
        let term = supported_term(term.as_deref())?;
        let colorterm = std::env::var("COLORTERM").ok();
        self.negotiated = negotiate(term, colorterm.as_deref(), self.colour_allowed, self.mouse);

        install_exit_hooks();
        install_sigwinch_handler();
        self.enable_raw_mode()?;
        self.size = get_size().unwrap_or(self.size);

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::enter_alt_screen(&mut lock)?;
        ansi::enter_keypad_mode(&mut lock)?;
        ansi::cursor_hide(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::enable_mouse(&mut lock, self.mouse)?;
        lock.flush()?;
        drop(lock);

        SESSION_LIVE.store(true, Ordering::SeqCst);
        self.active = true;
        self.pen.invalidate();
        self.shown = Some(false);
        debug!(
            term,
            caps = ?self.negotiated.caps,
            truecolor = self.negotiated.truecolor,
            cols = self.size.cols,
            rows = self.size.rows,
            "terminal session started"
        );
        Ok(self.negotiated.caps)
    }

    fn stop(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        self.out.clear();
        self.parser.flush();
        self.pending_since = None;
        self.pending.clear();
        self.colors.clear();
        self.pairs.clear();

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::end_sync(&mut lock)?;
        ansi::disable_mouse(&mut lock)?;
        ansi::exit_keypad_mode(&mut lock)?;
        ansi::reset(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::exit_alt_screen(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        SESSION_LIVE.store(false, Ordering::SeqCst);
        self.active = false;
        debug!("terminal session stopped");
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn put_str(&mut self, x: u16, y: u16, text: &str) {
        let sgr = self.sgr_for(self.style);
        self.begin_frame();
        self.pen.move_to(&mut self.out, x, y);
        self.pen.apply(&mut self.out, sgr);
        self.pen.text(&mut self.out, text);
    }

    fn move_cursor(&mut self, x: u16, y: u16) {
        self.cursor = (x, y);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn refresh(&mut self) -> Result<()> {
        if !self.active {
            return Err(Error::NotStarted);
        }

        self.begin_frame();
        if self.cursor_visible {
            let (x, y) = self.cursor;
            self.pen.move_to(&mut self.out, x, y);
        }
        if self.shown != Some(self.cursor_visible) {
            if self.cursor_visible {
                ansi::cursor_show(&mut self.out)?;
            } else {
                ansi::cursor_hide(&mut self.out)?;
            }
            self.shown = Some(self.cursor_visible);
        }
        ansi::end_sync(&mut self.out)?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.out.flush_to(&mut lock)?;
        Ok(())
    }

    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<RawEvent>> {
        if !self.active {
            return Err(Error::NotStarted);
        }

        let started = Instant::now();
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut polled = false;

        loop {
            if self.take_resize() {
                return Ok(Some(RawEvent::Key(KeyCode::RESIZE)));
            }
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            let now = Instant::now();
            let escape_left = self
                .pending_since
                .map(|since| (since + self.escape_delay).saturating_duration_since(now));
            if escape_left == Some(Duration::ZERO) {
                self.pending_since = None;
                let events = self.parser.flush();
                self.pending.extend(events);
                continue;
            }

            let remaining = timeout.map(|t| t.saturating_sub(now - started));
            if polled && remaining == Some(Duration::ZERO) {
                return Ok(None);
            }
            let wait = match (remaining, escape_left) {
                (Some(r), Some(e)) => Some(r.min(e)),
                (r, e) => r.or(e),
            };

            polled = true;
            if poll_input(self.input_fd, wait)? == Readiness::Ready {
                let n = read_input(self.input_fd, &mut buf)?;
                if n == 0 {
                    return Err(Error::InputClosed);
                }
                let events = self.parser.advance(&buf[..n]);
                self.pending_since = match (self.parser.has_pending(), self.pending_since) {
                    (false, _) => None,
                    (true, Some(since)) if events.is_empty() => Some(since),
                    (true, _) => Some(Instant::now()),
                };
                self.pending.extend(events);
            }
        }
    }
}

impl Drop for AnsiBackend {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(%err, "failed to restore the terminal");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
