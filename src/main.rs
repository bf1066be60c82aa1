// SPDX-License-Identifier: MIT
//
// tessera — an interactive event viewer.
//
// Drives the display layer end to end: every decoded input event is
// appended to a scrolling log, so you can see exactly what your terminal
// sends for a key chord or a mouse gesture.
//
//   tessera-term → display session, colour pairs, input decoding
//   tessera-clip → ^C copies the newest log line, ^V pastes it back
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ header (REVERSE + BOLD)      │  ← 1 row
//   ├──────────────────────────────┤
//   │ colour swatches              │  ← 1 row
//   ├──────────────────────────────┤
//   │ event log                    │  ← h - 3 rows
//   ├──────────────────────────────┤
//   │ status line (DIM)            │  ← 1 row
//   └──────────────────────────────┘
//
// Keys: ^Q quits, F2 toggles Unicode output. Set TESSERA_LOG to a file
// path to capture the library's tracing output there.

use std::collections::VecDeque;
use std::env;
use std::fs::File;
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use tessera_clip::Clipboard;
use tessera_term::metrics::{bytes_of_character, char_width};
use tessera_term::{
    AnsiBackend, Backend, Display, DisplayAttr, DisplayConfig, InputEvent, MouseEvent, Rgb, Size,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// How long to wait for input before refreshing the status line.
const TICK: Duration = Duration::from_secs(1);

/// Oldest log lines are dropped beyond this.
const LOG_CAPACITY: usize = 500;

const HEADER: &str = " tessera event viewer   ^Q quit   F2 unicode   ^C copy   ^V paste";

const FOREGROUND: &str = "#cdd6f4";
const BACKGROUND: &str = "#1e1e2e";

/// Eight hues around the colour wheel.
const SWATCHES: [&str; 8] = [
    "#f38ba8", "#fab387", "#f9e2af", "#a6e3a1", "#94e2d5", "#89b4fa", "#cba6f7", "#f5c2e7",
];

// ─── Viewer ─────────────────────────────────────────────────────────────────

/// What the main loop does after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Quit,
}

/// Viewer state. Painting reads it; `handle` is the only writer.
#[derive(Debug)]
struct Viewer {
    log: VecDeque<String>,
    clipboard: Clipboard,
    pointer: Option<MouseEvent>,
    unicode: bool,
    ticks: u64,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            log: VecDeque::new(),
            clipboard: Clipboard::new(),
            pointer: None,
            unicode: true,
            ticks: 0,
        }
    }
}

/// One log line for `event`; timeouts are not logged.
fn describe(event: &InputEvent) -> Option<String> {
    match event {
        InputEvent::Text(c) => Some(format!(
            "text   {c:?}  U+{:04X}  {} byte(s)  width {}",
            u32::from(*c),
            bytes_of_character(u32::from(*c)),
            char_width(*c),
        )),
        InputEvent::Key(name) => Some(format!("key    {name}")),
        InputEvent::Mouse(m) => Some(format!(
            "mouse  ({}, {})  {}{}",
            m.x,
            m.y,
            if m.pressed { "pressed" } else { "released" },
            if m.clicked { "  clicked" } else { "" },
        )),
        InputEvent::Timeout => None,
    }
}

impl Viewer {
    fn push(&mut self, line: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    fn handle(&mut self, event: &InputEvent) -> Action {
        if let Some(line) = describe(event) {
            self.push(line);
        }

        match event {
            InputEvent::Key(name) => match name.as_str() {
                "KEY_^Q" => return Action::Quit,
                "KEY_F2" => self.unicode = !self.unicode,
                "KEY_^C" => self.copy(),
                "KEY_^V" => self.paste(),
                _ => {}
            },
            InputEvent::Mouse(m) => self.pointer = Some(*m),
            InputEvent::Timeout => self.ticks += 1,
            InputEvent::Text(_) => {}
        }
        Action::Continue
    }

    /// Copy the newest line before the ^C that triggered it.
    fn copy(&mut self) {
        let Some(line) = self.log.iter().rev().nth(1).cloned() else {
            return;
        };
        self.clipboard.replace(Some(line.as_bytes()), None);
        self.push(format!("copied {} byte(s)", line.len()));
    }

    fn paste(&mut self) {
        let line = match self.clipboard.text() {
            Some(text) => format!("paste  {text}"),
            None => "paste  (clipboard empty)".to_owned(),
        };
        self.push(line);
    }

    fn status(&self, size: Size) -> String {
        let pointer = self
            .pointer
            .map_or_else(|| "-".to_owned(), |m| format!("{},{}", m.x, m.y));
        format!(
            " {}x{}  unicode {}  pointer {pointer}  idle ticks {}  events {}",
            size.cols,
            size.rows,
            if self.unicode { "on" } else { "off" },
            self.ticks,
            self.log.len(),
        )
    }

    fn paint<B: Backend>(&self, d: &mut Display<B>) {
        let size = d.screen_size();
        let Size { cols, rows } = size;
        if cols == 0 || rows < 4 {
            return;
        }
        let width = usize::from(cols);
        let fg = Rgb::hex(FOREGROUND).unwrap_or(Rgb::WHITE);
        let bg = Rgb::hex(BACKGROUND).unwrap_or(Rgb::BLACK);

        d.set_unicode(self.unicode);
        d.reset_attributes();
        d.set_color(fg, bg);
        d.clear_screen();

        d.add_attributes(DisplayAttr::REVERSE | DisplayAttr::BOLD);
        d.clear_region(0, 0, cols - 1, 0);
        d.write_text(0, 0, d.truncate_to_width(HEADER, width));
        d.reset_attributes();

        for (i, swatch) in SWATCHES.iter().filter_map(|s| Rgb::hex(s)).enumerate() {
            let Ok(x) = u16::try_from(i * 4) else { break };
            if x >= cols {
                break;
            }
            d.set_color(fg, swatch);
            d.write_text(x, 1, "    ");
        }
        d.set_color(fg, bg);

        let body = usize::from(rows - 3);
        let skip = self.log.len().saturating_sub(body);
        for (y, line) in (2..).zip(self.log.iter().skip(skip)) {
            d.write_text(0, y, d.truncate_to_width(line, width));
        }

        d.add_attributes(DisplayAttr::DIM);
        d.write_text(0, rows - 1, d.truncate_to_width(&self.status(size), width));
        d.reset_attributes();

        match self.pointer {
            Some(m) => d.set_cursor(m.x, m.y, true),
            None => d.hide_cursor(),
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Log to the file named by `TESSERA_LOG`, never to the screen.
fn init_logging() {
    let Some(path) = env::var_os("TESSERA_LOG") else {
        return;
    };
    match File::create(&path) {
        Ok(file) => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init();
        }
        Err(e) => eprintln!("tessera: cannot open log file {}: {e}", path.to_string_lossy()),
    }
}

fn run<B: Backend>(display: &mut Display<B>) -> tessera_term::Result<()> {
    let caps = display.start()?;
    info!(?caps, "viewer started");

    let mut viewer = Viewer::default();
    loop {
        viewer.paint(display);
        let event = display.next_event(Some(TICK))?;
        if viewer.handle(&event) == Action::Quit {
            break;
        }
    }

    display.shutdown()
}

fn main() {
    init_logging();

    let config = DisplayConfig::from_args(env::args().skip(1));
    let mut display = Display::new(AnsiBackend::new(&config), config);

    if let Err(e) = run(&mut display) {
        let _ = display.shutdown();
        eprintln!("tessera: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
