// SPDX-License-Identifier: MIT
//
// kilo — a minimal raw-mode terminal viewer.
//
// This is the binary that wires the two crates together:
//
//   kilo-term   → raw mode, window size, key decoding, event loop
//   kilo-editor → rows, viewport, renderer, key dispatch
//
// Startup order matters: raw mode first (the window-size probe reads the
// terminal's reply byte by byte), then the size, then the file. Any failure
// clears the screen, prints `kilo: <op>: <reason>` to stderr and exits 1.
// The `RawMode` guard has already restored the terminal by then.
//
// Usage:
//
//   kilo [filename]
//
// Extra arguments are ignored. Set `KILO_LOG` (an `EnvFilter` directive
// such as `debug`) to write a log to `$TMPDIR/kilo.log`; stdout belongs to
// the screen, so logging never goes there.

use std::env;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use kilo_editor::Editor;
use kilo_term::ansi;
use kilo_term::event_loop::EventLoop;
use kilo_term::input::StdinSource;
use kilo_term::output::FdWriter;
use kilo_term::terminal::{self, RawMode};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable that turns on file logging.
const LOG_ENV: &str = "KILO_LOG";

/// Log file name, created in the system temp directory.
const LOG_FILE: &str = "kilo.log";

// ─── Logging ────────────────────────────────────────────────────────────────

/// Path of the log file.
fn log_path() -> PathBuf {
    env::temp_dir().join(LOG_FILE)
}

/// Install the file logger if `KILO_LOG` is set.
///
/// Failing to open the log file is not an error; kilo runs without logging.
fn init_logging() {
    let Ok(directive) = env::var(LOG_ENV) else {
        return;
    };

    let Ok(file) = OpenOptions::new().create(true).append(true).open(log_path()) else {
        return;
    };

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

// ─── Main ───────────────────────────────────────────────────────────────────

/// The file to open: the first argument after the program name, if any.
fn file_arg(args: impl IntoIterator<Item = OsString>) -> Option<PathBuf> {
    args.into_iter().nth(1).map(PathBuf::from)
}

/// Run one session on the real terminal.
fn run(path: Option<&Path>) -> kilo_editor::Result<()> {
    let mut raw = RawMode::enter()?;
    let size = terminal::window_size(&mut FdWriter::stdout(), &mut StdinSource)?;
    info!(rows = size.rows, cols = size.cols, "terminal size");

    let mut editor = Editor::new(size);
    if let Some(path) = path {
        editor.open(path)?;
    }

    EventLoop::new(StdinSource, FdWriter::stdout()).run(&mut editor)?;
    raw.leave()?;
    Ok(())
}

fn main() {
    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "kilo starting");

    let path = file_arg(env::args_os());

    if let Err(e) = run(path.as_deref()) {
        error!("{e}");

        let _ = ansi::wipe(&mut FdWriter::stdout());

        eprintln!("kilo: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
