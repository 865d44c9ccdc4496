// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and ioctl (TIOCGWINSZ). These are the standard POSIX
// interfaces for terminal control; there is no safe alternative. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. `RawMode::enter` snapshots the
// original termios, derives the raw attribute set from that snapshot, and
// applies it. The returned guard restores the snapshot on `leave()` or on
// drop, so every exit path (normal quit, `?` early return, panic) leaves the
// user's shell usable.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built wipe
// sequence straight to fd 1, then restores termios from a global backup.
// A panic while the frame buffer is being flushed would otherwise deadlock
// on the lock or leave the terminal without echo.

use std::io::Write;
use std::sync::{Mutex, Once};

use tracing::{debug, warn};

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::ByteSource;
use crate::output::FdWriter;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl Size {
    /// Create a size from rows and columns.
    #[inline]
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

// ─── Raw Mode Config ────────────────────────────────────────────────────────

/// Read policy applied while in raw mode.
///
/// The defaults give non-blocking, byte-at-a-time reads that return after
/// at most 100 ms with no data, so the key decoder can treat "nothing yet"
/// as a normal polled state and tell a lone Escape from the start of an
/// escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawModeConfig {
    /// `VMIN`: minimum bytes before `read()` returns.
    pub min_bytes: u8,
    /// `VTIME`: read timeout in tenths of a second.
    pub read_timeout: u8,
}

impl Default for RawModeConfig {
    fn default() -> Self {
        Self {
            min_bytes: 0,
            read_timeout: 1,
        }
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if the query fails or reports a zero dimension, which
/// some terminals do when stdout is not the controlling tty.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_row, ws.ws_col))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Determine the window size, falling back to a cursor-position probe.
///
/// Tries `TIOCGWINSZ` first. If that yields nothing usable, pushes the
/// cursor to the bottom-right corner and asks the terminal where it ended
/// up. `out` must be the terminal's output and `input` its input, already
/// in raw mode so the reply is not echoed or line-buffered.
///
/// # Errors
///
/// Returns [`Error::WindowSize`] if the probe reply is missing or
/// malformed, or [`Error::Sys`] if writing the probe or reading the reply
/// fails.
pub fn window_size(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size> {
    if let Some(size) = get_size() {
        debug!(rows = size.rows, cols = size.cols, "window size from TIOCGWINSZ");
        return Ok(size);
    }

    debug!("TIOCGWINSZ unavailable, probing with cursor position report");
    probe_size(out, input)
}

/// Longest cursor-position reply we are willing to read.
const REPORT_MAX: usize = 31;

/// Size the window by moving the cursor to the corner and reading DSR 6.
///
/// # Errors
///
/// See [`window_size`].
pub fn probe_size(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size> {
    ansi::cursor_to_bottom_right(out)
        .and_then(|()| ansi::request_cursor_position(out))
        .and_then(|()| out.flush())
        .map_err(|e| Error::sys("write", e))?;

    let mut reply = Vec::with_capacity(REPORT_MAX);
    while reply.len() < REPORT_MAX {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(byte) => reply.push(byte),
        }
    }

    let size = parse_cursor_report(&reply)
        .ok_or(Error::WindowSize("malformed cursor position report"))?;
    debug!(rows = size.rows, cols = size.cols, "window size from cursor probe");
    Ok(size)
}

/// Parse a cursor position report body: `ESC [ rows ; cols`.
///
/// The trailing `R` must already be stripped. Returns `None` for anything
/// else, including zero dimensions.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    let rows: u16 = rows.parse().ok()?;
    let cols: u16 = cols.parse().ok()?;

    (rows > 0 && cols > 0).then_some(Size::new(rows, cols))
}

// ─── Raw Attributes ─────────────────────────────────────────────────────────

/// Derive the raw-mode attribute set from the captured original.
///
/// Turns off:
/// - input: break-to-SIGINT, CR→NL translation, parity check, 8th-bit strip,
///   and XON/XOFF flow control (so Ctrl-S / Ctrl-Q reach us);
/// - output: all post-processing (`\n` is no longer turned into `\r\n`);
/// - local: echo, canonical line buffering, Ctrl-V literal-next, and
///   signal keys (Ctrl-C / Ctrl-Z arrive as bytes).
///
/// Everything else in `original` is carried over unchanged.
#[cfg(unix)]
#[must_use]
pub fn raw_attributes(original: &libc::termios, config: RawModeConfig) -> libc::termios {
    let mut raw = *original;

    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    raw.c_cc[libc::VMIN] = config.min_bytes;
    raw.c_cc[libc::VTIME] = config.read_timeout;

    raw
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't reach
/// it. This backup (behind a [`Mutex`], not `static mut`) lets the hook
/// restore cooked mode without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

#[cfg(unix)]
fn set_backup(termios: Option<libc::termios>) {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        *guard = termios;
    }
}

/// Emergency wipe: clear screen, home cursor, show cursor.
///
/// The renderer hides the cursor for the duration of each frame, so a panic
/// mid-frame would otherwise leave it invisible.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Installs the panic hook at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] directly to stdout's file descriptor,
/// bypassing the `io::stdout()` lock.
fn emergency_restore() {
    let _ = FdWriter::stdout().write_all(EMERGENCY_RESTORE);
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII cleanup.
///
/// Holds the terminal attributes captured at [`enter`](Self::enter) and
/// puts them back when [`leave`](Self::leave) is called or the guard is
/// dropped, whichever comes first. Restoring happens exactly once.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let mut raw = RawMode::enter()?;
/// // ... read keys, draw frames ...
/// raw.leave()?;
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct RawMode {
    /// Original termios. `None` once restored.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Enter raw mode with the default read policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sys`] if the attributes cannot be read
    /// (`tcgetattr`, e.g. stdin is not a terminal) or applied (`tcsetattr`).
    pub fn enter() -> Result<Self> {
        Self::enter_with(RawModeConfig::default())
    }

    /// Enter raw mode with a custom read policy.
    ///
    /// # Errors
    ///
    /// See [`enter`](Self::enter).
    #[cfg(unix)]
    pub fn enter_with(config: RawModeConfig) -> Result<Self> {
        install_panic_hook();

        let fd = libc::STDIN_FILENO;
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut original) } != 0 {
            return Err(Error::last_os_error("tcgetattr"));
        }

        let attrs = raw_attributes(&original, config);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const attrs) } != 0 {
            return Err(Error::last_os_error("tcsetattr"));
        }

        set_backup(Some(original));
        debug!(
            min_bytes = config.min_bytes,
            read_timeout = config.read_timeout,
            "entered raw mode"
        );

        Ok(Self {
            original: Some(original),
        })
    }

    #[cfg(not(unix))]
    pub fn enter_with(_config: RawModeConfig) -> Result<Self> {
        Err(Error::sys(
            "tcgetattr",
            std::io::Error::new(std::io::ErrorKind::Unsupported, "termios is unix-only"),
        ))
    }

    /// Whether the original attributes are still waiting to be restored.
    #[cfg(unix)]
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        false
    }

    /// Restore the original attributes.
    ///
    /// Idempotent: once restored, further calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sys`] (`tcsetattr`) if the terminal rejects the
    /// original attributes. The guard stays active so drop retries.
    #[cfg(unix)]
    pub fn leave(&mut self) -> Result<()> {
        let Some(ref original) = self.original else {
            return Ok(());
        };

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) } != 0 {
            return Err(Error::last_os_error("tcsetattr"));
        }

        set_backup(None);
        self.original = None;
        debug!("left raw mode");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn leave(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            warn!(error = %e, "failed to restore terminal on drop");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
