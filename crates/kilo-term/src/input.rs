// SPDX-License-Identifier: MIT
//
// Terminal key decoder.
//
// Safety: `StdinSource` reads stdin with `libc::read` so a VTIME timeout
// comes back as a zero-length read instead of blocking inside std's
// buffered stdin. The unsafe block passes a one-byte stack buffer.
#![allow(unsafe_code)]
//
// Turns raw stdin bytes into logical keys. A plain byte is its own key. An
// ESC byte is either the Escape key or the start of a VT100 escape sequence
// for a navigation key; which one is decided by whether more bytes show up
// before the raw-mode read timeout expires.
//
// # Design
//
// Decoding is driven by three lookup tables keyed on the sequence bytes:
//
//   ESC [ <final>      CSI_FINAL   arrows, Home/End (xterm)
//   ESC [ <digit> ~    CSI_TILDE   Home/End/Delete/PageUp/PageDown (vt220)
//   ESC O <final>      SS3_FINAL   Home/End (application cursor mode)
//
// `next_key` only reads bytes and walks the tables; it never branches on a
// specific key. Any sequence not in a table resolves to `Key::Escape`.
//
// Input comes from a `ByteSource` so the decoder can be driven by stdin in
// the editor and by a byte queue in tests.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// The escape byte.
pub const ESC: u8 = 0x1B;

/// The byte a terminal sends for Ctrl + `key`.
///
/// Ctrl clears the top three bits of the ASCII letter, so `ctrl_key(b'q')`
/// is `0x11`.
#[inline]
#[must_use]
pub const fn ctrl_key(key: u8) -> u8 {
    key & 0x1F
}

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A single byte: printable character or control character.
    Char(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    /// A lone ESC, or an escape sequence we do not recognize.
    Escape,
}

// ─── Lookup tables ──────────────────────────────────────────────────────────

/// `ESC [ <final>`
const CSI_FINAL: &[(u8, Key)] = &[
    (b'A', Key::ArrowUp),
    (b'B', Key::ArrowDown),
    (b'C', Key::ArrowRight),
    (b'D', Key::ArrowLeft),
    (b'H', Key::Home),
    (b'F', Key::End),
];

/// `ESC [ <digit> ~`
const CSI_TILDE: &[(u8, Key)] = &[
    (b'1', Key::Home),
    (b'3', Key::Delete),
    (b'4', Key::End),
    (b'5', Key::PageUp),
    (b'6', Key::PageDown),
    (b'7', Key::Home),
    (b'8', Key::End),
];

/// `ESC O <final>`
const SS3_FINAL: &[(u8, Key)] = &[(b'H', Key::Home), (b'F', Key::End)];

fn lookup(table: &[(u8, Key)], byte: u8) -> Option<Key> {
    table
        .iter()
        .find(|&&(b, _)| b == byte)
        .map(|&(_, key)| key)
}

/// What the first two bytes after ESC resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The sequence is complete.
    Done(Key),
    /// A vt220 sequence: one more byte (`~`) is needed. Carries the key the
    /// digit maps to, if any; an unknown digit still consumes its `~`.
    Tilde(Option<Key>),
}

/// Resolve `ESC <intro> <second>`.
fn escape_step(intro: u8, second: u8) -> Step {
    match intro {
        b'[' if second.is_ascii_digit() => Step::Tilde(lookup(CSI_TILDE, second)),
        b'[' => Step::Done(lookup(CSI_FINAL, second).unwrap_or(Key::Escape)),
        b'O' => Step::Done(lookup(SS3_FINAL, second).unwrap_or(Key::Escape)),
        _ => Step::Done(Key::Escape),
    }
}

// ─── Byte sources ───────────────────────────────────────────────────────────

/// Where the decoder gets its bytes.
///
/// `Ok(None)` means no byte arrived within the read timeout. That is not
/// an error: the caller decides whether to retry or give up.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns an error only for a hard read failure.
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// Replays queued bytes. An empty queue behaves like a read timeout.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

/// Reads stdin one byte at a time.
///
/// Meant to be used with the terminal in raw mode, where `VMIN = 0` and
/// `VTIME = 1` make every read return within 100 ms.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl ByteSource for StdinSource {
    #[cfg(unix)]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = std::io::Error::last_os_error();
                match err.kind() {
                    // Nothing to read yet (non-blocking tty, or a signal
                    // landed mid-read). Same as a timeout.
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(Error::sys("read", err)),
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match std::io::stdin().lock().read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(Error::sys("read", e)),
        }
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Reads bytes from a [`ByteSource`] and resolves them into [`Key`]s.
///
/// # Example
///
/// ```
/// use std::collections::VecDeque;
/// use kilo_term::input::{Key, KeyDecoder};
///
/// let bytes: VecDeque<u8> = b"\x1b[Ax".iter().copied().collect();
/// let mut keys = KeyDecoder::new(bytes);
///
/// assert_eq!(keys.next_key()?, Key::ArrowUp);
/// assert_eq!(keys.next_key()?, Key::Char(b'x'));
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct KeyDecoder<S> {
    source: S,
}

impl<S: ByteSource> KeyDecoder<S> {
    /// Create a decoder over `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying byte source.
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Block until a key resolves.
    ///
    /// Timeouts while waiting for the first byte are retried; timeouts in
    /// the middle of an escape sequence resolve to [`Key::Escape`].
    ///
    /// # Errors
    ///
    /// Returns an error if the source reports a hard read failure.
    pub fn next_key(&mut self) -> Result<Key> {
        let first = loop {
            if let Some(byte) = self.source.read_byte()? {
                break byte;
            }
        };

        if first != ESC {
            return Ok(Key::Char(first));
        }

        let Some(intro) = self.source.read_byte()? else {
            return Ok(Key::Escape);
        };
        let Some(second) = self.source.read_byte()? else {
            return Ok(Key::Escape);
        };

        match escape_step(intro, second) {
            Step::Done(key) => Ok(key),
            Step::Tilde(key) => match self.source.read_byte()? {
                Some(b'~') => Ok(key.unwrap_or(Key::Escape)),
                _ => Ok(Key::Escape),
            },
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
