// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// OutputBuffer accumulates every byte of a frame in memory so the whole
// frame reaches the terminal in a single write() call. Drawing row by row
// straight to stdout makes the terminal repaint mid-frame, which shows up
// as flicker and tearing on slow links.
//
// Safety: `FdWriter` calls `libc::write` on a raw descriptor. The pointer and
// length come from the slice being written, so the kernel never reads past
// it.
#![allow(unsafe_code)]
//
// The terminal end of a frame must not go through `io::stdout()`: std wraps
// stdout in a `LineWriter`, which writes up to the last `\n` immediately and
// holds the tail (last row, cursor placement) until flush. That turns one
// frame into two writes. `FdWriter` has no buffer of its own; each `write`
// is one `write(2)`.

use std::io::{self, Write};

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Escape sequences go in through the [`Write`] impl (so every function in
/// [`ansi`](crate::ansi) works on it), row content goes in through
/// [`append`](Self::append). A single flush at frame end writes it all.
///
/// Default capacity: 16 KB, enough for a full 80×24 frame several times over.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes (row content, padding, markers).
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append `n` copies of `byte`.
    pub fn append_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. Real flushing goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── FdWriter ───────────────────────────────────────────────────────────────

/// Unbuffered writer over a raw file descriptor.
///
/// Pair it with [`OutputBuffer::flush_to`]: the whole frame goes out in a
/// single `write_all`, which is one syscall unless the kernel accepts a
/// short write.
#[derive(Debug, Clone, Copy)]
pub struct FdWriter {
    #[cfg(unix)]
    fd: libc::c_int,
}

impl FdWriter {
    /// Writer over standard output (fd 1).
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            #[cfg(unix)]
            fd: libc::STDOUT_FILENO,
        }
    }

    /// Writer over an already open descriptor.
    ///
    /// The caller keeps ownership of `fd` and must keep it open while the
    /// writer is in use. Dropping the writer does not close it.
    #[cfg(unix)]
    #[must_use]
    pub const fn from_raw_fd(fd: libc::c_int) -> Self {
        Self { fd }
    }
}

impl Write for FdWriter {
    #[cfg(unix)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    #[cfg(not(unix))]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = io::stdout().lock();
        let n = out.write(buf)?;
        out.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
