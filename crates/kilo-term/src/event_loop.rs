// SPDX-License-Identifier: MIT
//
// Event loop — the heartbeat of the editor.
//
// One thread, strictly sequential: paint a frame, flush it, block for the
// next key, hand the key to the application, repeat. There is nothing to
// do between keys, so there is no tick, no background reader and no
// channel. The only place the loop waits is inside `KeyDecoder::next_key`,
// which polls stdin with the raw-mode read timeout.
//
// Each frame is painted into one `OutputBuffer` and flushed with a single
// write. On quit the loop wipes the screen and returns without painting
// again; the caller's `RawMode` guard then restores the terminal.

use std::io::Write;

use tracing::debug;

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::{ByteSource, Key, KeyDecoder};
use crate::output::OutputBuffer;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Clear the screen and exit the event loop.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`paint`](App::paint) before every key and
/// [`on_key`](App::on_key) for every key.
pub trait App {
    /// Handle a decoded key.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// Paint a complete frame into `out`.
    ///
    /// `out` is empty on entry. Everything written here reaches the
    /// terminal in one write.
    fn paint(&mut self, out: &mut OutputBuffer);
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the key decoder and the frame buffer. Call [`run`](Self::run) to
/// enter the loop; it returns when the application signals
/// [`Action::Quit`].
///
/// # Example
///
/// ```
/// use std::collections::VecDeque;
/// use kilo_term::event_loop::{Action, App, EventLoop};
/// use kilo_term::input::{ctrl_key, Key};
/// use kilo_term::output::OutputBuffer;
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_key(&mut self, key: Key) -> Action {
///         if key == Key::Char(ctrl_key(b'q')) {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self, out: &mut OutputBuffer) {
///         out.append(b"hello");
///     }
/// }
///
/// let keys: VecDeque<u8> = VecDeque::from([ctrl_key(b'q')]);
/// let mut event_loop = EventLoop::new(keys, Vec::new());
/// event_loop.run(&mut Hello)?;
/// assert_eq!(event_loop.output(), b"hello\x1b[2J\x1b[H");
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct EventLoop<S, W> {
    keys: KeyDecoder<S>,
    out: W,
    frame: OutputBuffer,
}

impl<S: ByteSource, W: Write> EventLoop<S, W> {
    /// Create an event loop reading keys from `source` and drawing to `out`.
    #[must_use]
    pub fn new(source: S, out: W) -> Self {
        Self {
            keys: KeyDecoder::new(source),
            out,
            frame: OutputBuffer::new(),
        }
    }

    /// The writer frames are flushed to.
    #[inline]
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.out
    }

    /// Run the loop until the application returns [`Action::Quit`].
    ///
    /// # Errors
    ///
    /// Returns an error if reading a key or writing a frame fails.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        loop {
            self.frame.clear();
            app.paint(&mut self.frame);
            self.flush()?;

            let key = self.keys.next_key()?;
            if app.on_key(key) == Action::Quit {
                debug!("quit requested");
                ansi::wipe(&mut self.frame).map_err(|e| Error::sys("write", e))?;
                return self.flush();
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.frame
            .flush_to(&mut self.out)
            .map_err(|e| Error::sys("write", e))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ctrl_key;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::io;

    /// Counts frames and records every key it sees.
    #[derive(Default)]
    struct Recorder {
        frames: usize,
        keys: Vec<Key>,
    }

    impl App for Recorder {
        fn on_key(&mut self, key: Key) -> Action {
            self.keys.push(key);
            if key == Key::Char(ctrl_key(b'q')) {
                Action::Quit
            } else {
                Action::Continue
            }
        }

        fn paint(&mut self, out: &mut OutputBuffer) {
            self.frames += 1;
            out.append(format!("[{}]", self.frames).as_bytes());
        }
    }

    fn bytes(b: &[u8]) -> VecDeque<u8> {
        b.iter().copied().collect()
    }

    #[test]
    fn action_equality() {
        assert_eq!(Action::Continue, Action::Continue);
        assert_ne!(Action::Continue, Action::Quit);
    }

    #[test]
    fn paints_before_every_key() {
        let mut app = Recorder::default();
        let mut event_loop = EventLoop::new(bytes(b"ab\x11"), Vec::new());
        event_loop.run(&mut app).unwrap();

        assert_eq!(app.frames, 3);
        assert_eq!(
            app.keys,
            vec![Key::Char(b'a'), Key::Char(b'b'), Key::Char(0x11)]
        );
    }

    #[test]
    fn quit_wipes_and_stops_painting() {
        let mut app = Recorder::default();
        let mut event_loop = EventLoop::new(bytes(b"\x11zzz"), Vec::new());
        event_loop.run(&mut app).unwrap();

        assert_eq!(app.frames, 1);
        assert_eq!(event_loop.output().as_slice(), b"[1]\x1b[2J\x1b[H");
    }

    #[test]
    fn decodes_sequences_for_app() {
        let mut app = Recorder::default();
        let mut event_loop = EventLoop::new(bytes(b"\x1b[B\x1b[6~\x11"), Vec::new());
        event_loop.run(&mut app).unwrap();

        assert_eq!(
            app.keys,
            vec![Key::ArrowDown, Key::PageDown, Key::Char(0x11)]
        );
    }

    #[test]
    fn one_write_per_frame() {
        struct Counting(usize);
        impl Write for Counting {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0 += 1;
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut app = Recorder::default();
        let mut event_loop = EventLoop::new(bytes(b"xy\x11"), Counting(0));
        event_loop.run(&mut app).unwrap();

        // Three frames plus the quit wipe.
        assert_eq!(event_loop.output().0, 4);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn one_write_per_frame_on_fd() {
        use crate::output::{FdWriter, packets};

        /// Paints several `\r\n`-separated rows, like a real frame.
        struct Rows;
        impl App for Rows {
            fn on_key(&mut self, key: Key) -> Action {
                if key == Key::Char(ctrl_key(b'q')) {
                    Action::Quit
                } else {
                    Action::Continue
                }
            }
            fn paint(&mut self, out: &mut OutputBuffer) {
                out.append(b"~\x1b[K\r\n~\x1b[K\r\n~\x1b[K");
                ansi::cursor_to(out, 0, 0).unwrap();
            }
        }

        let (tx, rx) = packets::pair();
        let mut event_loop = EventLoop::new(bytes(b"x\x11"), FdWriter::from_raw_fd(tx));
        event_loop.run(&mut Rows).unwrap();

        let frame = b"~\x1b[K\r\n~\x1b[K\r\n~\x1b[K\x1b[1;1H".to_vec();
        assert_eq!(
            packets::drain(rx),
            vec![frame.clone(), frame, b"\x1b[2J\x1b[H".to_vec()]
        );
        packets::close(tx, rx);
    }

    #[test]
    fn write_failure_ends_loop() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut app = Recorder::default();
        let mut event_loop = EventLoop::new(bytes(b"a"), Closed);
        let err = event_loop.run(&mut app).unwrap_err();
        assert!(matches!(err, Error::Sys { op: "write", .. }));
    }

    #[test]
    fn read_failure_ends_loop() {
        struct Dead;
        impl ByteSource for Dead {
            fn read_byte(&mut self) -> Result<Option<u8>> {
                Err(Error::sys("read", io::Error::other("eio")))
            }
        }

        let mut app = Recorder::default();
        let mut event_loop = EventLoop::new(Dead, Vec::new());
        assert!(matches!(
            event_loop.run(&mut app),
            Err(Error::Sys { op: "read", .. })
        ));
        assert_eq!(app.frames, 1);
    }
}
