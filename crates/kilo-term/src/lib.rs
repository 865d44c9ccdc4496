// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal layer for kilo.
//
// Everything that touches the terminal device lives here: the raw-mode
// guard, the window-size probe, the key decoder that turns raw stdin
// bytes into logical keys, the append buffer that batches a frame into a
// single write, and the loop that ties them together.
//
// Direct termios and ANSI escape sequences, no TUI framework. The whole
// protocol surface is a handful of byte strings, each one in `ansi`.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod terminal;

pub use error::{Error, Result};
