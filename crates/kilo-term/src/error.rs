// SPDX-License-Identifier: MIT
//
// Error types for terminal operations.

use std::io;

use thiserror::Error;

/// Terminal error type.
///
/// Every variant is fatal to the editor: there is no safe way to keep
/// drawing on a terminal whose mode or size we do not know.
#[derive(Error, Debug)]
pub enum Error {
    /// A terminal syscall failed. `op` names the call (`tcgetattr`,
    /// `tcsetattr`, `read`, `write`).
    #[error("{op}: {source}")]
    Sys {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Neither `TIOCGWINSZ` nor the cursor-position probe produced a size.
    #[error("GetWindowSize: {0}")]
    WindowSize(&'static str),
}

impl Error {
    /// Wrap the current `errno` for the syscall `op`.
    #[must_use]
    pub fn last_os_error(op: &'static str) -> Self {
        Self::Sys {
            op,
            source: io::Error::last_os_error(),
        }
    }

    /// Wrap an existing I/O error for the operation `op`.
    #[must_use]
    pub const fn sys(op: &'static str, source: io::Error) -> Self {
        Self::Sys { op, source }
    }
}

/// Result type for terminal operations.
pub type Result<T> = std::result::Result<T, Error>;
