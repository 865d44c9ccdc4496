//! Error types for the editor core.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Editor error type.
///
/// Like [`kilo_term::Error`], every variant ends the session.
#[derive(Error, Debug)]
pub enum Error {
    /// The file named on the command line could not be opened.
    #[error("fopen {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file opened but reading its lines failed.
    #[error("getline {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Terminal failure (raw mode, window size, key read, frame write).
    #[error(transparent)]
    Term(#[from] kilo_term::Error),
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, Error>;
