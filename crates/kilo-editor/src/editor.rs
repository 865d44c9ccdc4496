//! Editor — the context struct for one session.
//!
//! `Editor` bundles the row store and the viewport and is passed by `&mut`
//! to everything that reads or changes editor state. It implements
//! kilo-term's [`App`] trait, so the event loop drives it directly:
//!
//! ```text
//! loop {
//!     paint  → render::refresh (scroll, then draw)
//!     on_key → dispatch::handle (move cursor, or quit)
//! }
//! ```

use std::path::Path;

use kilo_term::event_loop::{Action, App};
use kilo_term::input::Key;
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;

use crate::dispatch;
use crate::error::Result;
use crate::render;
use crate::row::RowStore;
use crate::viewport::Viewport;

/// Editor state: rows, cursor, scroll, and screen size.
#[derive(Debug, Clone)]
pub struct Editor {
    rows: RowStore,
    view: Viewport,
}

impl Editor {
    /// An editor with no rows on a screen of `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self::with_rows(size, RowStore::new())
    }

    /// An editor showing `rows` on a screen of `size`.
    #[must_use]
    pub fn with_rows(size: Size, rows: RowStore) -> Self {
        Self {
            rows,
            view: Viewport::new(size),
        }
    }

    /// Load `path` into the row store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.rows.load_file(path)
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &RowStore {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.view
    }
}

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        dispatch::handle(&mut self.view, self.rows.row_count(), key)
    }

    fn paint(&mut self, out: &mut OutputBuffer) {
        render::refresh(&mut self.view, &self.rows, out);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
