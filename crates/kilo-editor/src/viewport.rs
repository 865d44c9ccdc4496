//! Viewport — cursor position and vertical scroll.
//!
//! Tracks where the cursor is (in absolute file coordinates) and which row is
//! at the top of the screen. The screen size is fixed for the lifetime of the
//! viewport; there is no resize handling.
//!
//! # Coordinates
//!
//! ```text
//!   file rows           screen
//!   ┌──────────┐
//!   │ 0        │
//!   │ 1        │ ← row_offset ┌──────────┐ screen row 0
//!   │ 2  █     │              │ 2  █     │  cursor (2, 3) → screen (1, 3)
//!   │ 3        │              │ 3        │ screen row screen_rows - 1
//!   │ 4        │              └──────────┘
//!   └──────────┘
//!   (row_count) ← the cursor may rest here, one past the last row
//! ```
//!
//! Horizontal movement is bounded by the screen width, not by the length of
//! the row under the cursor, and there is no horizontal scroll.

use std::ops::Range;

use kilo_term::terminal::Size;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A single-step cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Cursor and scroll state for one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// Cursor row in file coordinates (0-indexed, may equal the row count).
    cursor_row: usize,

    /// Cursor column (0-indexed, always `< screen_cols`).
    cursor_col: usize,

    /// First file row shown on screen.
    row_offset: usize,

    /// Screen height in rows.
    screen_rows: usize,

    /// Screen width in columns.
    screen_cols: usize,
}

impl Viewport {
    /// A viewport of `size` with the cursor at the top-left and no scroll.
    ///
    /// Zero dimensions are raised to 1 so the clamps below stay well-defined.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            row_offset: 0,
            screen_rows: usize::from(size.rows).max(1),
            screen_cols: usize::from(size.cols).max(1),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    #[inline]
    #[must_use]
    pub const fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    /// File rows covered by the screen, `row_offset..row_offset + screen_rows`.
    ///
    /// Rows past the end of the file are included; the renderer draws them
    /// as `~`.
    #[inline]
    #[must_use]
    pub const fn visible_rows(&self) -> Range<usize> {
        self.row_offset..self.row_offset + self.screen_rows
    }

    /// Cursor position relative to the screen's top-left corner, 0-indexed.
    ///
    /// Only meaningful after [`scroll`](Self::scroll).
    #[inline]
    #[must_use]
    pub const fn screen_cursor(&self) -> (usize, usize) {
        (self.cursor_row.saturating_sub(self.row_offset), self.cursor_col)
    }

    // -- Scrolling ----------------------------------------------------------

    /// Adjust the scroll offset so the cursor row is on screen.
    ///
    /// Moves the offset only as far as needed: up to the cursor if it is
    /// above the screen, or until the cursor is on the last screen row if it
    /// is below. Calling it again without moving the cursor changes nothing.
    pub const fn scroll(&mut self) {
        if self.cursor_row < self.row_offset {
            self.row_offset = self.cursor_row;
        }
        if self.cursor_row >= self.row_offset + self.screen_rows {
            self.row_offset = self.cursor_row - self.screen_rows + 1;
        }
    }

    // -- Movement -----------------------------------------------------------

    /// Move the cursor one step, clamped to the screen width horizontally
    /// and to `0..=row_count` vertically.
    ///
    /// Steps that would cross a boundary are ignored.
    pub const fn move_cursor(&mut self, direction: Direction, row_count: usize) {
        match direction {
            Direction::Left => {
                if self.cursor_col > 0 {
                    self.cursor_col -= 1;
                }
            }
            Direction::Right => {
                if self.cursor_col + 1 < self.screen_cols {
                    self.cursor_col += 1;
                }
            }
            Direction::Up => {
                if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                }
            }
            Direction::Down => {
                if self.cursor_row < row_count {
                    self.cursor_row += 1;
                }
            }
        }
    }

    /// Move the cursor to column 0.
    pub const fn cursor_line_start(&mut self) {
        self.cursor_col = 0;
    }

    /// Move the cursor to the last screen column.
    pub const fn cursor_line_end(&mut self) {
        self.cursor_col = self.screen_cols - 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
