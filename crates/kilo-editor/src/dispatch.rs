//! Dispatch — decoded keys to editor actions.
//!
//! | Key              | Effect                                   |
//! |------------------|------------------------------------------|
//! | Ctrl-Q           | quit                                     |
//! | arrows           | move one step, clamped                   |
//! | Home / End       | first / last screen column               |
//! | PageUp / PageDown| `screen_rows` single steps up / down     |
//! | anything else    | nothing                                  |
//!
//! Paging is literally the single-step move repeated, so it inherits the
//! same clamps and stops at the top or at the sentinel row past the end.

use kilo_term::event_loop::Action;
use kilo_term::input::{Key, ctrl_key};

use crate::viewport::{Direction, Viewport};

/// The quit key, Ctrl-Q.
pub const QUIT: u8 = ctrl_key(b'q');

/// Apply `key` to the viewport.
///
/// `row_count` bounds downward motion. Returns [`Action::Quit`] for
/// Ctrl-Q; the event loop does the screen wipe.
pub fn handle(view: &mut Viewport, row_count: usize, key: Key) -> Action {
    match key {
        Key::Char(QUIT) => return Action::Quit,

        Key::Home => view.cursor_line_start(),
        Key::End => view.cursor_line_end(),

        Key::PageUp | Key::PageDown => {
            let direction = if key == Key::PageUp {
                Direction::Up
            } else {
                Direction::Down
            };
            for _ in 0..view.screen_rows() {
                view.move_cursor(direction, row_count);
            }
        }

        Key::ArrowUp => view.move_cursor(Direction::Up, row_count),
        Key::ArrowDown => view.move_cursor(Direction::Down, row_count),
        Key::ArrowLeft => view.move_cursor(Direction::Left, row_count),
        Key::ArrowRight => view.move_cursor(Direction::Right, row_count),

        Key::Char(_) | Key::Delete | Key::Escape => {}
    }

    Action::Continue
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
