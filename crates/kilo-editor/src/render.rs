//! Render — compose one frame from rows and viewport.
//!
//! A frame is built entirely inside an [`OutputBuffer`] and reaches the
//! terminal in one write:
//!
//! ```text
//! ESC[?25l  ESC[H                     hide cursor, home
//! <row 0>   ESC[K  \r\n               each screen row, cleared to EOL
//! ...
//! <row n-1> ESC[K                     no newline after the last row
//! ESC[{y};{x}H  ESC[?25h              place and show the cursor
//! ```
//!
//! Each screen row is one of:
//!
//! - **content** — the file row, truncated to the screen width (no wrap)
//! - **tilde** — `~` for rows past the end of the file
//! - **welcome** — on an empty buffer, the row one third of the way down
//!   shows the centered banner after its `~`
//!
//! Rows are cleared to end-of-line instead of clearing the whole screen up
//! front, so a shorter row never leaves stale bytes from the previous frame.

use kilo_term::ansi;
use kilo_term::output::OutputBuffer;

use crate::row::RowStore;
use crate::viewport::Viewport;

/// Version shown in the welcome banner.
pub const KILO_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marker drawn in the first column of rows past the end of the file.
const TILDE: &[u8] = b"~";

/// The welcome banner text.
#[must_use]
pub fn welcome_message() -> String {
    format!("Kilo editor -- version {KILO_VERSION}")
}

/// Scroll the viewport to the cursor, then draw the frame into `out`.
pub fn refresh(view: &mut Viewport, rows: &RowStore, out: &mut OutputBuffer) {
    view.scroll();
    draw_frame(view, rows, out);
}

/// Draw a full frame for the viewport's current scroll position.
///
/// Does not scroll; call [`refresh`] unless the viewport is already
/// scrolled.
pub fn draw_frame(view: &Viewport, rows: &RowStore, out: &mut OutputBuffer) {
    // Writes into an OutputBuffer cannot fail.
    ansi::cursor_hide(out).ok();
    ansi::cursor_home(out).ok();

    draw_rows(view, rows, out);

    let (y, x) = view.screen_cursor();
    ansi::cursor_to(out, y, x).ok();
    ansi::cursor_show(out).ok();
}

fn draw_rows(view: &Viewport, rows: &RowStore, out: &mut OutputBuffer) {
    let screen_rows = view.screen_rows();
    let cols = view.screen_cols();

    for (y, file_row) in view.visible_rows().enumerate() {
        if let Some(row) = rows.row_at(file_row) {
            out.append(row.truncated(cols));
        } else if rows.is_empty() && y == screen_rows / 3 {
            draw_welcome(out, cols);
        } else {
            out.append(TILDE);
        }

        ansi::clear_line(out).ok();
        if y + 1 < screen_rows {
            out.append(b"\r\n");
        }
    }
}

/// Centered banner, truncated to `cols`, led by the `~` marker.
///
/// The `~` takes the first padding column, so the banner text sits at the
/// same position it would without it.
fn draw_welcome(out: &mut OutputBuffer, cols: usize) {
    let message = welcome_message();
    let text = &message.as_bytes()[..message.len().min(cols)];

    let mut padding = (cols - text.len()) / 2;
    if padding > 0 {
        out.append(TILDE);
        padding -= 1;
    }
    out.append_repeated(b' ', padding);
    out.append(text);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Direction;
    use kilo_term::terminal::Size;
    use pretty_assertions::assert_eq;

    fn rows_of(text: &[u8]) -> RowStore {
        let mut rows = RowStore::new();
        rows.read_lines(text).unwrap();
        rows
    }

    /// Render and return the frame as a string.
    fn frame(view: &mut Viewport, rows: &RowStore) -> String {
        let mut out = OutputBuffer::new();
        refresh(view, rows, &mut out);
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    /// The screen rows of a frame, with the framing sequences removed.
    fn screen_lines(frame: &str) -> Vec<String> {
        let body = frame
            .strip_prefix("\x1b[?25l\x1b[H")
            .expect("frame starts by hiding and homing the cursor");
        let end = body.rfind("\x1b[K").expect("frame has rows");
        body[..end]
            .split("\x1b[K\r\n")
            .map(str::to_owned)
            .collect()
    }

    // -- Framing ------------------------------------------------------------

    #[test]
    fn frame_starts_hidden_and_homed() {
        let f = frame(&mut Viewport::new(Size::new(3, 10)), &rows_of(b"a\n"));
        assert!(f.starts_with("\x1b[?25l\x1b[H"));
    }

    #[test]
    fn frame_ends_with_cursor_then_show() {
        let f = frame(&mut Viewport::new(Size::new(3, 10)), &rows_of(b"a\n"));
        assert!(f.ends_with("\x1b[K\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn no_newline_after_last_row() {
        let f = frame(&mut Viewport::new(Size::new(3, 10)), &rows_of(b"a\n"));
        assert_eq!(f.matches("\r\n").count(), 2);
        assert_eq!(f.matches("\x1b[K").count(), 3);
    }

    #[test]
    fn full_frame_bytes() {
        let f = frame(&mut Viewport::new(Size::new(3, 10)), &rows_of(b"hi\n"));
        assert_eq!(
            f,
            "\x1b[?25l\x1b[H\
             hi\x1b[K\r\n\
             ~\x1b[K\r\n\
             ~\x1b[K\
             \x1b[1;1H\x1b[?25h"
        );
    }

    // -- Welcome ------------------------------------------------------------

    #[test]
    fn empty_buffer_24x80_shows_banner_on_row_8() {
        let f = frame(&mut Viewport::new(Size::new(24, 80)), &RowStore::new());
        let lines = screen_lines(&f);

        assert_eq!(lines.len(), 24);
        for (y, line) in lines.iter().enumerate() {
            if y == 8 {
                let msg = welcome_message();
                let padding = (80 - msg.len()) / 2;
                let expected = format!("~{}{msg}", " ".repeat(padding - 1));
                assert_eq!(line, &expected);
            } else {
                assert_eq!(line, "~");
            }
        }
        assert!(f.ends_with("\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn banner_text() {
        assert_eq!(welcome_message(), "Kilo editor -- version 0.0.1");
    }

    #[test]
    fn banner_truncated_on_narrow_screen() {
        let f = frame(&mut Viewport::new(Size::new(3, 10)), &RowStore::new());
        let lines = screen_lines(&f);
        // 3 / 3 = row 1. Text fills the width, so no padding and no tilde.
        assert_eq!(lines[1], "Kilo edito");
    }

    #[test]
    fn banner_with_single_padding_column() {
        let msg = welcome_message();
        let cols = u16::try_from(msg.len() + 2).unwrap();
        let f = frame(&mut Viewport::new(Size::new(3, cols)), &RowStore::new());
        let lines = screen_lines(&f);
        assert_eq!(lines[1], format!("~{msg}"));
    }

    #[test]
    fn no_banner_when_file_has_rows() {
        let f = frame(&mut Viewport::new(Size::new(24, 80)), &rows_of(b"x\n"));
        assert!(!f.contains("Kilo editor"));
    }

    // -- Content ------------------------------------------------------------

    #[test]
    fn long_row_truncated_to_width() {
        let mut text = vec![b'x'; 200];
        text.push(b'\n');
        let f = frame(&mut Viewport::new(Size::new(2, 80)), &rows_of(&text));
        let lines = screen_lines(&f);
        assert_eq!(lines[0].len(), 80);
        assert_eq!(f.matches('x').count(), 80);
    }

    #[test]
    fn empty_row_renders_blank_not_tilde() {
        let f = frame(&mut Viewport::new(Size::new(3, 10)), &rows_of(b"a\n\n"));
        assert_eq!(screen_lines(&f), vec!["a", "", "~"]);
    }

    // -- Scrolling ----------------------------------------------------------

    #[test]
    fn scrolled_frame_shows_later_rows() {
        let rows = rows_of(b"abc\ndefgh\n\n");
        let mut view = Viewport::new(Size::new(2, 80));

        assert_eq!(screen_lines(&frame(&mut view, &rows)), vec!["abc", "defgh"]);

        view.move_cursor(Direction::Down, rows.row_count());
        view.move_cursor(Direction::Down, rows.row_count());
        let f = frame(&mut view, &rows);

        assert_eq!(view.row_offset(), 1);
        assert_eq!(screen_lines(&f), vec!["defgh", ""]);
        assert!(f.ends_with("\x1b[2;1H\x1b[?25h"));
    }

    #[test]
    fn cursor_on_sentinel_row_shows_tilde() {
        let rows = rows_of(b"one\n");
        let mut view = Viewport::new(Size::new(3, 10));
        view.move_cursor(Direction::Down, rows.row_count());
        let f = frame(&mut view, &rows);
        assert_eq!(screen_lines(&f), vec!["one", "~", "~"]);
        assert!(f.ends_with("\x1b[2;1H\x1b[?25h"));
    }

    #[test]
    fn cursor_column_is_one_based() {
        let rows = rows_of(b"hello\n");
        let mut view = Viewport::new(Size::new(3, 10));
        for _ in 0..4 {
            view.move_cursor(Direction::Right, rows.row_count());
        }
        let f = frame(&mut view, &rows);
        assert!(f.ends_with("\x1b[1;5H\x1b[?25h"));
    }

    #[test]
    fn draw_frame_does_not_scroll() {
        let rows = rows_of(b"a\nb\nc\n");
        let mut view = Viewport::new(Size::new(1, 10));
        view.move_cursor(Direction::Down, rows.row_count());

        let mut out = OutputBuffer::new();
        draw_frame(&view, &rows, &mut out);
        assert_eq!(view.row_offset(), 0);
    }
}
