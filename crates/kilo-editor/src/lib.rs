//! # kilo-editor — Editor core for kilo
//!
//! The state and logic above the terminal layer:
//!
//! - **[`row`]** — `Row` and `RowStore`, the file's lines as byte buffers
//! - **[`viewport`]** — cursor position, vertical scroll, boundary clamps
//! - **[`render`]** — composes one frame into kilo-term's `OutputBuffer`
//! - **[`dispatch`]** — maps decoded keys to cursor motion or quit
//! - **[`editor`]** — `Editor`, the context struct that ties them together
//!   and plugs into kilo-term's event loop

pub mod dispatch;
pub mod editor;
pub mod error;
pub mod render;
pub mod row;
pub mod viewport;

pub use editor::Editor;
pub use error::{Error, Result};
