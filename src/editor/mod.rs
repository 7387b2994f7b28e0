//! Article source buffer.
//!
//! A rope-backed text buffer with cursor management, driven by the
//! editor messages of the TEA loop.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};
