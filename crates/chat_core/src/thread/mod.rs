//! Thread module - edit-history threads
//!
//! Rebuilds the original/versions grouping from a flat message list and
//! tracks which version of each thread is on screen.

mod cursor;
mod tree;

pub use cursor::{Direction, ThreadCursors};
pub use tree::{reconstruct, Thread};
