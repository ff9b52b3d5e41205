//! Moves and the move applier

mod base;

pub use base::*;
