//! Zobrist keys for piece placement
//!
//! The keys are generated by the build script from a fixed seed, so hashes are stable between
//! builds and can be stored alongside cached search results.

use crate::types::{Cell, Coord};

include!(concat!(env!("OUT_DIR"), "/zobrist.rs"));

#[inline]
pub fn pieces(cell: Cell, coord: Coord) -> u64 {
    unsafe {
        *PIECES
            .get_unchecked(cell.index())
            .get_unchecked(coord.index())
    }
}
