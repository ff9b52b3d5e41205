//! Direction vectors and color-dependent pawn geometry
//!
//! All directions are `(delta_file, delta_rank)` pairs. Lists are ordered clockwise, starting
//! from north (towards rank 8); the order defines the ray indices of the move tables.

use crate::types::{Color, Rank};

pub type Direction = (isize, isize);

pub const ROOK_DIRS: [Direction; 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const BISHOP_DIRS: [Direction; 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

pub const QUEEN_DIRS: [Direction; 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const KING_DIRS: [Direction; 8] = QUEEN_DIRS;

/// Knight jumps, clockwise from "two up, one right"
pub const KNIGHT_JUMPS: [Direction; 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const fn pawn_forward(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

pub const fn pawn_home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn promotion_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

pub const fn back_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}
