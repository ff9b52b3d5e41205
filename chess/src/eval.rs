//! Static position evaluation
//!
//! Material plus piece-square bonuses. The tables are written from White's point of view with
//! rank 8 on top, like a diagram; Black uses the same tables mirrored by rank.

use crate::position::Position;
use crate::types::{Cell, Color, Coord, Piece};

#[rustfmt::skip]
const PAWN: [i32; Coord::COUNT] = [
     0,   0,   0,   0,   0,   0,   0,   0,
    50,  50,  50,  50,  50,  50,  50,  50,
    10,  10,  20,  30,  30,  20,  10,  10,
     5,   5,  10,  25,  25,  10,   5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     5,  10,  10, -20, -20,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT: [i32; Coord::COUNT] = [
   -50, -40, -30, -30, -30, -30, -40, -50,
   -40, -20,   0,   0,   0,   0, -20, -40,
   -30,   0,  10,  15,  15,  10,   0, -30,
   -30,   5,  15,  20,  20,  15,   5, -30,
   -30,   0,  15,  20,  20,  15,   0, -30,
   -30,   5,  10,  15,  15,  10,   5, -30,
   -40, -20,   0,   5,   5,   0, -20, -40,
   -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP: [i32; Coord::COUNT] = [
   -20, -10, -10, -10, -10, -10, -10, -20,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -10,   0,   5,  10,  10,   5,   0, -10,
   -10,   5,   5,  10,  10,   5,   5, -10,
   -10,   0,  10,  10,  10,  10,   0, -10,
   -10,  10,  10,  10,  10,  10,  10, -10,
   -10,   5,   0,   0,   0,   0,   5, -10,
   -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK: [i32; Coord::COUNT] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10,  10,  10,  10,  10,   5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN: [i32; Coord::COUNT] = [
   -20, -10, -10,  -5,  -5, -10, -10, -20,
   -10,   0,   0,   0,   0,   0,   0, -10,
   -10,   0,   5,   5,   5,   5,   0, -10,
    -5,   0,   5,   5,   5,   5,   0,  -5,
     0,   0,   5,   5,   5,   5,   0,  -5,
   -10,   5,   5,   5,   5,   5,   0, -10,
   -10,   0,   5,   0,   0,   0,   0, -10,
   -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING: [i32; Coord::COUNT] = [
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -20, -30, -30, -40, -40, -30, -30, -20,
   -10, -20, -20, -20, -20, -20, -20, -10,
    20,  20,   0,   0,   0,   0,  20,  20,
    20,  30,  10,   0,   0,  10,  30,  20,
];

/// Evaluation weights
///
/// `material` and `squares` are indexed by [`Piece::index()`]. Each piece-square table lists
/// squares from a8 to h8, then a7 to h7, and so on down to h1, as seen by White.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weights {
    pub material: [i32; Piece::COUNT],
    pub squares: [[i32; Coord::COUNT]; Piece::COUNT],
}

impl Weights {
    /// Standard weights, in centipawns
    pub const STANDARD: Weights = Weights {
        material: [100, 320, 330, 500, 900, 20000],
        squares: [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING],
    };

    /// Returns the piece-square bonus of `cell` standing on `coord`
    #[inline]
    pub fn square_bonus(&self, cell: Cell, coord: Coord) -> i32 {
        let idx = match cell.color() {
            Color::White => coord.flipped_rank().index(),
            Color::Black => coord.index(),
        };
        self.squares[cell.piece().index()][idx]
    }

    /// Returns the full value of `cell` standing on `coord`
    #[inline]
    pub fn value(&self, cell: Cell, coord: Coord) -> i32 {
        self.material[cell.piece().index()] + self.square_bonus(cell, coord)
    }
}

impl Default for Weights {
    #[inline]
    fn default() -> Weights {
        Weights::STANDARD
    }
}

/// Sums the values of all the live pieces of `color`
pub fn side_total(weights: &Weights, pos: &Position, color: Color) -> i32 {
    pos.slots(color)
        .iter()
        .filter_map(|s| s.location().map(|c| weights.value(s.cell(), c)))
        .sum()
}

/// Evaluates `pos` from the point of view of `side`
///
/// Positive scores favor `side`. The score for Black is always the negated score for White.
pub fn evaluate_with(weights: &Weights, pos: &Position, side: Color) -> i32 {
    let score = side_total(weights, pos, Color::White) - side_total(weights, pos, Color::Black);
    match side {
        Color::White => score,
        Color::Black => -score,
    }
}

/// Evaluates `pos` from the point of view of `side` with the standard weights
#[inline]
pub fn evaluate(pos: &Position, side: Color) -> i32 {
    evaluate_with(&Weights::STANDARD, pos, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;
    use crate::moves::{self, PromotePiece};
    use crate::position::{RawPosition, KING_SLOT};
    use crate::table::MoveTable;
    use std::str::FromStr;

    fn c(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_initial() {
        let pos = Position::initial();
        assert_eq!(evaluate(&pos, Color::White), 0);
        assert_eq!(evaluate(&pos, Color::Black), 0);
        // 8 pawns, 2 knights, 2 bishops, 2 rooks, queen and king, with their back-rank bonuses
        let material = 8 * 100 + 2 * 320 + 2 * 330 + 2 * 500 + 900 + 20000;
        let squares = (5 + 10 + 10 - 20 - 20 + 10 + 10 + 5) + (-40 - 40) + (-10 - 10) + 0 - 5 + 0;
        assert_eq!(
            side_total(&Weights::STANDARD, &pos, Color::White),
            material + squares
        );
        assert_eq!(
            side_total(&Weights::STANDARD, &pos, Color::Black),
            material + squares
        );
    }

    #[test]
    fn test_square_bonus() {
        let w = Weights::default();
        let wp = Cell::from_parts(Color::White, Piece::Pawn);
        let bp = Cell::from_parts(Color::Black, Piece::Pawn);
        assert_eq!(w.square_bonus(wp, c("d2")), -20);
        assert_eq!(w.square_bonus(bp, c("d7")), -20);
        assert_eq!(w.square_bonus(wp, c("a7")), 50);
        assert_eq!(w.square_bonus(bp, c("a2")), 50);
        let wk = Cell::from_parts(Color::White, Piece::King);
        let bk = Cell::from_parts(Color::Black, Piece::King);
        assert_eq!(w.square_bonus(wk, c("g1")), 30);
        assert_eq!(w.square_bonus(bk, c("g8")), 30);
        assert_eq!(w.value(wk, c("e1")), 20000);
    }

    #[test]
    fn test_symmetry() {
        let table = MoveTable::build();
        let pos = Position::initial();
        let succ = movegen::expand(&table, &pos, Color::White);
        // e2-e4 moves the pawn from -20 to +20
        assert_eq!(evaluate(&succ[9], Color::White), 40);
        for p in succ {
            assert_eq!(evaluate(&p, Color::White), -evaluate(&p, Color::Black));
        }
    }

    #[test]
    fn test_capture() {
        let pos = Position::initial();
        let before = evaluate(&pos, Color::White);
        let mut raw = RawPosition::initial();
        raw.remove(Color::Black, 14);
        let after = evaluate(&Position::try_from(raw).unwrap(), Color::White);
        // Black queen on d8 is worth 900 - 5
        assert_eq!(after - before, 895);
    }

    #[test]
    fn test_applied_capture() {
        let mut raw = RawPosition::empty();
        raw.put(Color::White, KING_SLOT, Piece::King, c("e1"));
        raw.put(Color::Black, KING_SLOT, Piece::King, c("e8"));
        raw.put(Color::White, 8, Piece::Rook, c("a3"));
        raw.put(Color::Black, 10, Piece::Knight, c("a6"));
        let pos = Position::try_from(raw).unwrap();

        // The rook bonus is -5 on both a3 and a6, so only the knight's value changes hands
        let next = moves::apply(&pos, 8, c("a6"), Color::White);
        let w = &Weights::STANDARD;
        let knight = w.value(Cell::from_parts(Color::Black, Piece::Knight), c("a6"));
        assert_eq!(knight, 320 - 30);
        assert_eq!(
            evaluate(&next, Color::White) - evaluate(&pos, Color::White),
            knight
        );
        assert_eq!(
            side_total(w, &pos, Color::Black) - side_total(w, &next, Color::Black),
            knight
        );
        assert_eq!(
            side_total(w, &next, Color::White),
            side_total(w, &pos, Color::White)
        );
    }

    #[test]
    fn test_promotion() {
        let mut raw = RawPosition::empty();
        raw.put(Color::White, KING_SLOT, Piece::King, c("e1"));
        raw.put(Color::Black, KING_SLOT, Piece::King, c("e8"));
        raw.put(Color::White, 6, Piece::Pawn, c("g7"));
        let pos = Position::try_from(raw).unwrap();

        let next = moves::apply_promotion(&pos, 6, c("g8"), Color::White, PromotePiece::Queen);
        let w = &Weights::STANDARD;
        let delta = (900 - 100) + w.squares[Piece::Queen.index()][6]
            - w.squares[Piece::Pawn.index()][8 + 6];
        assert_eq!(delta, 800 - 10 - 50);
        assert_eq!(
            evaluate(&next, Color::White) - evaluate(&pos, Color::White),
            delta
        );
    }

    #[test]
    fn test_custom_weights() {
        let mut w = Weights::STANDARD;
        w.squares = [[0; Coord::COUNT]; Piece::COUNT];
        w.material[Piece::King.index()] = 0;

        let mut raw = RawPosition::initial();
        raw.remove(Color::White, 0);
        raw.remove(Color::White, 10);
        let pos = Position::try_from(raw).unwrap();
        assert_eq!(evaluate_with(&w, &pos, Color::Black), 420);
        assert_eq!(evaluate_with(&w, &pos, Color::White), -420);
    }
}
