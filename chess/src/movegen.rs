//! Move generation and successor expansion
//!
//! The generator walks the rays of [`MoveTable`] for every live slot of the moving side and
//! resolves blocking against the current occupancy:
//!
//! - a square with an own piece stops the ray, and is not a destination;
//! - [`RayKind::Slide`] rays include the first opposing piece as a capture, then stop;
//! - [`RayKind::Advance`] rays are quiet-only and stop at any occupied square;
//! - [`RayKind::Capture`] rays yield a move only onto an opposing piece.
//!
//! Moves come out in slot order, then ray order, then distance along the ray. Nothing is
//! checked for king safety, so the successors are pseudo-legal.

use crate::moves::{self, Move, PromotePiece};
use crate::position::Position;
use crate::table::{MoveTable, RayKind};
use crate::types::Color;

use std::collections::TryReserveError;
use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::slice;

use thiserror::Error;

/// Error expanding successor positions
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ExpandError {
    /// Successor buffer cannot grow
    #[error("cannot allocate successor positions: {0}")]
    Alloc(#[from] TryReserveError),
}

/// What to do with pawns reaching the last rank
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Promotion {
    /// Keep the pawn as a pawn; promotion is left to the caller
    #[default]
    Defer,
    /// Always promote to a queen
    Queen,
    /// Yield one successor per promotion piece, in the order of [`PromotePiece::ALL`]
    All,
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(Vec<Move>);

impl Deref for MoveList {
    type Target = Vec<Move>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut MoveList {
    type Item = &'a mut Move;
    type IntoIter = slice::IterMut<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(Vec::new())
    }
}

pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

/// Splits moves onto the last rank according to the promotion policy
struct Promoter<'a, P> {
    pos: &'a Position,
    promotion: Promotion,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> MaybeMovePush for Promoter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        if !moves::is_promotion(self.pos, mv.side(), mv.slot(), mv.dst()) {
            return self.inner.push(mv);
        }
        match self.promotion {
            Promotion::Defer => self.inner.push(mv),
            Promotion::Queen => self.inner.push(mv.with_promote(PromotePiece::Queen)),
            Promotion::All => {
                for p in PromotePiece::ALL {
                    self.inner.push(mv.with_promote(p))?;
                }
                Ok(())
            }
        }
    }
}

/// Applies moves, collecting the successors
struct Successors<'a> {
    pos: &'a Position,
    dst: &'a mut Vec<Position>,
}

impl<'a> MovePush for Successors<'a> {
    fn push(&mut self, mv: Move) {
        self.dst.push(mv.apply(self.pos));
    }
}

/// Applies moves, collecting the successors without aborting on allocation failure
struct TrySuccessors<'a> {
    pos: &'a Position,
    dst: &'a mut Vec<Position>,
}

impl<'a> MaybeMovePush for TrySuccessors<'a> {
    type Err = ExpandError;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        self.dst.try_reserve(1)?;
        self.dst.push(mv.apply(self.pos));
        Ok(())
    }
}

/// Counts moves without storing them
struct Counter(u64);

impl MovePush for Counter {
    fn push(&mut self, _m: Move) {
        self.0 += 1;
    }
}

fn gen_impl<P: MaybeMovePush>(
    table: &MoveTable,
    pos: &Position,
    side: Color,
    dst: &mut P,
) -> Result<(), P::Err> {
    let own = pos.occupancy(side);
    let enemy = pos.occupancy(side.inv());
    for (idx, slot) in pos.slots(side).iter().enumerate() {
        let src = match slot.location() {
            Some(src) => src,
            None => continue,
        };
        for ray in table.rays(slot.cell(), src) {
            for to in ray.iter() {
                if own.has(to) {
                    break;
                }
                let capture = enemy.has(to);
                match ray.kind() {
                    RayKind::Slide => {
                        dst.push(Move::new(side, idx, src, to))?;
                        if capture {
                            break;
                        }
                    }
                    RayKind::Advance => {
                        if capture {
                            break;
                        }
                        dst.push(Move::new(side, idx, src, to))?;
                    }
                    RayKind::Capture => {
                        if capture {
                            dst.push(Move::new(side, idx, src, to))?;
                        }
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

fn unwrap_infallible<T>(res: Result<T, Infallible>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => match e {},
    }
}

/// Generates all the moves of `side` into `dst`
///
/// Pawns reaching the last rank are not promoted.
pub fn gen_moves_into<P: MovePush>(
    table: &MoveTable,
    pos: &Position,
    side: Color,
    dst: &mut P,
) {
    unwrap_infallible(gen_impl(table, pos, side, dst))
}

/// Generates all the moves of `side`
pub fn gen_moves(table: &MoveTable, pos: &Position, side: Color) -> MoveList {
    let mut res = MoveList::new();
    gen_moves_into(table, pos, side, &mut res);
    res
}

/// Generates all the moves of `side`, handling promotions according to `promotion`
pub fn gen_moves_with(
    table: &MoveTable,
    pos: &Position,
    side: Color,
    promotion: Promotion,
) -> MoveList {
    let mut res = MoveList::new();
    let mut p = Promoter {
        pos,
        promotion,
        inner: &mut res,
    };
    unwrap_infallible(gen_impl(table, pos, side, &mut p));
    res
}

/// Returns every position reachable by one move of `side`
///
/// Successors come in the move generation order. An empty result means that `side` has no
/// moves at all, which the caller treats as a terminal position.
pub fn expand(table: &MoveTable, pos: &Position, side: Color) -> Vec<Position> {
    expand_with(table, pos, side, Promotion::Defer)
}

/// Same as [`expand()`], but handles promotions according to `promotion`
pub fn expand_with(
    table: &MoveTable,
    pos: &Position,
    side: Color,
    promotion: Promotion,
) -> Vec<Position> {
    let mut res = Vec::new();
    let mut succ = Successors { pos, dst: &mut res };
    let mut p = Promoter {
        pos,
        promotion,
        inner: &mut succ,
    };
    unwrap_infallible(gen_impl(table, pos, side, &mut p));
    res
}

/// Appends every successor of `pos` for `side` to `dst`
///
/// Returns the number of appended positions. If the buffer cannot grow, returns
/// [`ExpandError::Alloc`]; the successors appended before the failure stay in `dst`.
pub fn try_expand_into(
    table: &MoveTable,
    pos: &Position,
    side: Color,
    promotion: Promotion,
    dst: &mut Vec<Position>,
) -> Result<usize, ExpandError> {
    let start = dst.len();
    let mut succ = TrySuccessors { pos, dst };
    let mut p = Promoter {
        pos,
        promotion,
        inner: &mut succ,
    };
    gen_impl(table, pos, side, &mut p)?;
    Ok(succ.dst.len() - start)
}

/// Counts the leaf positions of the move tree of depth `depth`, with `side` moving first
pub fn perft(table: &MoveTable, pos: &Position, side: Color, depth: usize) -> u64 {
    match depth {
        0 => 1,
        1 => {
            let mut cnt = Counter(0);
            gen_moves_into(table, pos, side, &mut cnt);
            cnt.0
        }
        _ => expand(table, pos, side)
            .iter()
            .map(|p| perft(table, p, side.inv(), depth - 1))
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Bitboard;
    use crate::position::{RawPosition, KING_SLOT};
    use crate::types::{Coord, Piece};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::str::FromStr;
    use std::sync::Arc;
    use std::thread;

    fn c(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn position(pieces: &[(Color, usize, Piece, &str)]) -> Position {
        let mut raw = RawPosition::empty();
        for &(color, slot, piece, coord) in pieces {
            raw.put(color, slot, piece, c(coord));
        }
        Position::try_from(raw).unwrap()
    }

    fn dsts(moves: &MoveList) -> Vec<String> {
        moves.iter().map(|m| m.dst().to_string()).collect()
    }

    #[test]
    fn test_initial() {
        let table = MoveTable::build();
        let pos = Position::initial();

        let moves = gen_moves(&table, &pos, Color::White);
        assert_eq!(moves.len(), 20);
        assert_eq!(
            dsts(&moves),
            [
                "a3", "a4", "b3", "b4", "c3", "c4", "d3", "d4", "e3", "e4", "f3", "f4", "g3", "g4",
                "h3", "h4", "c3", "a3", "h3", "f3",
            ]
        );
        let slots: Vec<_> = moves.iter().map(|m| m.slot()).collect();
        assert_eq!(
            slots,
            [0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 10, 10, 11, 11]
        );

        let succ = expand(&table, &pos, Color::White);
        assert_eq!(succ.len(), 20);
        for (mv, p) in moves.iter().zip(&succ) {
            assert_eq!(*p, mv.apply(&pos));
            assert_eq!(p.validate(), Ok(()));
            assert_eq!(p.occupancy(Color::White).len(), 16);
            assert_eq!(p.occupancy(Color::Black), pos.occupancy(Color::Black));
        }

        assert_eq!(expand(&table, &pos, Color::Black).len(), 20);
        assert_eq!(
            dsts(&gen_moves(&table, &pos, Color::Black))[..2],
            ["a6", "a5"]
        );
    }

    #[test]
    fn test_perft() {
        let table = MoveTable::build();
        let pos = Position::initial();
        assert_eq!(perft(&table, &pos, Color::White, 0), 1);
        assert_eq!(perft(&table, &pos, Color::White, 1), 20);
        assert_eq!(perft(&table, &pos, Color::White, 2), 400);
    }

    #[test]
    fn test_slider() {
        let table = MoveTable::build();
        let pos = position(&[
            (Color::White, 8, Piece::Rook, "d4"),
            (Color::White, 0, Piece::Pawn, "d6"),
            (Color::Black, 10, Piece::Knight, "f4"),
            (Color::Black, 11, Piece::Knight, "g4"),
        ]);
        let moves = gen_moves(&table, &pos, Color::White);
        let rook: Vec<_> = moves
            .iter()
            .filter(|m| m.slot() == 8)
            .map(|m| m.dst().to_string())
            .collect();
        assert_eq!(
            rook,
            ["d5", "e4", "f4", "d3", "d2", "d1", "c4", "b4", "a4"]
        );

        let succ = expand(&table, &pos, Color::White);
        let captured: Vec<_> = succ
            .iter()
            .filter(|p| p.slot(Color::Black, 10).is_captured())
            .collect();
        assert_eq!(captured.len(), 1);
        assert_eq!(
            captured[0].occupancy(Color::Black),
            Bitboard::from_coord(c("g4"))
        );
    }

    #[test]
    fn test_pawns() {
        let table = MoveTable::build();
        let pos = position(&[
            (Color::White, 4, Piece::Pawn, "e2"),
            (Color::White, 3, Piece::Pawn, "d4"),
            (Color::Black, 4, Piece::Pawn, "e3"),
            (Color::Black, 3, Piece::Pawn, "c5"),
            (Color::Black, 8, Piece::Rook, "d5"),
        ]);

        // e2 is blocked, and d4 can only capture on c5
        let moves = gen_moves(&table, &pos, Color::White);
        assert_eq!(dsts(&moves), ["c5"]);
        assert_eq!(moves[0].slot(), 3);

        let pos = position(&[
            (Color::White, 4, Piece::Pawn, "e2"),
            (Color::Black, 4, Piece::Pawn, "e4"),
        ]);
        assert_eq!(dsts(&gen_moves(&table, &pos, Color::White)), ["e3"]);
        assert_eq!(dsts(&gen_moves(&table, &pos, Color::Black)), ["e3"]);
    }

    #[test]
    fn test_king() {
        let table = MoveTable::build();
        let pos = position(&[
            (Color::White, KING_SLOT, Piece::King, "a1"),
            (Color::White, 0, Piece::Pawn, "a2"),
            (Color::Black, 8, Piece::Rook, "b2"),
        ]);
        let moves: Vec<_> = gen_moves(&table, &pos, Color::White)
            .into_iter()
            .filter(|m| m.slot() == KING_SLOT)
            .map(|m| m.dst().to_string())
            .collect();
        assert_eq!(moves, ["b2", "b1"]);
    }

    #[test]
    fn test_captured_slots_skipped() {
        let table = MoveTable::build();
        let mut raw = RawPosition::initial();
        for slot in 0..8 {
            raw.remove(Color::White, slot);
        }
        raw.remove(Color::White, 10);
        raw.remove(Color::White, 11);
        let pos = Position::try_from(raw).unwrap();
        let moves = gen_moves(&table, &pos, Color::White);
        assert!(moves.iter().all(|m| !pos.slot(Color::White, m.slot()).is_captured()));
        // Rooks 6+1 each, bishops 7 each, queen 6+4+3, king 3
        assert_eq!(moves.len(), 7 + 7 + 7 + 7 + 13 + 3);

        let raw = RawPosition::empty();
        let pos = Position::try_from(raw).unwrap();
        assert!(expand(&table, &pos, Color::White).is_empty());
    }

    #[test]
    fn test_promotion_policies() {
        let table = MoveTable::build();
        let pos = position(&[
            (Color::White, 1, Piece::Pawn, "b7"),
            (Color::Black, 8, Piece::Rook, "a8"),
            (Color::Black, KING_SLOT, Piece::King, "h8"),
        ]);

        let deferred = expand(&table, &pos, Color::White);
        assert_eq!(deferred, expand_with(&table, &pos, Color::White, Promotion::Defer));
        assert_eq!(deferred.len(), 2);
        assert!(deferred
            .iter()
            .all(|p| p.slot(Color::White, 1).piece() == Piece::Pawn));

        let queens = expand_with(&table, &pos, Color::White, Promotion::Queen);
        assert_eq!(queens.len(), 2);
        assert!(queens
            .iter()
            .all(|p| p.slot(Color::White, 1).piece() == Piece::Queen));

        let all = expand_with(&table, &pos, Color::White, Promotion::All);
        let pieces: Vec<_> = all.iter().map(|p| p.slot(Color::White, 1).piece()).collect();
        assert_eq!(
            pieces,
            [
                Piece::Queen,
                Piece::Rook,
                Piece::Bishop,
                Piece::Knight,
                Piece::Queen,
                Piece::Rook,
                Piece::Bishop,
                Piece::Knight,
            ]
        );
        assert_eq!(all[0].slot(Color::White, 1).location(), Some(c("b8")));
        assert_eq!(all[4].slot(Color::White, 1).location(), Some(c("a8")));
        assert!(all[4].slot(Color::Black, 8).is_captured());

        let moves = gen_moves_with(&table, &pos, Color::White, Promotion::All);
        assert_eq!(moves.len(), 8);
        assert_eq!(moves[3].promote(), Some(PromotePiece::Knight));
    }

    #[test]
    fn test_try_expand_into() {
        let table = MoveTable::build();
        let pos = Position::initial();
        let mut buf = vec![pos.clone()];
        let n = try_expand_into(&table, &pos, Color::White, Promotion::Defer, &mut buf).unwrap();
        assert_eq!(n, 20);
        assert_eq!(buf.len(), 21);
        assert_eq!(buf[1..], expand(&table, &pos, Color::White)[..]);
    }

    #[test]
    fn test_deterministic() {
        let table = MoveTable::build();
        let pos = Position::initial();
        let a = expand(&table, &pos, Color::White);
        let b = expand(&table, &pos, Color::White);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_table() {
        let table = Arc::new(MoveTable::build());
        let handles: Vec<_> = Color::iter()
            .map(|side| {
                let table = Arc::clone(&table);
                thread::spawn(move || expand(&table, &Position::initial(), side).len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 20);
        }
    }

    #[test]
    fn test_random_playout() {
        let table = MoveTable::build();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut pos = Position::initial();
            let mut side = Color::White;
            for _ in 0..200 {
                let succ = expand_with(&table, &pos, side, Promotion::All);
                if succ.is_empty() {
                    break;
                }
                for p in &succ {
                    assert_eq!(p.validate(), Ok(()));
                    assert_eq!(p.occupancy(side).len(), pos.occupancy(side).len());
                    let lost = pos.occupancy(side.inv()).len() - p.occupancy(side.inv()).len();
                    assert!(lost <= 1);
                }
                pos = succ[rng.gen_range(0..succ.len())].clone();
                side = side.inv();
            }
            let live = pos
                .slots(Color::White)
                .iter()
                .chain(pos.slots(Color::Black))
                .filter(|s| !s.is_captured())
                .count();
            assert_eq!(live as u32, pos.all().len());
            assert!(Color::iter().all(|c| pos.slots(c).iter().all(|s| s.cell().color() == c)));
        }
    }
}
