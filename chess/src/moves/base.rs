use crate::geometry;
use crate::position::{Position, SLOT_COUNT};
use crate::table::{self, MoveTable, RayKind};
use crate::types::{Color, Coord, Piece};

use thiserror::Error;

/// Piece a pawn can promote to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
}

impl PromotePiece {
    /// All the promotion pieces, from the strongest to the weakest
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Queen,
        PromotePiece::Rook,
        PromotePiece::Bishop,
        PromotePiece::Knight,
    ];

    #[inline]
    pub const fn piece(&self) -> Piece {
        match *self {
            PromotePiece::Knight => Piece::Knight,
            PromotePiece::Bishop => Piece::Bishop,
            PromotePiece::Rook => Piece::Rook,
            PromotePiece::Queen => Piece::Queen,
        }
    }
}

impl From<PromotePiece> for Piece {
    #[inline]
    fn from(p: PromotePiece) -> Piece {
        p.piece()
    }
}

impl TryFrom<Piece> for PromotePiece {
    type Error = ();

    #[inline]
    fn try_from(p: Piece) -> Result<PromotePiece, ()> {
        match p {
            Piece::Knight => Ok(PromotePiece::Knight),
            Piece::Bishop => Ok(PromotePiece::Bishop),
            Piece::Rook => Ok(PromotePiece::Rook),
            Piece::Queen => Ok(PromotePiece::Queen),
            Piece::Pawn | Piece::King => Err(()),
        }
    }
}

/// Error validating a move against a position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    /// Slot index is not less than [`SLOT_COUNT`]
    #[error("slot index {0} out of range")]
    BadSlot(usize),
    /// The piece in the slot was captured
    #[error("piece in slot {0} is captured")]
    Captured(usize),
    /// The piece doesn't stand on the source square
    #[error("piece in slot {slot} stands on {actual}, not on {src}")]
    WrongSource {
        slot: usize,
        src: Coord,
        actual: Coord,
    },
    /// The destination doesn't lie on any ray of the piece
    #[error("{dst} is not reachable from {src}")]
    Unreachable { src: Coord, dst: Coord },
    /// Another piece stands between the source and the destination
    #[error("path from {src} to {dst} is blocked")]
    Blocked { src: Coord, dst: Coord },
    /// The destination holds a piece of the moving side
    #[error("destination {0} holds own piece")]
    OwnPiece(Coord),
    /// Pawn advances onto an occupied square
    #[error("pawn cannot advance onto occupied {0}")]
    AdvanceOccupied(Coord),
    /// Pawn moves diagonally without capturing
    #[error("pawn cannot move to {0} without capture")]
    NoCapture(Coord),
    /// Promotion piece given for a move that is not a promotion
    #[error("move to {0} is not a promotion")]
    UnexpectedPromote(Coord),
}

/// Move of one slot to a destination square
///
/// Moves are plain values. They are either produced by [`gen_moves`](crate::movegen::gen_moves)
/// or built by the caller and checked with [`Move::validate()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    side: Color,
    slot: usize,
    src: Coord,
    dst: Coord,
    promote: Option<PromotePiece>,
}

impl Move {
    /// Creates a move of slot `slot` of side `side` from `src` to `dst`
    ///
    /// The move is not checked against any position. Out-of-range slot indices are rejected
    /// later by [`Move::validate()`].
    #[inline]
    pub fn new(side: Color, slot: usize, src: Coord, dst: Coord) -> Move {
        Move {
            side,
            slot,
            src,
            dst,
            promote: None,
        }
    }

    #[inline]
    pub const fn with_promote(self, promote: PromotePiece) -> Move {
        Move {
            promote: Some(promote),
            ..self
        }
    }

    #[inline]
    pub const fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub const fn promote(&self) -> Option<PromotePiece> {
        self.promote
    }

    /// Checks that the move can be made in position `pos`
    ///
    /// A pawn reaching the last rank may move with or without a promotion piece: without one,
    /// it stays a pawn, exactly as [`apply()`] does.
    pub fn validate(&self, table: &MoveTable, pos: &Position) -> Result<(), MoveError> {
        let slot = self.slot();
        if slot >= SLOT_COUNT {
            return Err(MoveError::BadSlot(slot));
        }
        let info = pos.slot(self.side, slot);
        let actual = info.location().ok_or(MoveError::Captured(slot))?;
        if actual != self.src {
            return Err(MoveError::WrongSource {
                slot,
                src: self.src,
                actual,
            });
        }

        let (src, dst) = (self.src, self.dst);
        let (ray_idx, dist) = table
            .locate(info.cell(), src, dst)
            .ok_or(MoveError::Unreachable { src, dst })?;
        let ray = &table.rays(info.cell(), src)[ray_idx];
        let all = pos.all();
        if ray.squares()[..dist].iter().any(|&c| all.has(c)) {
            return Err(MoveError::Blocked { src, dst });
        }
        if pos.occupancy(self.side).has(dst) {
            return Err(MoveError::OwnPiece(dst));
        }
        let enemy = pos.occupancy(self.side.inv()).has(dst);
        match ray.kind() {
            RayKind::Slide => {}
            RayKind::Advance if enemy => return Err(MoveError::AdvanceOccupied(dst)),
            RayKind::Advance => {}
            RayKind::Capture if !enemy => return Err(MoveError::NoCapture(dst)),
            RayKind::Capture => {}
        }

        if self.promote.is_some() && !is_promotion(pos, self.side, slot, dst) {
            return Err(MoveError::UnexpectedPromote(dst));
        }
        Ok(())
    }

    /// Applies the move without validation
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`apply()`] and [`apply_promotion()`].
    #[inline]
    pub fn apply(&self, pos: &Position) -> Position {
        match self.promote {
            Some(p) => apply_promotion(pos, self.slot(), self.dst, self.side, p),
            None => apply(pos, self.slot(), self.dst, self.side),
        }
    }
}

/// Returns `true` if moving slot `slot` of `side` to `dst` is a pawn move onto the last rank
#[inline]
pub fn is_promotion(pos: &Position, side: Color, slot: usize, dst: Coord) -> bool {
    pos.slot(side, slot).piece() == Piece::Pawn && dst.rank() == geometry::promotion_rank(side)
}

#[cfg(feature = "selftest")]
fn selftest(pos: &Position) {
    if let Err(e) = pos.validate() {
        panic!("position invariants broken after move: {}\n{}", e, pos);
    }
}

#[cfg(not(feature = "selftest"))]
#[inline(always)]
fn selftest(_pos: &Position) {}

fn do_apply(pos: &Position, slot: usize, dst: Coord, side: Color) -> Position {
    assert!(slot < SLOT_COUNT, "slot index {} out of range", slot);
    let info = pos.slot(side, slot);
    let src = match info.location() {
        Some(src) => src,
        None => panic!("slot {} of {:?} is captured", slot, side),
    };
    assert_ne!(src, dst, "piece in slot {} moves onto its own square", slot);
    assert!(
        !pos.occupancy(side).has(dst),
        "destination {} holds a piece of the moving side",
        dst
    );
    assert!(
        table::piece_reaches(info.cell(), src, dst),
        "destination {} is not on any ray of {:?} from {}",
        dst,
        info.cell(),
        src
    );

    let mut res = pos.clone();
    if let Some(victim) = pos.slot_at(side.inv(), dst) {
        res.capture(side.inv(), victim);
    }
    res.move_slot(side, slot, dst);
    res
}

/// Moves the piece in slot `slot` of `side` to `dst` and returns the resulting position
///
/// The opposing piece standing on `dst`, if any, is captured. The input position is left
/// intact. A pawn reaching the last rank stays a pawn; use [`apply_promotion()`] to change it.
///
/// # Panics
///
/// Panics if `slot` is out of range, the slot is captured, `dst` is the current square of the
/// piece, `dst` holds a piece of `side`, or `dst` doesn't lie on any ray of the piece from its
/// square. These are caller bugs: the move generator never produces such moves.
pub fn apply(pos: &Position, slot: usize, dst: Coord, side: Color) -> Position {
    let res = do_apply(pos, slot, dst, side);
    selftest(&res);
    res
}

/// Moves the pawn in slot `slot` of `side` to `dst` on the last rank, replacing it with `piece`
///
/// # Panics
///
/// Panics in all the cases [`apply()`] does, and also if the slot doesn't hold a pawn or `dst`
/// is not on the last rank for `side`.
pub fn apply_promotion(
    pos: &Position,
    slot: usize,
    dst: Coord,
    side: Color,
    piece: PromotePiece,
) -> Position {
    assert!(slot < SLOT_COUNT, "slot index {} out of range", slot);
    let cell = pos.slot(side, slot).cell();
    assert_eq!(
        cell.piece(),
        Piece::Pawn,
        "only pawns can promote, slot {} holds {:?}",
        slot,
        cell
    );
    assert_eq!(
        dst.rank(),
        geometry::promotion_rank(side),
        "promotion to {} is off the last rank",
        dst
    );

    let mut res = do_apply(pos, slot, dst, side);
    res.set_cell(side, slot, cell.with_piece(piece.into()));
    selftest(&res);
    res
}

/// Validates `mv` against `pos` and returns the resulting position
///
/// This is the checked counterpart of [`Move::apply()`], for moves coming from outside the
/// engine.
pub fn make_move(table: &MoveTable, pos: &Position, mv: Move) -> Result<Position, MoveError> {
    mv.validate(table, pos)?;
    Ok(mv.apply(pos))
}
