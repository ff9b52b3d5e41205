//! Position and related things

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{Cell, Color, Coord, File, Piece, Rank};
use crate::zobrist;

use std::fmt::{self, Display};

use thiserror::Error;

/// Number of piece slots per side
pub const SLOT_COUNT: usize = 16;

/// Slot of the king in the initial layout
pub const KING_SLOT: usize = 15;

/// Position validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Slot contains a piece of the opposite color
    #[error("slot {slot} of {color:?} holds a piece of the other color")]
    WrongColor { color: Color, slot: usize },
    /// Two live pieces share a square
    #[error("more than one piece on {0}")]
    Overlap(Coord),
    /// There is a pawn on its own first rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// Slot bitboard doesn't match the slot location
    #[error("bitboard of slot {slot} of {color:?} doesn't match its location")]
    SlotBitboard { color: Color, slot: usize },
    /// Aggregate occupancy doesn't match the slots
    #[error("occupancy of {0:?} doesn't match its slots")]
    Occupancy(Color),
    /// Stored hash doesn't match the placement
    #[error("zobrist hash doesn't match the placement")]
    Hash,
}

/// One physical piece
///
/// The slot keeps tracking the piece after it is captured, with the location set to `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    location: Option<Coord>,
    bitboard: Bitboard,
    cell: Cell,
}

impl Slot {
    #[inline]
    pub fn new(cell: Cell, location: Option<Coord>) -> Slot {
        Slot {
            location,
            bitboard: Bitboard::from_location(location),
            cell,
        }
    }

    /// Returns the square of the piece, or `None` if it was captured
    #[inline]
    pub fn location(&self) -> Option<Coord> {
        self.location
    }

    /// Returns the single-square bitboard of the piece, empty if it was captured
    #[inline]
    pub fn bitboard(&self) -> Bitboard {
        self.bitboard
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        self.cell
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.cell.piece()
    }

    #[inline]
    pub fn is_captured(&self) -> bool {
        self.location.is_none()
    }
}

/// Slot contents of [`RawPosition`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawSlot {
    pub cell: Cell,
    pub location: Option<Coord>,
}

/// Unvalidated position
///
/// Use it to set up positions programmatically, then convert into [`Position`] via
/// [`Position::try_from()`].
///
/// # Example
///
/// ```
/// # use raychess::{RawPosition, Position, Color, Piece, Coord};
/// # use std::str::FromStr;
/// #
/// let mut raw = RawPosition::empty();
/// raw.put(Color::White, 15, Piece::King, Coord::from_str("e1").unwrap());
/// raw.put(Color::Black, 15, Piece::King, Coord::from_str("e8").unwrap());
/// raw.put(Color::White, 0, Piece::Pawn, Coord::from_str("a7").unwrap());
///
/// let pos: Position = raw.try_into().unwrap();
/// assert_eq!(pos.to_string(), "4k3/P7/8/8/8/8/8/4K3");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawPosition {
    pub slots: [[RawSlot; SLOT_COUNT]; Color::COUNT],
}

// Back-rank pieces of the initial layout in slot order, after the eight pawns.
const BACK_RANK: [(Piece, File); 8] = [
    (Piece::Rook, File::A),
    (Piece::Rook, File::H),
    (Piece::Knight, File::B),
    (Piece::Knight, File::G),
    (Piece::Bishop, File::C),
    (Piece::Bishop, File::F),
    (Piece::Queen, File::D),
    (Piece::King, File::E),
];

fn initial_slot(color: Color, idx: usize) -> (Cell, Coord) {
    if idx < 8 {
        let coord = Coord::from_parts(File::from_index(idx), geometry::pawn_home_rank(color));
        return (Cell::from_parts(color, Piece::Pawn), coord);
    }
    let (piece, file) = BACK_RANK[idx - 8];
    (
        Cell::from_parts(color, piece),
        Coord::from_parts(file, geometry::back_rank(color)),
    )
}

impl RawPosition {
    /// Returns the initial position
    pub fn initial() -> RawPosition {
        let mut res = RawPosition::empty();
        for color in Color::iter() {
            for (idx, slot) in res.slots[color.index()].iter_mut().enumerate() {
                slot.location = Some(initial_slot(color, idx).1);
            }
        }
        res
    }

    /// Returns a position with all the pieces captured
    ///
    /// The slots keep the piece types of the initial layout.
    pub fn empty() -> RawPosition {
        RawPosition {
            slots: [Color::White, Color::Black].map(|color| {
                std::array::from_fn(|idx| RawSlot {
                    cell: initial_slot(color, idx).0,
                    location: None,
                })
            }),
        }
    }

    /// Puts piece `piece` of color `color` to slot `slot` standing on `coord`
    #[inline]
    pub fn put(&mut self, color: Color, slot: usize, piece: Piece, coord: Coord) {
        self.slots[color.index()][slot] = RawSlot {
            cell: Cell::from_parts(color, piece),
            location: Some(coord),
        };
    }

    /// Marks slot `slot` of color `color` as captured
    #[inline]
    pub fn remove(&mut self, color: Color, slot: usize) {
        self.slots[color.index()][slot].location = None;
    }
}

impl Default for RawPosition {
    #[inline]
    fn default() -> RawPosition {
        RawPosition::empty()
    }
}

/// Position with incrementally maintained occupancy
///
/// Every slot's bitboard matches its location, and each side's occupancy is the union of its
/// slots' bitboards. Positions are never changed in place by the engine: making a move clones
/// the position and patches the copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    slots: [[Slot; SLOT_COUNT]; Color::COUNT],
    occupancy: [Bitboard; Color::COUNT],
    hash: u64,
}

fn calc_hash(slots: &[[Slot; SLOT_COUNT]; Color::COUNT]) -> u64 {
    slots
        .iter()
        .flatten()
        .filter_map(|s| s.location.map(|c| zobrist::pieces(s.cell, c)))
        .fold(0, |h, k| h ^ k)
}

impl Position {
    /// Returns the initial position
    pub fn initial() -> Position {
        let raw = RawPosition::initial();
        let slots = raw.slots.map(|side| side.map(|s| Slot::new(s.cell, s.location)));
        let occupancy =
            slots.map(|side| side.iter().fold(Bitboard::EMPTY, |bb, s| bb | s.bitboard));
        let hash = calc_hash(&slots);
        Position {
            slots,
            occupancy,
            hash,
        }
    }

    /// Returns the slots of color `c`
    #[inline]
    pub fn slots(&self, c: Color) -> &[Slot; SLOT_COUNT] {
        &self.slots[c.index()]
    }

    /// Returns slot `idx` of color `c`
    #[inline]
    pub fn slot(&self, c: Color, idx: usize) -> &Slot {
        &self.slots[c.index()][idx]
    }

    /// Returns the bitboard over all the pieces with color `c`
    #[inline]
    pub fn occupancy(&self, c: Color) -> Bitboard {
        self.occupancy[c.index()]
    }

    /// Returns the bitboard over all the pieces
    #[inline]
    pub fn all(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    /// Returns the index of the slot of color `c` standing on `coord`
    pub fn slot_at(&self, c: Color, coord: Coord) -> Option<usize> {
        if !self.occupancy(c).has(coord) {
            return None;
        }
        self.slots(c)
            .iter()
            .position(|s| s.location == Some(coord))
    }

    /// Returns the piece standing on `coord`, if any
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        Color::iter().find_map(|c| self.slot_at(c, coord).map(|idx| self.slot(c, idx).cell))
    }

    /// Returns the Zobrist hash of the piece placement
    ///
    /// The side to move is not included. Fold in [`zobrist::MOVE_SIDE`] if you need it.
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// Returns the unvalidated view of the position
    pub fn raw(&self) -> RawPosition {
        RawPosition {
            slots: self.slots.map(|side| {
                side.map(|s| RawSlot {
                    cell: s.cell,
                    location: s.location,
                })
            }),
        }
    }

    /// Checks all the internal invariants of the position
    ///
    /// Positions produced by the engine always pass; a failure means a bug.
    pub fn validate(&self) -> Result<(), ValidateError> {
        for color in Color::iter() {
            let mut occupancy = Bitboard::EMPTY;
            for (slot, s) in self.slots(color).iter().enumerate() {
                if s.bitboard != Bitboard::from_location(s.location) {
                    return Err(ValidateError::SlotBitboard { color, slot });
                }
                occupancy |= s.bitboard;
            }
            if occupancy != self.occupancy(color) {
                return Err(ValidateError::Occupancy(color));
            }
        }
        let both = self.occupancy[0] & self.occupancy[1];
        if let Some(coord) = both.into_iter().next() {
            return Err(ValidateError::Overlap(coord));
        }
        if calc_hash(&self.slots) != self.hash {
            return Err(ValidateError::Hash);
        }
        Ok(())
    }

    pub(crate) fn move_slot(&mut self, c: Color, idx: usize, dst: Coord) {
        let slot = &mut self.slots[c.index()][idx];
        let dst_bb = Bitboard::from_coord(dst);
        self.occupancy[c.index()] ^= slot.bitboard ^ dst_bb;
        if let Some(src) = slot.location {
            self.hash ^= zobrist::pieces(slot.cell, src);
        }
        self.hash ^= zobrist::pieces(slot.cell, dst);
        slot.location = Some(dst);
        slot.bitboard = dst_bb;
    }

    pub(crate) fn capture(&mut self, c: Color, idx: usize) {
        let slot = &mut self.slots[c.index()][idx];
        self.occupancy[c.index()] ^= slot.bitboard;
        if let Some(src) = slot.location {
            self.hash ^= zobrist::pieces(slot.cell, src);
        }
        slot.location = None;
        slot.bitboard = Bitboard::EMPTY;
    }

    pub(crate) fn set_cell(&mut self, c: Color, idx: usize, cell: Cell) {
        let slot = &mut self.slots[c.index()][idx];
        if let Some(loc) = slot.location {
            self.hash ^= zobrist::pieces(slot.cell, loc) ^ zobrist::pieces(cell, loc);
        }
        slot.cell = cell;
    }

    /// Wraps the position to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use raychess::{Position, position::PrettyStyle};
    /// #
    /// let p = Position::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    ///  |abcdefgh
    /// "#;
    /// assert_eq!(p.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { pos: self, style }
    }
}

impl TryFrom<RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(raw: RawPosition) -> Result<Position, ValidateError> {
        let mut occupancy = [Bitboard::EMPTY; Color::COUNT];
        for color in Color::iter() {
            for (slot, s) in raw.slots[color.index()].iter().enumerate() {
                if s.cell.color() != color {
                    return Err(ValidateError::WrongColor { color, slot });
                }
                let coord = match s.location {
                    Some(coord) => coord,
                    None => continue,
                };
                if (occupancy[0] | occupancy[1]).has(coord) {
                    return Err(ValidateError::Overlap(coord));
                }
                if s.cell.piece() == Piece::Pawn && coord.rank() == geometry::back_rank(color) {
                    return Err(ValidateError::InvalidPawn(coord));
                }
                occupancy[color.index()].set(coord);
            }
        }

        let slots = raw.slots.map(|side| side.map(|s| Slot::new(s.cell, s.location)));
        let hash = calc_hash(&slots);
        Ok(Position {
            slots,
            occupancy,
            hash,
        })
    }
}

impl TryFrom<&RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(raw: &RawPosition) -> Result<Position, ValidateError> {
        (*raw).try_into()
    }
}

impl Default for Position {
    #[inline]
    fn default() -> Position {
        Position::initial()
    }
}

/// Prints the piece placement in FEN notation (without the side to move and other fields)
impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            if rank != Rank::R8 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let cell = match self.get(Coord::from_parts(file, rank)) {
                    Some(cell) => cell,
                    None => {
                        empty += 1;
                        continue;
                    }
                };
                if empty != 0 {
                    write!(f, "{}", empty)?;
                    empty = 0;
                }
                write!(f, "{}", cell)?;
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
        }
        Ok(())
    }
}

/// Style for [`Position::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the position
///
/// See docs for [`Position::pretty()`] for more details.
pub struct Pretty<'a> {
    pos: &'a Position,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;

    fn cell(c: Option<Cell>) -> char;

    fn fmt(p: &Position, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(p.get(Coord::from_parts(file, rank))))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, " {}", Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';

    fn cell(c: Option<Cell>) -> char {
        c.map_or('.', |c| c.as_char())
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';

    fn cell(c: Option<Cell>) -> char {
        c.map_or('.', |c| c.as_utf8_char())
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.pos, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.pos, f),
        }
    }
}
