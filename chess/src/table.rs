//! Precomputed move rays
//!
//! A [`MoveTable`] maps every piece code and origin square to the rays this piece can travel
//! along, ignoring all other pieces. Blocking is resolved later, per position, by the move
//! generator. The table is a pure function of the board geometry: build it once, share it by
//! reference (e.g. via [`Arc`](std::sync::Arc)) and never modify it afterwards.

use crate::bitboard::Bitboard;
use crate::geometry::{self, Direction};
use crate::types::{Cell, Color, Coord, Piece};

use std::slice;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Maximum number of squares in a single ray
pub const MAX_RAY_LEN: usize = 7;

/// Maximum number of rays for a single piece and square
pub const MAX_RAYS: usize = 8;

const MAGIC: &[u8; 4] = b"RAYT";
const VERSION: u8 = 1;
const SENTINEL: u8 = Coord::COUNT as u8;

/// Error decoding a cached [`MoveTable`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum DecodeError {
    /// The data doesn't start with the table header
    #[error("bad table header")]
    BadMagic,
    /// The data was produced by an incompatible encoder
    #[error("unsupported table version {0}")]
    UnsupportedVersion(u8),
    /// The data ended in the middle of the table
    #[error("unexpected end of data")]
    Truncated,
    /// There are bytes after the end of the table
    #[error("extra data after table")]
    TrailingData,
    /// More rays than any piece may have
    #[error("too many rays ({count}) for {cell} on {coord}")]
    TooManyRays {
        cell: Cell,
        coord: Coord,
        count: usize,
    },
    /// Unknown ray kind code
    #[error("bad ray kind {0}")]
    BadRayKind(u8),
    /// Square byte is neither a valid square nor the sentinel
    #[error("bad square {0}")]
    BadSquare(u8),
    /// A valid square follows the end-of-ray sentinel
    #[error("square after end of ray for {cell} on {coord}")]
    SquareAfterSentinel { cell: Cell, coord: Coord },
}

/// How the move generator treats the squares of a ray
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RayKind {
    /// Moves onto empty squares and captures; stops at the first occupied square
    #[default]
    Slide = 0,
    /// Pawn advance: moves onto empty squares only
    Advance = 1,
    /// Pawn diagonal: captures only
    Capture = 2,
}

impl RayKind {
    pub const fn from_u8(val: u8) -> Option<RayKind> {
        match val {
            0 => Some(RayKind::Slide),
            1 => Some(RayKind::Advance),
            2 => Some(RayKind::Capture),
            _ => None,
        }
    }

    /// Returns `true` if a piece moving along such ray threatens the squares on it
    pub const fn attacks(&self) -> bool {
        !matches!(*self, RayKind::Advance)
    }
}

/// Ordered squares in one direction, nearest first
///
/// The ray ends where the board ends; squares past the end are treated as the off-board
/// sentinel and reported as `None` by [`Ray::get()`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Ray {
    kind: RayKind,
    squares: ArrayVec<Coord, MAX_RAY_LEN>,
}

impl Ray {
    fn new(kind: RayKind) -> Ray {
        Ray {
            kind,
            squares: ArrayVec::new(),
        }
    }

    fn cast(src: Coord, (delta_file, delta_rank): Direction, max_len: usize, kind: RayKind) -> Ray {
        let mut ray = Ray::new(kind);
        let mut cur = src;
        while ray.squares.len() < max_len {
            match cur.try_shift(delta_file, delta_rank) {
                Some(next) => {
                    ray.squares.push(next);
                    cur = next;
                }
                None => break,
            }
        }
        ray
    }

    #[inline]
    pub fn kind(&self) -> RayKind {
        self.kind
    }

    #[inline]
    pub fn squares(&self) -> &[Coord] {
        &self.squares
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<Coord> {
        self.squares.get(idx).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<slice::Iter<'_, Coord>> {
        self.squares.iter().copied()
    }
}

/// All the rays of one piece code from one square
pub type Rays = ArrayVec<Ray, MAX_RAYS>;

fn slider_rays(src: Coord, dirs: &[Direction]) -> Rays {
    dirs.iter()
        .map(|&d| Ray::cast(src, d, MAX_RAY_LEN, RayKind::Slide))
        .collect()
}

fn step_rays(src: Coord, dirs: &[Direction]) -> Rays {
    dirs.iter()
        .map(|&d| Ray::cast(src, d, 1, RayKind::Slide))
        .collect()
}

// Forward, forward-left, forward-right. Left and right are files -1 and +1 for both colors. On
// the promotion rank all three rays leave the board and come out empty.
fn pawn_rays(color: Color, src: Coord) -> Rays {
    let fwd = geometry::pawn_forward(color);
    let advance = if src.rank() == geometry::pawn_home_rank(color) {
        2
    } else {
        1
    };
    [
        Ray::cast(src, (0, fwd), advance, RayKind::Advance),
        Ray::cast(src, (-1, fwd), 1, RayKind::Capture),
        Ray::cast(src, (1, fwd), 1, RayKind::Capture),
    ]
    .into_iter()
    .collect()
}

fn piece_rays(cell: Cell, src: Coord) -> Rays {
    match cell.piece() {
        Piece::Pawn => pawn_rays(cell.color(), src),
        Piece::Knight => step_rays(src, &geometry::KNIGHT_JUMPS),
        Piece::Bishop => slider_rays(src, &geometry::BISHOP_DIRS),
        Piece::Rook => slider_rays(src, &geometry::ROOK_DIRS),
        Piece::Queen => slider_rays(src, &geometry::QUEEN_DIRS),
        Piece::King => step_rays(src, &geometry::KING_DIRS),
    }
}

// Same answer as `MoveTable::reaches()`, for callers that don't hold a table.
pub(crate) fn piece_reaches(cell: Cell, src: Coord, dst: Coord) -> bool {
    piece_rays(cell, src)
        .iter()
        .any(|r| r.squares.contains(&dst))
}

fn attack_set(rays: &[Ray]) -> Bitboard {
    rays.iter()
        .filter(|r| r.kind.attacks())
        .flat_map(Ray::iter)
        .collect()
}

#[inline]
const fn entry_index(cell: Cell, coord: Coord) -> usize {
    cell.index() * Coord::COUNT + coord.index()
}

/// Precomputed rays for every piece code and square
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTable {
    rays: Vec<Rays>,
    attacks: Vec<Bitboard>,
}

impl MoveTable {
    /// Computes the table from the board geometry
    ///
    /// The result is deterministic: two calls always produce equal tables.
    pub fn build() -> MoveTable {
        let mut rays = Vec::with_capacity(Cell::COUNT * Coord::COUNT);
        for cell in Cell::iter() {
            for coord in Coord::iter() {
                rays.push(piece_rays(cell, coord));
            }
        }
        MoveTable::from_rays(rays)
    }

    fn from_rays(rays: Vec<Rays>) -> MoveTable {
        let attacks = rays.iter().map(|e| attack_set(e)).collect();
        MoveTable { rays, attacks }
    }

    /// Returns the rays of piece `cell` standing on `coord`
    #[inline]
    pub fn rays(&self, cell: Cell, coord: Coord) -> &[Ray] {
        &self.rays[entry_index(cell, coord)]
    }

    /// Returns the squares threatened by piece `cell` from `coord` on an empty board
    ///
    /// Pawn advances are not included, as they never capture.
    #[inline]
    pub fn attacks(&self, cell: Cell, coord: Coord) -> Bitboard {
        self.attacks[entry_index(cell, coord)]
    }

    /// Finds `dst` among the rays of `cell` from `src`
    ///
    /// Returns the ray index and the distance along the ray (0 for the nearest square).
    pub fn locate(&self, cell: Cell, src: Coord, dst: Coord) -> Option<(usize, usize)> {
        self.rays(cell, src).iter().enumerate().find_map(|(i, ray)| {
            ray.squares
                .iter()
                .position(|&c| c == dst)
                .map(|dist| (i, dist))
        })
    }

    /// Returns `true` if `dst` lies on one of the rays of `cell` from `src`
    #[inline]
    pub fn reaches(&self, cell: Cell, src: Coord, dst: Coord) -> bool {
        self.locate(cell, src, dst).is_some()
    }

    /// Serializes the table into a compact byte string
    ///
    /// The encoding is stable for a given format version, and [`MoveTable::decode()`] restores
    /// a table equal to this one.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            MAGIC.len() + 1 + self.rays.len() * (1 + MAX_RAYS * (1 + MAX_RAY_LEN)),
        );
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        for entry in &self.rays {
            out.push(entry.len() as u8);
            for ray in entry {
                out.push(ray.kind as u8);
                for i in 0..MAX_RAY_LEN {
                    out.push(ray.get(i).map_or(SENTINEL, |c| c.index() as u8));
                }
            }
        }
        out
    }

    /// Restores a table serialized with [`MoveTable::encode()`]
    pub fn decode(data: &[u8]) -> Result<MoveTable, DecodeError> {
        let mut r = Reader(data);
        if r.take(MAGIC.len())? != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let version = r.byte()?;
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let mut rays = Vec::with_capacity(Cell::COUNT * Coord::COUNT);
        for cell in Cell::iter() {
            for coord in Coord::iter() {
                let count = r.byte()? as usize;
                if count > MAX_RAYS {
                    return Err(DecodeError::TooManyRays { cell, coord, count });
                }
                let mut entry = Rays::new();
                for _ in 0..count {
                    let kind = r.byte()?;
                    let kind = RayKind::from_u8(kind).ok_or(DecodeError::BadRayKind(kind))?;
                    let mut ray = Ray::new(kind);
                    let mut ended = false;
                    for &b in r.take(MAX_RAY_LEN)? {
                        match b {
                            SENTINEL => ended = true,
                            b if b > SENTINEL => return Err(DecodeError::BadSquare(b)),
                            _ if ended => {
                                return Err(DecodeError::SquareAfterSentinel { cell, coord })
                            }
                            b => ray.squares.push(Coord::from_index(b as usize)),
                        }
                    }
                    entry.push(ray);
                }
                rays.push(entry);
            }
        }

        if !r.0.is_empty() {
            return Err(DecodeError::TrailingData);
        }
        Ok(MoveTable::from_rays(rays))
    }
}

struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.0.len() < n {
            return Err(DecodeError::Truncated);
        }
        let (head, tail) = self.0.split_at(n);
        self.0 = tail;
        Ok(head)
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }
}
