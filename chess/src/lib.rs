//! Slot-based chess position model with precomputed move rays
//!
//! A [`Position`] tracks 16 piece slots per side. A [`MoveTable`] built once holds every
//! ray a piece can travel along from every square; [`movegen`] walks those rays to produce
//! successor positions, and [`eval`] scores them.
//!
//! # Example
//!
//! ```
//! use raychess::{movegen, eval, Color, MoveTable, Position};
//!
//! let table = MoveTable::build();
//! let pos = Position::initial();
//! let succ = movegen::expand(&table, &pos, Color::White);
//! assert_eq!(succ.len(), 20);
//!
//! let best = succ.iter().max_by_key(|p| eval::evaluate(p, Color::White)).unwrap();
//! assert_eq!(best.to_string(), "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R");
//! ```

pub mod eval;
pub mod movegen;
pub mod moves;
pub mod position;
pub mod table;
pub mod zobrist;

pub use raychess_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use movegen::{MoveList, Promotion};
pub use moves::{Move, PromotePiece};
pub use position::{Position, RawPosition, Slot};
pub use table::MoveTable;
pub use types::{Cell, Color, Coord, File, Piece, Rank};
