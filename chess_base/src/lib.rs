//! # Base types for raychess
//!
//! This is an auxiliary crate for `raychess`, which contains the board coordinates, piece codes,
//! bitboards and direction geometry. It was split from the main crate, so everything declared here
//! can be used in the build script for `raychess`.
//!
//! Normally you don't want to use this crate directly. Use `raychess` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
