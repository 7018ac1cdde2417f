//! Core board value types.
//!
//! - [`Square`] / [`SquareSet`] / [`Direction`] - board coordinates and ray directions
//! - [`Color`] / [`Role`] / [`Piece`] / [`PlacedPiece`] - piece identity
//! - [`BoardSnapshot`] - an immutable position with attack and ray-scan queries

pub use self::{piece::*, snapshot::*, square::*};

pub(crate) mod piece;
pub(crate) mod snapshot;
pub(crate) mod square;
