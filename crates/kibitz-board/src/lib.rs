//! Board-level building blocks for game analysis.
//!
//! This crate owns everything that needs to know what a chess board looks like:
//!
//! - [`Square`], [`Color`], [`Role`], [`Piece`] - value types for the 8x8 board
//! - [`BoardSnapshot`] - an immutable mailbox view of one position with attack and
//!   ray-scan queries used by the theme detectors
//! - [`BoardService`] - the boundary to the move-legality collaborator
//!   (`make_move`, `legal_moves`, `attackers`, `all_pieces`)
//! - [`ShakmatyBoard`] - a [`BoardService`] backed by the `shakmaty` rules library
//!
//! Legality and FEN/SAN parsing are never implemented here directly; they are always
//! delegated to a [`BoardService`].
//!
//! # Example
//!
//! ```
//! use kibitz_board::{BoardService, Color, ShakmatyBoard, Square};
//!
//! let board = ShakmatyBoard;
//! let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
//! let outcome = board.make_move(start, "e4").unwrap();
//! assert_eq!(outcome.san, "e4");
//!
//! let snapshot = board.snapshot(&outcome.fen_after).unwrap();
//! assert_eq!(snapshot.side_to_move(), Color::Black);
//! assert!(snapshot.piece_at("e4".parse::<Square>().unwrap()).is_some());
//! ```

pub use self::{core::*, service::*};

pub mod core;
pub mod service;

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum BoardError {
    #[display("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    #[display("cannot parse SAN '{san}'")]
    InvalidSan { san: String },
    #[display("illegal move '{san}' in position '{fen}'")]
    IllegalMove { san: String, fen: String },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid square name '{name}'")]
pub struct ParseSquareError {
    pub name: String,
}
