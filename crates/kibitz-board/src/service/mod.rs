//! Boundary to the move-legality / board collaborator.
//!
//! Every component that needs to know whether a move is legal, or what position it
//! leads to, goes through [`BoardService`]. The trait mirrors the collaborator's
//! operations one-to-one; [`BoardService::snapshot`] is a convenience built on top of
//! them.

use serde::{Deserialize, Serialize};

use crate::{
    BoardError,
    core::{BoardSnapshot, CastlingRights, Color, PlacedPiece, Square},
};

pub use self::shakmaty_board::ShakmatyBoard;

mod shakmaty_board;

/// Result of playing a move: the canonical SAN and the resulting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub san: String,
    pub fen_after: String,
}

/// Side to move and castling rights of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionHeader {
    pub side_to_move: Color,
    pub castling: CastlingRights,
}

pub trait BoardService: std::fmt::Debug + Send + Sync {
    /// Plays `san` in `fen`, returning the canonical SAN (with check suffix) and the
    /// resulting FEN. Moves in UCI notation (`e1g1`, `e7e8q`) are accepted too.
    fn make_move(&self, fen: &str, san: &str) -> Result<MoveOutcome, BoardError>;

    /// Canonical SAN of a move given in SAN or UCI notation.
    fn to_san(&self, fen: &str, mv: &str) -> Result<String, BoardError> {
        self.make_move(fen, mv).map(|outcome| outcome.san)
    }

    /// All legal moves in canonical SAN.
    fn legal_moves(&self, fen: &str) -> Result<Vec<String>, BoardError>;

    /// Squares of `color` pieces attacking `square`.
    fn attackers(&self, fen: &str, square: Square, color: Color)
    -> Result<Vec<Square>, BoardError>;

    fn all_pieces(&self, fen: &str) -> Result<Vec<PlacedPiece>, BoardError>;

    fn header(&self, fen: &str) -> Result<PositionHeader, BoardError>;

    fn snapshot(&self, fen: &str) -> Result<BoardSnapshot, BoardError> {
        let header = self.header(fen)?;
        let pieces = self.all_pieces(fen)?;
        Ok(BoardSnapshot::from_pieces(
            pieces,
            header.side_to_move,
            header.castling,
        ))
    }
}

impl<T> BoardService for &T
where
    T: BoardService + ?Sized,
{
    fn make_move(&self, fen: &str, san: &str) -> Result<MoveOutcome, BoardError> {
        (**self).make_move(fen, san)
    }

    fn to_san(&self, fen: &str, mv: &str) -> Result<String, BoardError> {
        (**self).to_san(fen, mv)
    }

    fn legal_moves(&self, fen: &str) -> Result<Vec<String>, BoardError> {
        (**self).legal_moves(fen)
    }

    fn attackers(
        &self,
        fen: &str,
        square: Square,
        color: Color,
    ) -> Result<Vec<Square>, BoardError> {
        (**self).attackers(fen, square, color)
    }

    fn all_pieces(&self, fen: &str) -> Result<Vec<PlacedPiece>, BoardError> {
        (**self).all_pieces(fen)
    }

    fn header(&self, fen: &str) -> Result<PositionHeader, BoardError> {
        (**self).header(fen)
    }

    fn snapshot(&self, fen: &str) -> Result<BoardSnapshot, BoardError> {
        (**self).snapshot(fen)
    }
}
