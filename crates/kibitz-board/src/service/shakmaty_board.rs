use shakmaty::{
    CastlingMode, CastlingSide, Chess, EnPassantMode, Move, Position,
    fen::Fen,
    san::{San, SanPlus},
    uci::UciMove,
};

use crate::{
    BoardError,
    core::{CastlingRights, Color, Piece, PlacedPiece, Role, Square},
    service::{BoardService, MoveOutcome, PositionHeader},
};

/// [`BoardService`] backed by the `shakmaty` rules library.
///
/// Stateless: every call re-parses the FEN it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyBoard;

impl ShakmatyBoard {
    fn position(fen: &str) -> Result<Chess, BoardError> {
        let invalid = |reason: String| BoardError::InvalidFen {
            fen: fen.to_owned(),
            reason,
        };
        let parsed = fen.parse::<Fen>().map_err(|e| invalid(e.to_string()))?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))
    }

    /// Reads `mv` as UCI first and as SAN otherwise.
    fn parse_move(pos: &Chess, fen: &str, mv: &str) -> Result<Move, BoardError> {
        if let Ok(uci) = mv.parse::<UciMove>()
            && let Ok(m) = uci.to_move(pos)
        {
            return Ok(m);
        }
        let parsed = mv.parse::<SanPlus>().map_err(|_| BoardError::InvalidSan {
            san: mv.to_owned(),
        })?;
        parsed.san.to_move(pos).map_err(|_| BoardError::IllegalMove {
            san: mv.to_owned(),
            fen: fen.to_owned(),
        })
    }

    fn san_with_suffix(pos: &Chess, m: &Move) -> String {
        let san = San::from_move(pos, m);
        let mut after = pos.clone();
        after.play_unchecked(m);
        let suffix = if after.is_checkmate() {
            "#"
        } else if after.is_check() {
            "+"
        } else {
            ""
        };
        format!("{san}{suffix}")
    }
}

impl BoardService for ShakmatyBoard {
    fn make_move(&self, fen: &str, san: &str) -> Result<MoveOutcome, BoardError> {
        let pos = Self::position(fen)?;
        let m = Self::parse_move(&pos, fen, san)?;
        let san = Self::san_with_suffix(&pos, &m);
        let mut after = pos;
        after.play_unchecked(&m);
        let fen_after = Fen::from_position(after, EnPassantMode::Legal).to_string();
        Ok(MoveOutcome { san, fen_after })
    }

    fn to_san(&self, fen: &str, mv: &str) -> Result<String, BoardError> {
        let pos = Self::position(fen)?;
        let m = Self::parse_move(&pos, fen, mv)?;
        Ok(Self::san_with_suffix(&pos, &m))
    }

    fn legal_moves(&self, fen: &str) -> Result<Vec<String>, BoardError> {
        let pos = Self::position(fen)?;
        Ok(pos
            .legal_moves()
            .iter()
            .map(|m| Self::san_with_suffix(&pos, m))
            .collect())
    }

    fn attackers(
        &self,
        fen: &str,
        square: Square,
        color: Color,
    ) -> Result<Vec<Square>, BoardError> {
        let pos = Self::position(fen)?;
        let board = pos.board();
        let attackers = board.attacks_to(
            to_shakmaty_square(square),
            to_shakmaty_color(color),
            board.occupied(),
        );
        Ok(attackers.into_iter().map(from_shakmaty_square).collect())
    }

    fn all_pieces(&self, fen: &str) -> Result<Vec<PlacedPiece>, BoardError> {
        let pos = Self::position(fen)?;
        let board = pos.board();
        Ok(Square::all()
            .filter_map(|square| {
                let piece = board.piece_at(to_shakmaty_square(square))?;
                let piece = Piece::new(
                    from_shakmaty_color(piece.color),
                    from_shakmaty_role(piece.role),
                );
                Some(PlacedPiece::new(square, piece))
            })
            .collect())
    }

    fn header(&self, fen: &str) -> Result<PositionHeader, BoardError> {
        let pos = Self::position(fen)?;
        let castles = pos.castles();
        let white = shakmaty::Color::White;
        let black = shakmaty::Color::Black;
        Ok(PositionHeader {
            side_to_move: from_shakmaty_color(pos.turn()),
            castling: CastlingRights {
                white_king_side: castles.has(white, CastlingSide::KingSide),
                white_queen_side: castles.has(white, CastlingSide::QueenSide),
                black_king_side: castles.has(black, CastlingSide::KingSide),
                black_queen_side: castles.has(black, CastlingSide::QueenSide),
            },
        })
    }
}

fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    #[expect(clippy::cast_possible_truncation)]
    shakmaty::Square::new(square.index() as u32)
}

fn from_shakmaty_square(square: shakmaty::Square) -> Square {
    Square::from_index(square as u8).expect("shakmaty squares are always on the board")
}

fn to_shakmaty_color(color: Color) -> shakmaty::Color {
    match color {
        Color::White => shakmaty::Color::White,
        Color::Black => shakmaty::Color::Black,
    }
}

fn from_shakmaty_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn from_shakmaty_role(role: shakmaty::Role) -> Role {
    match role {
        shakmaty::Role::Pawn => Role::Pawn,
        shakmaty::Role::Knight => Role::Knight,
        shakmaty::Role::Bishop => Role::Bishop,
        shakmaty::Role::Rook => Role::Rook,
        shakmaty::Role::Queen => Role::Queen,
        shakmaty::Role::King => Role::King,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_make_move_returns_canonical_san_and_fen() {
        let outcome = ShakmatyBoard.make_move(START, "Nf3").unwrap();
        assert_eq!(outcome.san, "Nf3");
        assert_eq!(
            outcome.fen_after,
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1"
        );
    }

    #[test]
    fn test_make_move_adds_check_suffix() {
        let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        let outcome = ShakmatyBoard.make_move(fen, "Ra8").unwrap();
        assert_eq!(outcome.san, "Ra8+");
        let outcome = ShakmatyBoard.make_move(fen, "Ra8+").unwrap();
        assert_eq!(outcome.san, "Ra8+");
    }

    #[test]
    fn test_illegal_move_is_typed_error() {
        let err = ShakmatyBoard.make_move(START, "e5").unwrap_err();
        assert!(err.is_illegal_move());
        let err = ShakmatyBoard.make_move(START, "zz").unwrap_err();
        assert!(err.is_invalid_san());
        let err = ShakmatyBoard.make_move("not a fen", "e4").unwrap_err();
        assert!(err.is_invalid_fen());
    }

    #[test]
    fn test_uci_moves_are_read_as_canonical_san() {
        let castle = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let outcome = ShakmatyBoard.make_move(castle, "e1g1").unwrap();
        assert_eq!(outcome.san, "O-O");
        assert_eq!(outcome.fen_after, "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        assert_eq!(ShakmatyBoard.to_san(castle, "e1c1").unwrap(), "O-O-O");
        assert_eq!(ShakmatyBoard.to_san(castle, "O-O").unwrap(), "O-O");

        let promote = "k7/4P3/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(ShakmatyBoard.to_san(promote, "e7e8q").unwrap(), "e8=Q+");
        assert_eq!(ShakmatyBoard.to_san(promote, "e7e8n").unwrap(), "e8=N");
        assert_eq!(ShakmatyBoard.to_san(START, "g1f3").unwrap(), "Nf3");
    }

    #[test]
    fn test_illegal_uci_move_is_typed_error() {
        let err = ShakmatyBoard.to_san(START, "e1g1").unwrap_err();
        assert!(err.is_illegal_move());
    }

    #[test]
    fn test_legal_moves_in_start_position() {
        let moves = ShakmatyBoard.legal_moves(START).unwrap();
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().any(|m| m == "e4"));
    }

    #[test]
    fn test_snapshot_matches_fen() {
        let snapshot = ShakmatyBoard.snapshot(START).unwrap();
        assert_eq!(snapshot.pieces().count(), 32);
        assert_eq!(snapshot.king(Color::White).unwrap().to_string(), "e1");
        assert_eq!(snapshot.king(Color::Black).unwrap().to_string(), "e8");
        assert_eq!(snapshot.side_to_move(), Color::White);
        assert_eq!(snapshot.castling_rights(), CastlingRights::ALL);
    }

    #[test]
    fn test_attackers_agree_with_snapshot_geometry() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let e5: Square = "e5".parse().unwrap();
        let mut from_service = ShakmatyBoard.attackers(fen, e5, Color::White).unwrap();
        from_service.sort();
        let snapshot = ShakmatyBoard.snapshot(fen).unwrap();
        let from_snapshot = snapshot.attackers_of(e5, Color::White).iter().collect::<Vec<_>>();
        assert_eq!(from_service, from_snapshot);
        assert_eq!(from_service, vec!["f3".parse::<Square>().unwrap()]);
    }
}
