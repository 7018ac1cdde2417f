use arrayvec::ArrayVec;

use crate::core::{
    piece::{CastlingRights, Color, Piece, PlacedPiece, Role},
    square::{Direction, Square, SquareSet},
};

/// Result of walking a ray from a square until two pieces have been found.
///
/// The walk stops at the edge of the board or at the second piece, whichever comes
/// first. `between` holds the empty squares crossed before reaching `front`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RayScan {
    pub direction: Direction,
    pub front: Option<PlacedPiece>,
    pub back: Option<PlacedPiece>,
    pub between: ArrayVec<Square, 7>,
}

/// An immutable mailbox view of one position.
///
/// The snapshot is what theme detectors look at: pieces by color and type, king
/// squares, castling rights and the side to move. It answers purely geometric
/// questions (attacks, ray scans) but knows nothing about move legality; for that,
/// use a [`BoardService`](crate::BoardService).
///
/// # Attack semantics
///
/// A piece "attacks" every square it could capture on if an enemy piece stood there,
/// regardless of what actually occupies the square. This means that attacking a
/// square occupied by a friendly piece counts as *defending* it.
///
/// # Example
///
/// ```
/// use kibitz_board::{BoardSnapshot, CastlingRights, Color, Piece, PlacedPiece, Role};
///
/// let pieces = [
///     ("e1", Color::White, Role::King),
///     ("a1", Color::White, Role::Rook),
///     ("e8", Color::Black, Role::King),
/// ]
/// .map(|(sq, color, role)| PlacedPiece::new(sq.parse().unwrap(), Piece::new(color, role)));
/// let snapshot = BoardSnapshot::from_pieces(pieces, Color::White, CastlingRights::default());
///
/// assert_eq!(snapshot.king(Color::Black).unwrap().to_string(), "e8");
/// assert!(snapshot.is_attacked("a8".parse().unwrap(), Color::White));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    squares: [Option<Piece>; Square::COUNT],
    side_to_move: Color,
    castling: CastlingRights,
}

impl BoardSnapshot {
    #[must_use]
    pub fn from_pieces<I>(pieces: I, side_to_move: Color, castling: CastlingRights) -> Self
    where
        I: IntoIterator<Item = PlacedPiece>,
    {
        let mut squares = [None; Square::COUNT];
        for placed in pieces {
            squares[placed.square.index()] = Some(placed.piece());
        }
        Self {
            squares,
            side_to_move,
            castling,
        }
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    #[must_use]
    pub fn placed_at(&self, square: Square) -> Option<PlacedPiece> {
        self.piece_at(square)
            .map(|piece| PlacedPiece::new(square, piece))
    }

    pub fn pieces(&self) -> impl Iterator<Item = PlacedPiece> + '_ {
        Square::all().filter_map(|square| self.placed_at(square))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = PlacedPiece> + '_ {
        self.pieces().filter(move |p| p.color == color)
    }

    pub fn pieces_by(&self, color: Color, role: Role) -> impl Iterator<Item = PlacedPiece> + '_ {
        self.pieces_of(color).filter(move |p| p.role == role)
    }

    #[must_use]
    pub fn king(&self, color: Color) -> Option<Square> {
        self.pieces_by(color, Role::King).map(|p| p.square).next()
    }

    #[must_use]
    pub fn occupied(&self) -> SquareSet {
        self.pieces().map(|p| p.square).collect()
    }

    /// Sum of non-king material for `color`, in pawns.
    #[must_use]
    pub fn material(&self, color: Color) -> i32 {
        self.pieces_of(color)
            .filter(|p| p.role != Role::King)
            .map(PlacedPiece::value)
            .sum()
    }

    /// Returns a copy of this snapshot with `square` emptied.
    ///
    /// Used for x-ray questions such as "would this square still be attacked once the
    /// king steps off its current square?".
    #[must_use]
    pub fn without(&self, square: Square) -> Self {
        let mut snapshot = self.clone();
        snapshot.squares[square.index()] = None;
        snapshot
    }

    /// Walks from `from` along `direction`, recording the first and second piece hit.
    #[must_use]
    pub fn ray_scan(&self, from: Square, direction: Direction) -> RayScan {
        let mut scan = RayScan {
            direction,
            front: None,
            back: None,
            between: ArrayVec::new(),
        };
        let mut current = from;
        while let Some(next) = current.step(direction) {
            current = next;
            match (self.placed_at(next), scan.front) {
                (None, None) => scan.between.push(next),
                (None, Some(_)) => {}
                (Some(hit), None) => scan.front = Some(hit),
                (Some(hit), Some(_)) => {
                    scan.back = Some(hit);
                    break;
                }
            }
        }
        scan
    }

    /// Squares along `direction` up to and including the first occupied square.
    pub fn ray(&self, from: Square, direction: Direction) -> impl Iterator<Item = Square> + '_ {
        let mut current = Some(from);
        let mut blocked = false;
        std::iter::from_fn(move || {
            if blocked {
                return None;
            }
            let next = current?.step(direction)?;
            current = Some(next);
            blocked = self.piece_at(next).is_some();
            Some(next)
        })
    }

    /// Squares attacked by the piece standing on `square` (empty set if none).
    #[must_use]
    pub fn attacks_from(&self, square: Square) -> SquareSet {
        let Some(piece) = self.piece_at(square) else {
            return SquareSet::EMPTY;
        };
        let mut attacks = SquareSet::EMPTY;
        match piece.role {
            Role::Pawn => {
                for df in [-1, 1] {
                    if let Some(target) = square.offset(df, piece.color.forward()) {
                        attacks.insert(target);
                    }
                }
            }
            Role::Knight => {
                for jump in Direction::KNIGHT_JUMPS {
                    if let Some(target) = square.step(jump) {
                        attacks.insert(target);
                    }
                }
            }
            Role::King => {
                for step in Direction::ALL {
                    if let Some(target) = square.step(step) {
                        attacks.insert(target);
                    }
                }
            }
            Role::Bishop | Role::Rook | Role::Queen => {
                for &direction in piece.role.slider_directions() {
                    for target in self.ray(square, direction) {
                        attacks.insert(target);
                    }
                }
            }
        }
        attacks
    }

    /// Squares of `color` pieces attacking `target`.
    #[must_use]
    pub fn attackers_of(&self, target: Square, color: Color) -> SquareSet {
        self.pieces_of(color)
            .filter(|p| p.square != target && self.attacks_from(p.square).contains(target))
            .map(|p| p.square)
            .collect()
    }

    #[must_use]
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        !self.attackers_of(target, by).is_empty()
    }

    /// All squares attacked by at least one `color` piece.
    #[must_use]
    pub fn attacked_by(&self, color: Color) -> SquareSet {
        self.pieces_of(color)
            .map(|p| self.attacks_from(p.square))
            .fold(SquareSet::EMPTY, SquareSet::union)
    }

    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king(color)
            .is_some_and(|king| self.is_attacked(king, color.opponent()))
    }

    /// Least valuable attacker of `color` on `target`, if any.
    #[must_use]
    pub fn least_valuable_attacker(&self, target: Square, color: Color) -> Option<PlacedPiece> {
        self.attackers_of(target, color)
            .iter()
            .filter_map(|sq| self.placed_at(sq))
            .min_by_key(|p| p.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn snapshot(pieces: &[(&str, Color, Role)], side_to_move: Color) -> BoardSnapshot {
        BoardSnapshot::from_pieces(
            pieces
                .iter()
                .map(|&(s, color, role)| PlacedPiece::new(sq(s), Piece::new(color, role))),
            side_to_move,
            CastlingRights::default(),
        )
    }

    mod ray_scan {
        use super::*;

        #[test]
        fn test_finds_front_and_back() {
            let board = snapshot(
                &[
                    ("a1", Color::White, Role::Rook),
                    ("a4", Color::Black, Role::Knight),
                    ("a7", Color::Black, Role::King),
                ],
                Color::White,
            );
            let scan = board.ray_scan(sq("a1"), Direction::NORTH);
            assert_eq!(scan.front.unwrap().square, sq("a4"));
            assert_eq!(scan.back.unwrap().square, sq("a7"));
            assert_eq!(scan.between.as_slice(), &[sq("a2"), sq("a3")]);
        }

        #[test]
        fn test_stops_at_board_edge() {
            let board = snapshot(&[("d4", Color::White, Role::Bishop)], Color::White);
            let scan = board.ray_scan(sq("d4"), Direction::NORTH_EAST);
            assert!(scan.front.is_none());
            assert!(scan.back.is_none());
            assert_eq!(scan.between.len(), 4);
        }
    }

    mod attacks {
        use super::*;

        #[test]
        fn test_slider_attacks_stop_at_blocker() {
            let board = snapshot(
                &[
                    ("d1", Color::White, Role::Rook),
                    ("d3", Color::White, Role::Pawn),
                ],
                Color::White,
            );
            let attacks = board.attacks_from(sq("d1"));
            assert!(attacks.contains(sq("d2")));
            assert!(attacks.contains(sq("d3")));
            assert!(!attacks.contains(sq("d4")));
            assert!(attacks.contains(sq("a1")));
            assert!(attacks.contains(sq("h1")));
        }

        #[test]
        fn test_pawn_attacks_depend_on_color() {
            let board = snapshot(
                &[
                    ("e4", Color::White, Role::Pawn),
                    ("e5", Color::Black, Role::Pawn),
                ],
                Color::White,
            );
            let white = board.attacks_from(sq("e4"));
            let black = board.attacks_from(sq("e5"));
            assert!(white.contains(sq("d5")) && white.contains(sq("f5")));
            assert!(black.contains(sq("d4")) && black.contains(sq("f4")));
            assert!(!white.contains(sq("e5")));
        }

        #[test]
        fn test_defended_piece_counts_as_attacked_by_own_side() {
            let board = snapshot(
                &[
                    ("c3", Color::White, Role::Knight),
                    ("d5", Color::White, Role::Pawn),
                ],
                Color::White,
            );
            assert!(board.is_attacked(sq("d5"), Color::White));
        }

        #[test]
        fn test_check_detection_and_least_valuable_attacker() {
            let board = snapshot(
                &[
                    ("e1", Color::White, Role::King),
                    ("e8", Color::Black, Role::Rook),
                    ("b4", Color::Black, Role::Bishop),
                    ("a8", Color::Black, Role::King),
                ],
                Color::White,
            );
            assert!(board.is_in_check(Color::White));
            assert!(!board.is_in_check(Color::Black));
            let lva = board.least_valuable_attacker(sq("e1"), Color::Black).unwrap();
            assert_eq!(lva.role, Role::Bishop);
        }

        #[test]
        fn test_without_removes_blocker() {
            let board = snapshot(
                &[
                    ("a1", Color::White, Role::Rook),
                    ("a2", Color::White, Role::Pawn),
                ],
                Color::White,
            );
            assert!(!board.is_attacked(sq("a5"), Color::White));
            assert!(board.without(sq("a2")).is_attacked(sq("a5"), Color::White));
        }
    }

    #[test]
    fn test_material_excludes_kings() {
        let board = snapshot(
            &[
                ("e1", Color::White, Role::King),
                ("d1", Color::White, Role::Queen),
                ("e8", Color::Black, Role::King),
                ("a7", Color::Black, Role::Pawn),
            ],
            Color::White,
        );
        assert_eq!(board.material(Color::White), 9);
        assert_eq!(board.material(Color::Black), 1);
    }
}
