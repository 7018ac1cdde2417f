//! Lazily computed facts about one position, shared by all detectors.
//!
//! Several detectors need the same derived data (attack maps, pawn files). Each item
//! is computed on first use and cached for the lifetime of the analysis, so running
//! the full registry costs no more than running the most demanding detector.

use std::cell::OnceCell;

use kibitz_board::{BoardSnapshot, Color, PlacedPiece, Role, Square, SquareSet};

#[derive(Debug)]
pub struct PositionAnalysis {
    snapshot: BoardSnapshot,
    attacked_by: [OnceCell<SquareSet>; 2],
    pawn_attacks: [OnceCell<SquareSet>; 2],
    pawns: [OnceCell<Vec<Square>>; 2],
    pawn_file_counts: [OnceCell<[u8; 8]>; 2],
}

impl PositionAnalysis {
    #[must_use]
    pub fn new(snapshot: BoardSnapshot) -> Self {
        Self {
            snapshot,
            attacked_by: Default::default(),
            pawn_attacks: Default::default(),
            pawns: Default::default(),
            pawn_file_counts: Default::default(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    /// Squares attacked (or defended) by at least one `color` piece.
    #[must_use]
    pub fn attacked_by(&self, color: Color) -> SquareSet {
        *self.attacked_by[color.index()].get_or_init(|| self.snapshot.attacked_by(color))
    }

    #[must_use]
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        self.attacked_by(by).contains(square)
    }

    /// Squares covered by `color` pawns.
    #[must_use]
    pub fn pawn_attacks(&self, color: Color) -> SquareSet {
        *self.pawn_attacks[color.index()].get_or_init(|| {
            self.pawns(color)
                .iter()
                .map(|&sq| self.snapshot.attacks_from(sq))
                .fold(SquareSet::EMPTY, SquareSet::union)
        })
    }

    /// Squares of `color` pawns in a1..h8 order.
    #[must_use]
    pub fn pawns(&self, color: Color) -> &[Square] {
        self.pawns[color.index()].get_or_init(|| {
            self.snapshot
                .pieces_by(color, Role::Pawn)
                .map(|p| p.square)
                .collect()
        })
    }

    /// Number of `color` pawns on each file.
    #[must_use]
    pub fn pawn_file_counts(&self, color: Color) -> &[u8; 8] {
        self.pawn_file_counts[color.index()].get_or_init(|| {
            let mut counts = [0; 8];
            for sq in self.pawns(color) {
                counts[usize::from(sq.file())] += 1;
            }
            counts
        })
    }

    #[must_use]
    pub fn pawns_on_file(&self, color: Color, file: u8) -> u8 {
        self.pawn_file_counts(color)
            .get(usize::from(file))
            .copied()
            .unwrap_or(0)
    }

    /// `color` pawns on files adjacent to `file`.
    pub fn pawns_on_adjacent_files(&self, color: Color, file: u8) -> impl Iterator<Item = Square> + '_ {
        self.pawns(color)
            .iter()
            .copied()
            .filter(move |sq| sq.file().abs_diff(file) == 1)
    }

    /// No enemy pawn ahead of `square` on the same or an adjacent file.
    #[must_use]
    pub fn is_passed_pawn(&self, square: Square, color: Color) -> bool {
        let rank = square.relative_rank(color);
        !self.pawns(color.opponent()).iter().any(|enemy| {
            enemy.file().abs_diff(square.file()) <= 1 && enemy.relative_rank(color) > rank
        })
    }

    /// No enemy pawn can ever attack `square`: none stands ahead of it on an
    /// adjacent file.
    #[must_use]
    pub fn is_safe_from_pawns(&self, square: Square, color: Color) -> bool {
        let rank = square.relative_rank(color);
        !self
            .pawns_on_adjacent_files(color.opponent(), square.file())
            .any(|enemy| enemy.relative_rank(color) > rank)
    }

    /// `color` pieces defending the piece on `square`.
    #[must_use]
    pub fn defenders(&self, square: Square, color: Color) -> SquareSet {
        self.snapshot.attackers_of(square, color)
    }

    /// Pieces of `color` other than the king.
    pub fn non_king_pieces(&self, color: Color) -> impl Iterator<Item = PlacedPiece> + '_ {
        self.snapshot
            .pieces_of(color)
            .filter(|p| p.role != Role::King)
    }
}

#[cfg(test)]
mod tests {
    use kibitz_board::{BoardService as _, ShakmatyBoard};

    use super::*;

    fn analysis(fen: &str) -> PositionAnalysis {
        PositionAnalysis::new(ShakmatyBoard.snapshot(fen).unwrap())
    }

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_pawn_files_in_start_position() {
        let a = analysis("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(a.pawn_file_counts(Color::White), &[1; 8]);
        assert_eq!(a.pawns(Color::Black).len(), 8);
        assert!(a.pawn_attacks(Color::White).contains(sq("e3")));
        assert!(!a.pawn_attacks(Color::White).contains(sq("e4")));
    }

    #[test]
    fn test_passed_pawn_and_pawn_safety() {
        // White: a5, d4. Black: c7, e6.
        let a = analysis("4k3/2p5/4p3/P7/3P4/8/8/4K3 w - - 0 1");
        assert!(a.is_passed_pawn(sq("a5"), Color::White));
        assert!(!a.is_passed_pawn(sq("d4"), Color::White));
        assert!(!a.is_safe_from_pawns(sq("d5"), Color::White));
        assert!(!a.is_safe_from_pawns(sq("b6"), Color::White));
        assert!(a.is_safe_from_pawns(sq("g5"), Color::White));
    }
}
