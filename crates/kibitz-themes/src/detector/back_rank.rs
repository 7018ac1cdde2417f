use kibitz_board::{BoardSnapshot, Color, Piece, PlacedPiece, Role, Square, SquareSet};

use crate::{
    detector::{DetectorContext, DetectorError},
    theme::{Severity, ThemeInstance, ThemeType},
};

/// Back-rank threats against either king.
///
/// A king is boxed in when it stands on its home rank and no square on the rank in
/// front of it is both free of its own pieces and unattacked. The threat is real when an
/// enemy rook or queen can land on the home rank with a clear path to the king.
pub(super) fn detect(ctx: &DetectorContext<'_>) -> Result<Vec<ThemeInstance>, DetectorError> {
    let mut themes = vec![];
    for defender in Color::ALL {
        let king = ctx
            .analysis
            .snapshot()
            .king(defender)
            .ok_or(DetectorError::MissingKing { color: defender })?;
        if let Some(theme) = threat_against(ctx, defender, king) {
            themes.push(theme);
        }
    }
    Ok(themes)
}

fn threat_against(ctx: &DetectorContext<'_>, defender: Color, king: Square) -> Option<ThemeInstance> {
    if king.relative_rank(defender) != 0 {
        return None;
    }
    let attacker = defender.opponent();
    let snapshot = ctx.analysis.snapshot();
    // Attacks are computed without the king so that squares behind it on a line count.
    let without_king = snapshot.without(king);
    let has_escape = (-1..=1)
        .filter_map(|df| king.offset(df, defender.forward()))
        .any(|sq| {
            let own_piece = snapshot.piece_at(sq).is_some_and(|p| p.color == defender);
            !own_piece && !without_king.is_attacked(sq, attacker)
        });
    if has_escape {
        return None;
    }

    let home_rank = defender.home_rank();
    let mut entries = SquareSet::EMPTY;
    let mut heavy = Vec::<PlacedPiece>::new();
    for piece in snapshot
        .pieces_of(attacker)
        .filter(|p| matches!(p.role, Role::Rook | Role::Queen))
    {
        let mut reach = snapshot.attacks_from(piece.square);
        if piece.square.rank() == home_rank {
            reach.insert(piece.square);
        }
        let landing = reach.iter().filter(|&sq| {
            sq.rank() == home_rank
                && sq != king
                && !snapshot.piece_at(sq).is_some_and(|p| p.color == attacker && sq != piece.square)
                && clear_between(snapshot, sq, king)
        });
        let mut found = false;
        for sq in landing {
            entries.insert(sq);
            found = true;
        }
        if found {
            heavy.push(piece);
        }
    }
    if entries.is_empty() {
        return None;
    }

    let undefended_entry = entries.iter().any(|sq| !snapshot.is_attacked(sq, defender));
    let (severity, confidence) = if undefended_entry {
        (Severity::Critical, 0.85)
    } else {
        (Severity::Significant, 0.6)
    };
    let king_piece = PlacedPiece::new(king, Piece::new(defender, Role::King));
    Some(
        ThemeInstance::new(ThemeType::BackRankThreat, king, attacker, ctx.ply)
            .with_secondary(entries.iter())
            .with_pieces(std::iter::once(king_piece).chain(heavy))
            .with_severity(severity)
            .with_confidence(confidence)
            .with_material(Role::King.value()),
    )
}

/// Squares strictly between `from` and `to` on the same rank are empty.
fn clear_between(snapshot: &BoardSnapshot, from: Square, to: Square) -> bool {
    let (lo, hi) = if from.file() < to.file() {
        (from.file(), to.file())
    } else {
        (to.file(), from.file())
    };
    (lo + 1..hi)
        .filter_map(|file| Square::new(file, from.rank()))
        .all(|sq| snapshot.piece_at(sq).is_none())
}
