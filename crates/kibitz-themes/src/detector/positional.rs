//! Positional themes: file control, outposts, space, and color complexes.

use kibitz_board::{Color, Role, Square};

use crate::{
    detector::{DetectorContext, DetectorError},
    theme::{Severity, ThemeInstance, ThemeType},
};

/// Space is counted as squares in the opponent's half attacked by a side; a lead below
/// this is noise.
const SPACE_MIN_LEAD: usize = 6;

/// Rooks and queens on files without own pawns.
pub(super) fn detect_files(ctx: &DetectorContext<'_>) -> Vec<ThemeInstance> {
    let analysis = ctx.analysis;
    let mut themes = vec![];
    for owner in Color::ALL {
        for piece in analysis
            .snapshot()
            .pieces_of(owner)
            .filter(|p| matches!(p.role, Role::Rook | Role::Queen))
        {
            let file = piece.square.file();
            if analysis.pawns_on_file(owner, file) > 0 {
                continue;
            }
            let open = analysis.pawns_on_file(owner.opponent(), file) == 0;
            let (theme_type, severity, confidence) = match (open, piece.role) {
                (true, Role::Rook) => (ThemeType::OpenFile, Severity::Moderate, 0.8),
                (true, _) => (ThemeType::OpenFile, Severity::Minor, 0.7),
                (false, _) => (ThemeType::SemiOpenFile, Severity::Minor, 0.7),
            };
            themes.push(
                ThemeInstance::new(theme_type, piece.square, owner, ctx.ply)
                    .with_pieces([piece])
                    .with_severity(severity)
                    .with_confidence(confidence),
            );
        }
    }
    themes
}

/// Knights and bishops on the fourth to sixth rank, supported by a pawn and out of
/// reach of enemy pawns.
pub(super) fn detect_outposts(ctx: &DetectorContext<'_>) -> Vec<ThemeInstance> {
    let analysis = ctx.analysis;
    let mut themes = vec![];
    for owner in Color::ALL {
        for piece in analysis
            .snapshot()
            .pieces_of(owner)
            .filter(|p| matches!(p.role, Role::Knight | Role::Bishop))
        {
            let rank = piece.square.relative_rank(owner);
            if !(3..=5).contains(&rank)
                || !analysis.pawn_attacks(owner).contains(piece.square)
                || !analysis.is_safe_from_pawns(piece.square, owner)
            {
                continue;
            }
            let severity = match (piece.role, rank) {
                (Role::Knight, 5) => Severity::Significant,
                (Role::Knight, _) => Severity::Moderate,
                _ => Severity::Minor,
            };
            themes.push(
                ThemeInstance::new(ThemeType::Outpost, piece.square, owner, ctx.ply)
                    .with_pieces([piece])
                    .with_severity(severity)
                    .with_confidence(0.75),
            );
        }
    }
    themes
}

pub(super) fn detect_space(ctx: &DetectorContext<'_>) -> Vec<ThemeInstance> {
    let analysis = ctx.analysis;
    let control = Color::ALL.map(|color| {
        analysis
            .attacked_by(color)
            .iter()
            .filter(|sq| sq.relative_rank(color) >= 4)
            .count()
    });
    let mut themes = vec![];
    for owner in Color::ALL {
        let lead = control[owner.index()].saturating_sub(control[owner.opponent().index()]);
        if lead < SPACE_MIN_LEAD {
            continue;
        }
        let anchor = match owner {
            Color::White => Square::new(3, 3),
            Color::Black => Square::new(3, 4),
        };
        let Some(anchor) = anchor else {
            continue;
        };
        let severity = match lead {
            15.. => Severity::Significant,
            10.. => Severity::Moderate,
            _ => Severity::Minor,
        };
        themes.push(
            ThemeInstance::new(ThemeType::SpaceAdvantage, anchor, owner, ctx.ply)
                .with_severity(severity)
                .with_confidence(0.6),
        );
    }
    themes
}

/// Weak squares of one color around a king whose side has lost the bishop of that
/// color, with its pawns fixed on the other color.
pub(super) fn detect_color_complex(ctx: &DetectorContext<'_>) -> Result<Vec<ThemeInstance>, DetectorError> {
    let analysis = ctx.analysis;
    let snapshot = analysis.snapshot();
    let mut themes = vec![];
    for defender in Color::ALL {
        let king = snapshot
            .king(defender)
            .ok_or(DetectorError::MissingKing { color: defender })?;
        let attacker = defender.opponent();
        let has_bishop = |color: Color, light: bool| {
            snapshot
                .pieces_by(color, Role::Bishop)
                .any(|b| b.square.is_light() == light)
        };
        let attacker_has_queen = snapshot.pieces_by(attacker, Role::Queen).next().is_some();

        let mut weakest: Option<(bool, Vec<Square>)> = None;
        for light in [true, false] {
            if has_bishop(defender, light) {
                continue;
            }
            if !has_bishop(attacker, light) && !attacker_has_queen {
                continue;
            }
            let fixed = analysis
                .pawns(defender)
                .iter()
                .filter(|sq| sq.distance(king) <= 2 && sq.is_light() != light)
                .count();
            if fixed < 2 {
                continue;
            }
            let holes = Square::all()
                .filter(|&sq| sq.distance(king) == 1 && sq.is_light() == light)
                .filter(|&sq| {
                    !analysis.pawn_attacks(defender).contains(sq)
                        && !analysis.pawns(defender).contains(&sq)
                })
                .collect::<Vec<_>>();
            if holes.len() < 2 {
                continue;
            }
            if weakest.as_ref().is_none_or(|(_, best)| holes.len() > best.len()) {
                weakest = Some((light, holes));
            }
        }

        if let Some((light, holes)) = weakest {
            let severity = if has_bishop(attacker, light) && attacker_has_queen {
                Severity::Significant
            } else {
                Severity::Moderate
            };
            themes.push(
                ThemeInstance::new(ThemeType::WeakColorComplex, king, attacker, ctx.ply)
                    .with_secondary(holes)
                    .with_severity(severity)
                    .with_confidence(0.55),
            );
        }
    }
    Ok(themes)
}
