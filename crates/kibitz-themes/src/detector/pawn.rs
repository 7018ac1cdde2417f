//! Pawn structure.
//!
//! Weaknesses (isolated, doubled, backward) benefit the opponent of the pawn's owner.
//! Strengths (passed pawns, connected passers, chains, wing majorities) benefit the
//! owner.

use kibitz_board::{Color, Piece, PlacedPiece, Role, Square};

use crate::{
    detector::{DetectorContext, DetectorError},
    position::PositionAnalysis,
    theme::{Severity, ThemeInstance, ThemeType},
};

const QUEENSIDE: [u8; 3] = [0, 1, 2];
const KINGSIDE: [u8; 3] = [5, 6, 7];

pub(super) fn detect(ctx: &DetectorContext<'_>) -> Result<Vec<ThemeInstance>, DetectorError> {
    let analysis = ctx.analysis;
    let mut themes = vec![];
    for color in Color::ALL {
        if let Some(sq) = analysis
            .pawns(color)
            .iter()
            .find(|sq| sq.rank() == 0 || sq.rank() == 7)
        {
            return Err(DetectorError::InconsistentPosition {
                reason: format!("{color} pawn on {sq}"),
            });
        }
        weaknesses(ctx, color, &mut themes);
        passers(ctx, color, &mut themes);
        chains(ctx, color, &mut themes);
        majorities(ctx, color, &mut themes);
    }
    Ok(themes)
}

fn pawn(square: Square, color: Color) -> PlacedPiece {
    PlacedPiece::new(square, Piece::new(color, Role::Pawn))
}

fn weaknesses(ctx: &DetectorContext<'_>, owner: Color, themes: &mut Vec<ThemeInstance>) {
    let analysis = ctx.analysis;
    let enemy = owner.opponent();
    for &sq in analysis.pawns(owner) {
        let mut neighbours = analysis.pawns_on_adjacent_files(owner, sq.file()).peekable();
        if neighbours.peek().is_none() {
            themes.push(
                ThemeInstance::new(ThemeType::IsolatedPawn, sq, enemy, ctx.ply)
                    .with_pieces([pawn(sq, owner)])
                    .with_confidence(0.9)
                    .with_material(Role::Pawn.value()),
            );
            continue;
        }
        let rank = sq.relative_rank(owner);
        let left_behind = neighbours.all(|n| n.relative_rank(owner) > rank);
        let stop_covered = sq
            .offset(0, owner.forward())
            .is_some_and(|stop| analysis.pawn_attacks(enemy).contains(stop));
        if left_behind && stop_covered {
            let semi_open = analysis.pawns_on_file(enemy, sq.file()) == 0;
            themes.push(
                ThemeInstance::new(ThemeType::BackwardPawn, sq, enemy, ctx.ply)
                    .with_pieces([pawn(sq, owner)])
                    .with_severity(if semi_open {
                        Severity::Moderate
                    } else {
                        Severity::Minor
                    })
                    .with_confidence(0.7)
                    .with_material(Role::Pawn.value()),
            );
        }
    }

    for file in 0..8 {
        let count = analysis.pawns_on_file(owner, file);
        if count < 2 {
            continue;
        }
        let mut stacked = analysis
            .pawns(owner)
            .iter()
            .copied()
            .filter(|sq| sq.file() == file)
            .collect::<Vec<_>>();
        stacked.sort_by_key(|sq| std::cmp::Reverse(sq.relative_rank(owner)));
        let front = stacked[0];
        themes.push(
            ThemeInstance::new(ThemeType::DoubledPawns, front, enemy, ctx.ply)
                .with_secondary(stacked[1..].iter().copied())
                .with_pieces(stacked.iter().map(|&sq| pawn(sq, owner)))
                .with_severity(if count >= 3 {
                    Severity::Moderate
                } else {
                    Severity::Minor
                })
                .with_confidence(0.9)
                .with_material(Role::Pawn.value()),
        );
    }
}

fn passers(ctx: &DetectorContext<'_>, owner: Color, themes: &mut Vec<ThemeInstance>) {
    let analysis = ctx.analysis;
    let snapshot = analysis.snapshot();
    let passed = analysis
        .pawns(owner)
        .iter()
        .copied()
        .filter(|&sq| analysis.is_passed_pawn(sq, owner))
        .collect::<Vec<_>>();

    for &sq in &passed {
        let rank = sq.relative_rank(owner);
        let severity = match rank {
            6.. => Severity::Critical,
            5 => Severity::Significant,
            4 => Severity::Moderate,
            _ => Severity::Minor,
        };
        let blockaded = sq
            .offset(0, owner.forward())
            .is_some_and(|stop| snapshot.piece_at(stop).is_some());
        themes.push(
            ThemeInstance::new(ThemeType::PassedPawn, sq, owner, ctx.ply)
                .with_pieces([pawn(sq, owner)])
                .with_severity(severity)
                .with_confidence(if blockaded { 0.65 } else { 0.85 })
                .with_material(Role::Pawn.value()),
        );
    }

    for (i, &a) in passed.iter().enumerate() {
        for &b in &passed[i + 1..] {
            if a.file().abs_diff(b.file()) != 1 || a.rank().abs_diff(b.rank()) > 1 {
                continue;
            }
            let (low, high) = if a.file() < b.file() { (a, b) } else { (b, a) };
            let advanced = low.relative_rank(owner) >= 5 && high.relative_rank(owner) >= 5;
            themes.push(
                ThemeInstance::new(ThemeType::ConnectedPassers, low, owner, ctx.ply)
                    .with_secondary([high])
                    .with_pieces([pawn(low, owner), pawn(high, owner)])
                    .with_severity(if advanced {
                        Severity::Critical
                    } else {
                        Severity::Significant
                    })
                    .with_confidence(0.85)
                    .with_material(2 * Role::Pawn.value()),
            );
        }
    }
}

/// Groups of three or more pawns linked by diagonal protection.
fn chains(ctx: &DetectorContext<'_>, owner: Color, themes: &mut Vec<ThemeInstance>) {
    let pawns = ctx.analysis.pawns(owner);
    let linked = |a: Square, b: Square| {
        a.file().abs_diff(b.file()) == 1 && a.rank().abs_diff(b.rank()) == 1
    };
    let mut seen = vec![false; pawns.len()];
    for start in 0..pawns.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut component = vec![pawns[start]];
        let mut cursor = 0;
        while cursor < component.len() {
            let current = component[cursor];
            cursor += 1;
            for (i, &other) in pawns.iter().enumerate() {
                if !seen[i] && linked(current, other) {
                    seen[i] = true;
                    component.push(other);
                }
            }
        }
        if component.len() < 3 {
            continue;
        }
        component.sort_by_key(|sq| (sq.relative_rank(owner), sq.file()));
        let base = component[0];
        let severity = match component.len() {
            3 => Severity::Minor,
            4 => Severity::Moderate,
            _ => Severity::Significant,
        };
        themes.push(
            ThemeInstance::new(ThemeType::PawnChain, base, owner, ctx.ply)
                .with_secondary(component[1..].iter().copied())
                .with_pieces(component.iter().map(|&sq| pawn(sq, owner)))
                .with_severity(severity)
                .with_confidence(0.75),
        );
    }
}

fn majorities(ctx: &DetectorContext<'_>, owner: Color, themes: &mut Vec<ThemeInstance>) {
    let analysis = ctx.analysis;
    for (wing, anchor_file) in [(QUEENSIDE, 0), (KINGSIDE, 7)] {
        let own = wing_count(analysis, owner, wing);
        let enemy = wing_count(analysis, owner.opponent(), wing);
        if own <= enemy {
            continue;
        }
        let Some(anchor) = Square::new(anchor_file, owner.home_rank()) else {
            continue;
        };
        let severity = match own - enemy {
            1 => Severity::Minor,
            2 => Severity::Moderate,
            _ => Severity::Significant,
        };
        let pawns = analysis
            .pawns(owner)
            .iter()
            .copied()
            .filter(|sq| wing.contains(&sq.file()));
        themes.push(
            ThemeInstance::new(ThemeType::PawnMajority, anchor, owner, ctx.ply)
                .with_secondary(pawns.clone())
                .with_pieces(pawns.map(|sq| pawn(sq, owner)))
                .with_severity(severity)
                .with_confidence(0.6)
                .with_material(i32::from(own - enemy) * Role::Pawn.value()),
        );
    }
}

fn wing_count(analysis: &PositionAnalysis, color: Color, wing: [u8; 3]) -> u8 {
    wing.iter().map(|&file| analysis.pawns_on_file(color, file)).sum()
}
