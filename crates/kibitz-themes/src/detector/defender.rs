use kibitz_board::{Color, PlacedPiece};

use crate::{
    detector::DetectorContext,
    theme::{Severity, ThemeInstance, ThemeType},
};

/// Hanging pieces and overloaded defenders.
///
/// - **Hanging**: a non-king piece attacked by the opponent and defended by nothing.
/// - **Overloaded**: a piece that is the sole defender of two or more attacked pieces;
///   it cannot keep both.
pub(super) fn detect(ctx: &DetectorContext<'_>) -> Vec<ThemeInstance> {
    let mut themes = vec![];
    for owner in Color::ALL {
        themes.extend(hanging(ctx, owner));
        themes.extend(overloaded(ctx, owner));
    }
    themes
}

fn hanging(ctx: &DetectorContext<'_>, owner: Color) -> Vec<ThemeInstance> {
    let analysis = ctx.analysis;
    let attacker = owner.opponent();
    let to_move = analysis.snapshot().side_to_move() == attacker;
    analysis
        .non_king_pieces(owner)
        .filter(|p| analysis.is_attacked(p.square, attacker) && !analysis.is_attacked(p.square, owner))
        .map(|piece| {
            let attackers = analysis.snapshot().attackers_of(piece.square, attacker);
            ThemeInstance::new(ThemeType::HangingPiece, piece.square, attacker, ctx.ply)
                .with_secondary(attackers.iter())
                .with_pieces([piece])
                .with_severity(Severity::for_material(piece.value()))
                .with_confidence(if to_move { 0.9 } else { 0.6 })
                .with_material(piece.value())
        })
        .collect()
}

fn overloaded(ctx: &DetectorContext<'_>, owner: Color) -> Vec<ThemeInstance> {
    let analysis = ctx.analysis;
    let attacker = owner.opponent();
    // Attacked pieces with exactly one defender, grouped by that defender. A king in
    // check is not something a defender guards.
    let mut burdens = Vec::<(PlacedPiece, Vec<PlacedPiece>)>::new();
    for guarded in analysis.non_king_pieces(owner) {
        if !analysis.is_attacked(guarded.square, attacker) {
            continue;
        }
        let defenders = analysis.defenders(guarded.square, owner);
        if defenders.len() != 1 {
            continue;
        }
        let Some(defender) = defenders.iter().next().and_then(|sq| analysis.snapshot().placed_at(sq)) else {
            continue;
        };
        match burdens.iter_mut().find(|(d, _)| d.square == defender.square) {
            Some((_, list)) => list.push(guarded),
            None => burdens.push((defender, vec![guarded])),
        }
    }

    burdens
        .into_iter()
        .filter(|(_, guarded)| guarded.len() >= 2)
        .map(|(defender, guarded)| {
            let max_value = guarded.iter().map(|p| p.value()).max().unwrap_or(0);
            let min_value = guarded.iter().map(|p| p.value()).min().unwrap_or(0);
            ThemeInstance::new(ThemeType::OverloadedDefender, defender.square, attacker, ctx.ply)
                .with_secondary(guarded.iter().map(|p| p.square))
                .with_pieces(std::iter::once(defender).chain(guarded.iter().copied()))
                .with_severity(Severity::for_material(max_value))
                .with_confidence(0.7)
                .with_material(min_value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{
        Detector,
        test_util::{find, run, sq},
    };

    #[test]
    fn test_undefended_attacked_knight_hangs() {
        // Bb5 attacks the knight on c6 and nothing defends it.
        let themes = run(Detector::DefenderTactics, "4k3/8/2n5/1B6/8/8/8/4K3 w - - 0 1");
        let theme = find(&themes, ThemeType::HangingPiece, "c6").unwrap();
        assert_eq!(theme.beneficiary, Color::White);
        assert_eq!(theme.material_at_stake, 3);
        assert!(theme.secondary_squares.contains(&sq("b5")));
        assert!((theme.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_defended_piece_does_not_hang() {
        let themes = run(Detector::DefenderTactics, "4k3/3p4/2n5/1B6/8/8/8/4K3 w - - 0 1");
        assert!(find(&themes, ThemeType::HangingPiece, "c6").is_none());
    }

    #[test]
    fn test_sole_defender_of_two_attacked_pieces_is_overloaded() {
        // The d7 bishop alone guards c6 and e6; both are attacked by white pieces.
        let themes = run(
            Detector::DefenderTactics,
            "7k/3b4/2n1n3/8/2R1R3/8/8/6K1 w - - 0 1",
        );
        let theme = find(&themes, ThemeType::OverloadedDefender, "d7").unwrap();
        assert_eq!(theme.beneficiary, Color::White);
        assert_eq!(theme.secondary_squares.len(), 2);
        assert_eq!(theme.severity, Severity::Minor);
    }

    #[test]
    fn test_king_in_check_is_not_a_burden() {
        // Nd3 alone covers both the checked king on e1 and the rook on b2.
        let themes = run(
            Detector::DefenderTactics,
            "k3r3/8/5b2/8/8/3N4/1R6/4K3 w - - 0 1",
        );
        assert!(find(&themes, ThemeType::OverloadedDefender, "d3").is_none());
        assert!(find(&themes, ThemeType::HangingPiece, "b2").is_none());
    }
}
