use kibitz_board::Role;

use crate::{
    detector::DetectorContext,
    theme::{Severity, ThemeInstance, ThemeType},
};

/// Single pieces attacking two or more worthwhile enemy pieces.
///
/// A target is worthwhile when it is the king, worth more than the forking piece, or
/// undefended. A king can only fork undefended pieces.
pub(super) fn detect(ctx: &DetectorContext<'_>) -> Vec<ThemeInstance> {
    let analysis = ctx.analysis;
    let snapshot = analysis.snapshot();
    let mut themes = vec![];
    for forker in snapshot.pieces() {
        let enemy = forker.color.opponent();
        let mut targets = snapshot
            .attacks_from(forker.square)
            .iter()
            .filter_map(|sq| snapshot.placed_at(sq))
            .filter(|target| target.color == enemy)
            .filter(|target| {
                let defended = analysis.is_attacked(target.square, enemy);
                if forker.role == Role::King {
                    !defended && target.role != Role::King
                } else {
                    target.role == Role::King || target.value() > forker.value() || !defended
                }
            })
            .collect::<Vec<_>>();
        if targets.len() < 2 {
            continue;
        }
        targets.sort_by_key(|t| std::cmp::Reverse(t.value()));

        let checks = targets[0].role == Role::King;
        // The defender saves the most valuable piece; the second one is what is won.
        let won = targets[1].value();
        let severity = if checks {
            Severity::for_material(won).max(Severity::Significant)
        } else {
            Severity::for_material(won)
        };
        let safe = !analysis.is_attacked(forker.square, enemy);
        let confidence = match (safe, checks) {
            (true, true) => 0.9,
            (true, false) => 0.8,
            (false, true) => 0.65,
            (false, false) => 0.5,
        };
        themes.push(
            ThemeInstance::new(ThemeType::Fork, forker.square, forker.color, ctx.ply)
                .with_secondary(targets.iter().map(|t| t.square))
                .with_pieces(std::iter::once(forker).chain(targets.iter().copied()))
                .with_severity(severity)
                .with_confidence(confidence)
                .with_material(won)
                .absolute(checks),
        );
    }
    themes
}
