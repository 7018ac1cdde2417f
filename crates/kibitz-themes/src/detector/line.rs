//! Pins, skewers and discovered attacks.
//!
//! All three come from the same scan: from every slider, walk each of its directions
//! to the first piece (front) and on to the second (back).
//!
//! | front    | back     | result                                             |
//! |----------|----------|----------------------------------------------------|
//! | defender | defender | pin; also a skewer if front is worth at most back  |
//! | attacker | defender | discovered attack (discovered check on the king)   |
//!
//! A pin is absolute when the back piece is the king. A skewer is absolute when either
//! piece is the king.

use kibitz_board::{PlacedPiece, RayScan, Role};

use crate::{
    detector::DetectorContext,
    theme::{Severity, ThemeInstance, ThemeType},
};

pub(super) fn detect(ctx: &DetectorContext<'_>) -> Vec<ThemeInstance> {
    let snapshot = ctx.analysis.snapshot();
    let mut themes = vec![];
    for slider in snapshot.pieces().filter(|p| p.role.is_slider()) {
        for &direction in slider.role.slider_directions() {
            let scan = snapshot.ray_scan(slider.square, direction);
            let (Some(front), Some(back)) = (scan.front, scan.back) else {
                continue;
            };
            let attacker = slider.color;
            let defender = attacker.opponent();
            if front.color == defender && back.color == defender {
                if front.role != Role::King {
                    themes.push(pin(ctx, slider, front, back, &scan));
                }
                if front.role == Role::King || front.value() <= back.value() {
                    themes.push(skewer(ctx, slider, front, back, &scan));
                }
            } else if front.color == attacker && back.color == defender {
                if let Some(theme) = discovered(ctx, slider, front, back) {
                    themes.push(theme);
                }
            }
        }
    }
    themes
}

fn pin(
    ctx: &DetectorContext<'_>,
    slider: PlacedPiece,
    front: PlacedPiece,
    back: PlacedPiece,
    scan: &RayScan,
) -> ThemeInstance {
    let is_absolute = back.role == Role::King;
    let (severity, confidence) = if is_absolute {
        (Severity::Critical, 0.95)
    } else {
        #[expect(clippy::cast_precision_loss)]
        let confidence = 0.4 + back.value().min(9) as f32 * 0.05;
        (Severity::for_material(back.value()), confidence)
    };
    ThemeInstance::new(ThemeType::Pin, front.square, slider.color, ctx.ply)
        .with_secondary([slider.square, back.square])
        .with_secondary(scan.between.iter().copied())
        .with_pieces([slider, front, back])
        .with_severity(severity)
        .with_confidence(confidence)
        .with_material(front.value())
        .absolute(is_absolute)
}

fn skewer(
    ctx: &DetectorContext<'_>,
    slider: PlacedPiece,
    front: PlacedPiece,
    back: PlacedPiece,
    scan: &RayScan,
) -> ThemeInstance {
    let is_absolute = front.role == Role::King || back.role == Role::King;
    let defended = ctx.analysis.is_attacked(back.square, back.color);
    // Winning the back piece only pays when it is undefended or worth more than the
    // slider that takes it.
    let pays = !defended || back.value() > slider.value();
    let severity = if front.role == Role::King {
        Severity::for_material(back.value()).max(Severity::Significant)
    } else {
        Severity::for_material(back.value())
    };
    let confidence = match (is_absolute, pays) {
        (true, true) => 0.9,
        (true, false) | (false, true) => 0.7,
        (false, false) => 0.45,
    };
    let material = if front.role == Role::King {
        back.value()
    } else {
        front.value()
    };
    ThemeInstance::new(ThemeType::Skewer, front.square, slider.color, ctx.ply)
        .with_secondary([slider.square, back.square])
        .with_secondary(scan.between.iter().copied())
        .with_pieces([slider, front, back])
        .with_severity(severity)
        .with_confidence(confidence)
        .with_material(material)
        .absolute(is_absolute)
}

fn discovered(
    ctx: &DetectorContext<'_>,
    slider: PlacedPiece,
    blocker: PlacedPiece,
    target: PlacedPiece,
) -> Option<ThemeInstance> {
    if target.role == Role::King {
        return Some(
            ThemeInstance::new(ThemeType::DiscoveredCheck, blocker.square, slider.color, ctx.ply)
                .with_secondary([slider.square, target.square])
                .with_pieces([slider, blocker, target])
                .with_severity(Severity::Critical)
                .with_confidence(if blocker.role == Role::Pawn { 0.7 } else { 0.9 })
                .absolute(true),
        );
    }
    let defended = ctx.analysis.is_attacked(target.square, target.color);
    if defended && target.value() <= slider.value() {
        return None;
    }
    let confidence = if blocker.role == Role::Pawn { 0.5 } else { 0.7 };
    Some(
        ThemeInstance::new(ThemeType::DiscoveredAttack, blocker.square, slider.color, ctx.ply)
            .with_secondary([slider.square, target.square])
            .with_pieces([slider, blocker, target])
            .with_severity(Severity::for_material(target.value()))
            .with_confidence(confidence)
            .with_material(target.value()),
    )
}
