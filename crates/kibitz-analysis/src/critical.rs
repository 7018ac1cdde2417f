//! Choosing the plies worth deep commentary.
//!
//! Every ply gets an interest score between 0 and 100 built from four parts:
//!
//! | part                 | points                                                  |
//! |----------------------|---------------------------------------------------------|
//! | classification       | blunder 40, brilliant 35, mistake 28, inaccuracy 15     |
//! | evaluation swing     | `min(30, |swing| / 10)`                                  |
//! | status crossing      | 15 when the position status changed                     |
//! | theme activity       | `min(15, 5 * emerged_or_escalated_themes)`              |
//!
//! The selector keeps at most `ceil(total_moves * max_critical_ratio)` plies scoring
//! at least the minimum, best first with ties going to the earlier ply, and returns
//! them in ply order.

use kibitz_evaluator::classification::Classification;
use serde::{Deserialize, Serialize};

use crate::moves::MoveAnalysis;

const SWING_MAX: u8 = 30;
const CROSSING_POINTS: u8 = 15;
const ACTIVITY_POINTS_PER_THEME: usize = 5;
const ACTIVITY_MAX: u8 = 15;

/// What made a ply interesting, by its largest score contribution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CriticalMomentType {
    #[display("blunder")]
    Blunder,
    #[display("mistake")]
    Mistake,
    #[display("inaccuracy")]
    Inaccuracy,
    #[display("brilliant")]
    Brilliant,
    #[display("eval_swing")]
    EvalSwing,
    #[display("turning_point")]
    TurningPoint,
    #[display("tactical_shift")]
    TacticalShift,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalMoment {
    pub ply: u32,
    pub moment_type: CriticalMomentType,
    /// Interest score, 0 to 100.
    pub score: u8,
    pub reason: String,
}

/// Breakdown of one ply's interest score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestScore {
    pub classification: u8,
    pub swing: u8,
    pub crossing: u8,
    pub activity: u8,
}

impl InterestScore {
    #[must_use]
    pub fn of(analysis: &MoveAnalysis, theme_activity: usize) -> Self {
        let classification = match analysis.classification() {
            Classification::Blunder => 40,
            Classification::Brilliant => 35,
            Classification::Mistake => 28,
            Classification::Inaccuracy => 15,
            _ => 0,
        };
        let swing = u8::try_from(analysis.eval_swing().unsigned_abs() / 10)
            .unwrap_or(u8::MAX)
            .min(SWING_MAX);
        let crossing = if analysis.status_before() == analysis.status_after() {
            0
        } else {
            CROSSING_POINTS
        };
        let activity = u8::try_from(theme_activity.saturating_mul(ACTIVITY_POINTS_PER_THEME))
            .unwrap_or(u8::MAX)
            .min(ACTIVITY_MAX);
        Self {
            classification,
            swing,
            crossing,
            activity,
        }
    }

    #[must_use]
    pub fn total(self) -> u8 {
        (self.classification + self.swing + self.crossing + self.activity).min(100)
    }

    /// Type of the largest contribution. Ties go to classification, then swing,
    /// crossing and activity in that order.
    #[must_use]
    pub fn dominant(self, classification: Classification) -> CriticalMomentType {
        let parts = [
            (self.classification, None),
            (self.swing, Some(CriticalMomentType::EvalSwing)),
            (self.crossing, Some(CriticalMomentType::TurningPoint)),
            (self.activity, Some(CriticalMomentType::TacticalShift)),
        ];
        let mut best = parts[0];
        for part in &parts[1..] {
            if part.0 > best.0 {
                best = *part;
            }
        }
        best.1.unwrap_or(match classification {
            Classification::Blunder => CriticalMomentType::Blunder,
            Classification::Mistake => CriticalMomentType::Mistake,
            Classification::Inaccuracy => CriticalMomentType::Inaccuracy,
            Classification::Brilliant => CriticalMomentType::Brilliant,
            _ => CriticalMomentType::EvalSwing,
        })
    }
}

/// Largest number of critical moments a game of `total_moves` plies may have.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn critical_cap(total_moves: usize, max_critical_ratio: f32) -> usize {
    // Round away f32 representation noise so that 40 * 0.15 is 6, not 7.
    let ratio = (f64::from(max_critical_ratio.clamp(0.0, 1.0)) * 1e6).round() / 1e6;
    ((total_moves as f64 * ratio).ceil() as usize).min(total_moves)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalMomentSelector {
    pub max_critical_ratio: f32,
    pub min_interest_score: u8,
}

impl CriticalMomentSelector {
    /// Selects critical moments among `moves`.
    ///
    /// `theme_activity[i]` is the number of emerged or escalated themes at `moves[i]`;
    /// missing entries count as zero.
    #[must_use]
    pub fn select(&self, moves: &[MoveAnalysis], theme_activity: &[usize]) -> Vec<CriticalMoment> {
        let cap = critical_cap(moves.len(), self.max_critical_ratio);
        let mut scored = moves
            .iter()
            .enumerate()
            .map(|(i, analysis)| {
                let activity = theme_activity.get(i).copied().unwrap_or(0);
                (analysis, activity, InterestScore::of(analysis, activity))
            })
            .filter(|(_, _, score)| score.total() >= self.min_interest_score)
            .collect::<Vec<_>>();
        scored.sort_by_key(|(analysis, _, score)| (std::cmp::Reverse(score.total()), analysis.ply()));
        scored.truncate(cap);

        let mut moments = scored
            .into_iter()
            .map(|(analysis, activity, score)| {
                let moment_type = score.dominant(analysis.classification());
                CriticalMoment {
                    ply: analysis.ply(),
                    moment_type,
                    score: score.total(),
                    reason: reason(analysis, activity, moment_type),
                }
            })
            .collect::<Vec<_>>();
        moments.sort_by_key(|m| m.ply);
        log::debug!("selected {} of at most {cap} critical moments", moments.len());
        moments
    }
}

fn reason(analysis: &MoveAnalysis, activity: usize, moment_type: CriticalMomentType) -> String {
    let san = analysis.san();
    match moment_type {
        CriticalMomentType::Blunder
        | CriticalMomentType::Mistake
        | CriticalMomentType::Inaccuracy => format!(
            "{san} is a {} losing {} centipawns",
            analysis.classification(),
            analysis.cp_loss()
        ),
        CriticalMomentType::Brilliant => format!("{san} is a strong move few players would find"),
        CriticalMomentType::EvalSwing => {
            format!("{san} swings the evaluation by {} centipawns", analysis.eval_swing())
        }
        CriticalMomentType::TurningPoint => format!(
            "after {san} the position goes from {} to {}",
            analysis.status_before(),
            analysis.status_after()
        ),
        CriticalMomentType::TacticalShift => {
            format!("{san} brings {activity} new or sharper themes")
        }
    }
}

/// Sets the critical flag on exactly the plies in `moments`.
pub fn mark_critical(moves: &mut [MoveAnalysis], moments: &[CriticalMoment]) {
    for analysis in moves {
        let is_critical = moments.iter().any(|m| m.ply == analysis.ply());
        analysis.set_critical(is_critical);
    }
}
