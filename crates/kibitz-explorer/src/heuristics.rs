//! Whether a variation is worth extending.
//!
//! [`assess_continuation`] scores the position at the end of a variation from 0 to
//! 100 and maps the score to a [`Suggestion`]. The score starts at a neutral baseline
//! and is adjusted by:
//!
//! - **tension**: hanging pieces, checking moves or pawns about to promote add a
//!   bonus; a quiet position costs a penalty,
//! - **swing**: the evaluation change from the previous node, 1 point per 10
//!   centipawns up to a cap,
//! - **resolution**: decided positions and level quiet positions lose points,
//!   anything else gains some,
//! - **budget pressure**: the score is multiplied by `1 / (1 + (used / soft)^3)`,
//!   which is about 1 well below the soft cap, 0.5 at it and falls quickly after,
//! - **depth**: a linear penalty past a threshold depth and a flat bonus while the
//!   variation is still very short.
//!
//! The hard limits in [`ContinuationConfig`] short-circuit all of this and always
//! yield [`Suggestion::StopNow`] with a score of 0.

use kibitz_board::{BoardError, BoardService, Role};
use kibitz_evaluator::{classification::PositionStatus, evaluation::Evaluation};
use serde::{Deserialize, Serialize};

const BASELINE: f32 = 50.0;
const TENSION_BONUS: f32 = 15.0;
const QUIET_PENALTY: f32 = 10.0;
const SWING_CAP: f32 = 20.0;
const DECIDED_PENALTY: f32 = 20.0;
const LEVEL_QUIET_PENALTY: f32 = 15.0;
const UNRESOLVED_BONUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuationConfig {
    /// Hard limit on variation depth.
    pub max_depth: u32,
    /// Hard limit on collaborator calls spent on the exploration.
    pub max_tool_calls: u32,
    /// Calls at which budget pressure halves the score.
    pub soft_tool_calls: u32,
    pub depth_penalty_start: u32,
    pub depth_penalty_per_ply: f32,
    /// Variations shorter than this get [`short_variation_bonus`](Self::short_variation_bonus).
    pub short_variation_depth: u32,
    pub short_variation_bonus: f32,
    /// Scores above this suggest exploring deeper.
    pub explore_threshold: f32,
    /// Scores above this (and not above `explore_threshold`) suggest wrapping up.
    pub wrap_up_threshold: f32,
}

impl Default for ContinuationConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_tool_calls: 40,
            soft_tool_calls: 25,
            depth_penalty_start: 6,
            depth_penalty_per_ply: 4.0,
            short_variation_depth: 3,
            short_variation_bonus: 10.0,
            explore_threshold: 60.0,
            wrap_up_threshold: 35.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    ExploreDeeper,
    WrapUp,
    StopNow,
}

/// Signs of unresolved tactics in a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tension {
    /// Attacked, undefended non-king pieces of either side.
    pub hanging_pieces: usize,
    /// Legal checking moves for the side to move.
    pub checks: usize,
    /// Pawns of either side one step from promotion with the square ahead empty.
    pub promotion_threats: usize,
}

impl Tension {
    pub fn of<B>(board: &B, fen: &str) -> Result<Self, BoardError>
    where
        B: BoardService + ?Sized,
    {
        let snapshot = board.snapshot(fen)?;
        let hanging_pieces = snapshot
            .pieces()
            .filter(|p| {
                p.role != Role::King
                    && snapshot.is_attacked(p.square, p.color.opponent())
                    && !snapshot.is_attacked(p.square, p.color)
            })
            .count();
        let promotion_threats = snapshot
            .pieces()
            .filter(|p| {
                p.role == Role::Pawn
                    && p.square.relative_rank(p.color) == 6
                    && p.square
                        .offset(0, p.color.forward())
                        .is_some_and(|ahead| snapshot.piece_at(ahead).is_none())
            })
            .count();
        let checks = board
            .legal_moves(fen)?
            .iter()
            .filter(|san| san.ends_with('+') || san.ends_with('#'))
            .count();
        Ok(Self {
            hanging_pieces,
            checks,
            promotion_threats,
        })
    }

    #[must_use]
    pub fn is_present(self) -> bool {
        self.hanging_pieces > 0 || self.checks > 0 || self.promotion_threats > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationAssessment {
    pub suggestion: Suggestion,
    pub interest_score: u8,
    /// Short notes on the adjustments that applied.
    pub reasons: Vec<String>,
}

/// True once either hard limit is reached.
///
/// Monotonic: increasing `depth` or `tool_calls_used` never turns it back to false.
#[must_use]
pub fn should_hard_stop(depth: u32, tool_calls_used: u32, config: &ContinuationConfig) -> bool {
    depth >= config.max_depth || tool_calls_used >= config.max_tool_calls
}

#[must_use]
pub fn budget_factor(tool_calls_used: u32, soft_tool_calls: u32) -> f32 {
    #[expect(clippy::cast_precision_loss)]
    let ratio = tool_calls_used as f32 / soft_tool_calls.max(1) as f32;
    1.0 / (1.0 + ratio.powi(3))
}

/// Assesses the position `fen` at the end of a variation.
///
/// `prev_eval` and `current_eval` must share a perspective. The board is only
/// consulted when no hard limit applies.
pub fn assess_continuation<B>(
    board: &B,
    fen: &str,
    prev_eval: Option<Evaluation>,
    current_eval: Option<Evaluation>,
    depth: u32,
    tool_calls_used: u32,
    config: &ContinuationConfig,
) -> Result<ContinuationAssessment, BoardError>
where
    B: BoardService + ?Sized,
{
    if should_hard_stop(depth, tool_calls_used, config) {
        return Ok(hard_stop(depth, tool_calls_used, config));
    }
    let tension = Tension::of(board, fen)?;
    Ok(assess_with_tension(
        tension,
        prev_eval,
        current_eval,
        depth,
        tool_calls_used,
        config,
    ))
}

fn hard_stop(
    depth: u32,
    tool_calls_used: u32,
    config: &ContinuationConfig,
) -> ContinuationAssessment {
    let reason = if depth >= config.max_depth {
        format!("depth {depth} reached the limit of {}", config.max_depth)
    } else {
        format!(
            "{tool_calls_used} calls reached the limit of {}",
            config.max_tool_calls
        )
    };
    ContinuationAssessment {
        suggestion: Suggestion::StopNow,
        interest_score: 0,
        reasons: vec![reason],
    }
}

/// [`assess_continuation`] with the tension already measured.
#[must_use]
pub fn assess_with_tension(
    tension: Tension,
    prev_eval: Option<Evaluation>,
    current_eval: Option<Evaluation>,
    depth: u32,
    tool_calls_used: u32,
    config: &ContinuationConfig,
) -> ContinuationAssessment {
    if should_hard_stop(depth, tool_calls_used, config) {
        return hard_stop(depth, tool_calls_used, config);
    }

    let mut reasons = vec![];
    let mut score = BASELINE;

    if tension.is_present() {
        score += TENSION_BONUS;
        reasons.push(format!(
            "tension: {} hanging, {} checks, {} promotion threats",
            tension.hanging_pieces, tension.checks, tension.promotion_threats
        ));
    } else {
        score -= QUIET_PENALTY;
        reasons.push("quiet position".to_owned());
    }

    if let (Some(prev), Some(current)) = (prev_eval, current_eval) {
        let swing = current
            .normalized()
            .saturating_sub(prev.normalized())
            .unsigned_abs();
        #[expect(clippy::cast_precision_loss)]
        let bonus = (swing as f32 / 10.0).min(SWING_CAP);
        if bonus > 0.0 {
            score += bonus;
            reasons.push(format!("evaluation moved {swing}cp"));
        }
    }

    match current_eval.map(PositionStatus::from_evaluation) {
        Some(status) if status.is_decided() => {
            score -= DECIDED_PENALTY;
            reasons.push("position is decided".to_owned());
        }
        Some(PositionStatus::Equal) if !tension.is_present() => {
            score -= LEVEL_QUIET_PENALTY;
            reasons.push("level and quiet".to_owned());
        }
        Some(_) => {
            score += UNRESOLVED_BONUS;
            reasons.push("unresolved".to_owned());
        }
        None => {}
    }

    let factor = budget_factor(tool_calls_used, config.soft_tool_calls);
    score *= factor;
    if factor < 0.9 {
        reasons.push(format!("budget pressure x{factor:.2}"));
    }

    if depth > config.depth_penalty_start {
        #[expect(clippy::cast_precision_loss)]
        let plies = (depth - config.depth_penalty_start) as f32;
        score -= config.depth_penalty_per_ply * plies;
        reasons.push(format!("depth {depth}"));
    }
    if depth < config.short_variation_depth {
        score += config.short_variation_bonus;
        reasons.push("variation still short".to_owned());
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let interest_score = score.clamp(0.0, 100.0).round() as u8;
    let score = f32::from(interest_score);
    let suggestion = if score > config.explore_threshold {
        Suggestion::ExploreDeeper
    } else if score > config.wrap_up_threshold {
        Suggestion::WrapUp
    } else {
        Suggestion::StopNow
    };
    ContinuationAssessment {
        suggestion,
        interest_score,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use kibitz_board::ShakmatyBoard;

    use super::*;

    fn tense() -> Tension {
        Tension {
            hanging_pieces: 1,
            ..Tension::default()
        }
    }

    mod limits {
        use super::*;

        #[test]
        fn test_tool_call_limit_stops_with_zero_score() {
            let config = ContinuationConfig::default();
            let assessment = assess_with_tension(
                tense(),
                Some(Evaluation::cp(0)),
                Some(Evaluation::cp(300)),
                1,
                40,
                &config,
            );
            assert_eq!(assessment.suggestion, Suggestion::StopNow);
            assert_eq!(assessment.interest_score, 0);
        }

        #[test]
        fn test_hard_stop_skips_the_board() {
            let config = ContinuationConfig::default();
            let assessment =
                assess_continuation(&ShakmatyBoard, "not a fen", None, None, 20, 0, &config)
                    .unwrap();
            assert_eq!(assessment.suggestion, Suggestion::StopNow);
            let result =
                assess_continuation(&ShakmatyBoard, "not a fen", None, None, 2, 0, &config);
            assert!(result.is_err());
        }

        #[test]
        fn test_hard_stop_is_monotonic() {
            let config = ContinuationConfig {
                max_depth: 8,
                max_tool_calls: 12,
                ..ContinuationConfig::default()
            };
            for depth in 0..16 {
                for calls in 0..24 {
                    if should_hard_stop(depth, calls, &config) {
                        for more_depth in depth..16 {
                            for more_calls in calls..24 {
                                assert!(should_hard_stop(more_depth, more_calls, &config));
                            }
                        }
                    }
                }
            }
        }
    }

    mod scoring {
        use super::*;

        #[test]
        fn test_tense_swinging_short_line_explores() {
            // 50 + 15 tension + 15 swing + 10 unresolved, + 10 short
            let assessment = assess_with_tension(
                tense(),
                Some(Evaluation::cp(0)),
                Some(Evaluation::cp(150)),
                2,
                0,
                &ContinuationConfig::default(),
            );
            assert_eq!(assessment.interest_score, 100);
            assert_eq!(assessment.suggestion, Suggestion::ExploreDeeper);
        }

        #[test]
        fn test_budget_pressure_halves_at_soft_cap() {
            assert!((budget_factor(25, 25) - 0.5).abs() < 1e-6);
            assert!((budget_factor(0, 25) - 1.0).abs() < 1e-6);
            assert!(budget_factor(30, 25) < budget_factor(26, 25));

            // 90 * 0.5 + 10 short
            let assessment = assess_with_tension(
                tense(),
                Some(Evaluation::cp(0)),
                Some(Evaluation::cp(150)),
                2,
                25,
                &ContinuationConfig::default(),
            );
            assert_eq!(assessment.interest_score, 55);
            assert_eq!(assessment.suggestion, Suggestion::WrapUp);
        }

        #[test]
        fn test_quiet_level_position_stops() {
            // 50 - 10 quiet - 15 level
            let assessment = assess_with_tension(
                Tension::default(),
                Some(Evaluation::cp(10)),
                Some(Evaluation::cp(12)),
                4,
                0,
                &ContinuationConfig::default(),
            );
            assert_eq!(assessment.interest_score, 25);
            assert_eq!(assessment.suggestion, Suggestion::StopNow);
        }

        #[test]
        fn test_decided_position_wraps_up() {
            // 50 - 10 quiet + 20 swing - 20 decided
            let assessment = assess_with_tension(
                Tension::default(),
                Some(Evaluation::cp(0)),
                Some(Evaluation::mate(3)),
                4,
                0,
                &ContinuationConfig::default(),
            );
            assert_eq!(assessment.interest_score, 40);
            assert_eq!(assessment.suggestion, Suggestion::WrapUp);
        }

        #[test]
        fn test_depth_penalty() {
            // 90 - 4 * (10 - 6)
            let assessment = assess_with_tension(
                tense(),
                Some(Evaluation::cp(0)),
                Some(Evaluation::cp(150)),
                10,
                0,
                &ContinuationConfig::default(),
            );
            assert_eq!(assessment.interest_score, 74);
        }

        #[test]
        fn test_is_deterministic() {
            let run = || {
                assess_with_tension(
                    tense(),
                    Some(Evaluation::cp(-40)),
                    Some(Evaluation::cp(85)),
                    7,
                    13,
                    &ContinuationConfig::default(),
                )
            };
            assert_eq!(run(), run());
        }
    }

    mod tension {
        use super::*;

        #[test]
        fn test_hanging_piece_and_check() {
            // The c6 knight is attacked by the b5 bishop and undefended; Bxc6+ checks.
            let tension =
                Tension::of(&ShakmatyBoard, "4k3/8/2n5/1B6/8/8/8/4K3 w - - 0 1").unwrap();
            assert_eq!(tension.hanging_pieces, 1);
            assert!(tension.checks >= 1);
            assert_eq!(tension.promotion_threats, 0);
            assert!(tension.is_present());
        }

        #[test]
        fn test_promotion_threat() {
            let tension = Tension::of(&ShakmatyBoard, "7k/1P6/8/8/8/8/8/K7 b - - 0 1").unwrap();
            assert_eq!(tension.promotion_threats, 1);
        }

        #[test]
        fn test_quiet_start_position() {
            let tension = Tension::of(
                &ShakmatyBoard,
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            )
            .unwrap();
            assert!(!tension.is_present());
        }
    }
}
