//! Engine scores and their normalization.
//!
//! An engine reports a position either as a centipawn score or as "mate in N". Both
//! forms are always given from the **side to move's** perspective: `cp = 120` means the
//! side to move is better by 1.2 pawns, `mate = -3` means the side to move gets mated
//! in three.
//!
//! [`Evaluation::normalized`] collapses both forms into one signed number so that scores
//! can be added, compared and subtracted without special cases:
//!
//! ```text
//! mate N (N > 0)  =>  +(MATE_SCORE - N * MATE_STEP)   (never below MATE_FLOOR)
//! mate N (N < 0)  =>  -(MATE_SCORE - |N| * MATE_STEP) (never above -MATE_FLOOR)
//! mate 0          =>  -MATE_SCORE                      (side to move is mated)
//! cp C            =>  C
//! ```
//!
//! Closer mates are more extreme, and every mate score is far outside the range a
//! centipawn score can reach.
//!
//! # Example
//!
//! ```
//! use kibitz_evaluator::evaluation::{Evaluation, MATE_SCORE};
//!
//! assert_eq!(Evaluation::cp(35).normalized(), 35);
//! assert!(Evaluation::mate(1).normalized() > Evaluation::mate(5).normalized());
//! assert!(Evaluation::mate(5).normalized() > Evaluation::cp(5_000).normalized());
//! assert_eq!(Evaluation::mate(0).normalized(), -MATE_SCORE);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized value of "mated right now".
pub const MATE_SCORE: i32 = 100_000;

/// How much each additional move to mate reduces the normalized magnitude.
pub const MATE_STEP: i32 = 100;

/// Smallest magnitude a mate score can normalize to, however long the mate.
pub const MATE_FLOOR: i32 = 50_000;

/// A raw engine score from the side to move's perspective.
///
/// When both fields are present, `mate` takes precedence. When neither is present the
/// evaluation is treated as a dead draw (0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate: Option<i32>,
}

impl Evaluation {
    #[must_use]
    pub const fn cp(cp: i32) -> Self {
        Self {
            cp: Some(cp),
            mate: None,
        }
    }

    #[must_use]
    pub const fn mate(moves: i32) -> Self {
        Self {
            cp: None,
            mate: Some(moves),
        }
    }

    #[must_use]
    pub const fn is_mate(self) -> bool {
        self.mate.is_some()
    }

    /// Signed centipawn-equivalent value.
    #[must_use]
    pub fn normalized(self) -> i32 {
        match (self.mate, self.cp) {
            (Some(0), _) => -MATE_SCORE,
            (Some(n), _) => {
                let magnitude = MATE_SCORE
                    .saturating_sub(n.saturating_abs().saturating_mul(MATE_STEP))
                    .max(MATE_FLOOR);
                magnitude * n.signum()
            }
            (None, Some(cp)) => cp,
            (None, None) => 0,
        }
    }

    /// The same score seen by the other side.
    ///
    /// `mate 0` stays `mate 0`: it describes the side that is mated, and there is no
    /// "mate in 0" for the winning side to report.
    #[must_use]
    pub fn negated(self) -> Self {
        Self {
            cp: self.cp.map(i32::wrapping_neg),
            mate: self.mate.map(i32::wrapping_neg),
        }
    }

    /// Converts between side-to-move and White perspective.
    ///
    /// The conversion is its own inverse: a White-perspective score becomes a
    /// side-to-move score and vice versa. It is the identity when White is to move.
    #[must_use]
    pub fn from_white_perspective(self, is_white_to_move: bool) -> Self {
        if is_white_to_move {
            self
        } else {
            self.negated()
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.mate, self.cp) {
            (Some(n), _) if n < 0 => write!(f, "-M{}", n.unsigned_abs()),
            (Some(n), _) => write!(f, "M{n}"),
            (None, Some(cp)) => {
                #[expect(clippy::cast_precision_loss)]
                let pawns = cp as f32 / 100.0;
                write!(f, "{pawns:+.2}")
            }
            (None, None) => f.write_str("0.00"),
        }
    }
}

/// One principal variation reported by the evaluation collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLine {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub depth: u32,
    /// Moves of the line in UCI or SAN, as the collaborator reports them.
    #[serde(default)]
    pub pv: Vec<String>,
}

impl EngineLine {
    #[must_use]
    pub fn first_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

/// Full reply of the evaluation collaborator for one position.
///
/// `alternatives` holds the additional MultiPV lines (second best onwards), already
/// sorted best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvaluation {
    #[serde(flatten)]
    pub best: EngineLine,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<EngineLine>,
}

impl EngineEvaluation {
    /// Highest MultiPV count the collaborator is asked for.
    pub const MAX_MULTI_PV: u32 = 10;

    #[must_use]
    pub fn evaluation(&self) -> Evaluation {
        self.best.evaluation
    }

    #[must_use]
    pub fn best_move(&self) -> Option<&str> {
        self.best.first_move()
    }

    /// Clamps a requested MultiPV count to the supported range.
    #[must_use]
    pub fn clamp_multi_pv(requested: u32) -> u32 {
        requested.clamp(1, Self::MAX_MULTI_PV)
    }

    /// Centipawn loss of each alternative relative to the best line.
    ///
    /// All lines share the same side to move, so the loss is a plain difference of
    /// normalized scores.
    #[must_use]
    pub fn alternative_losses(&self) -> Vec<i32> {
        let best = self.best.evaluation.normalized();
        self.alternatives
            .iter()
            .map(|line| best.saturating_sub(line.evaluation.normalized()).max(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod normalize {
        use super::*;

        #[test]
        fn test_centipawns_pass_through() {
            assert_eq!(Evaluation::cp(-37).normalized(), -37);
            assert_eq!(Evaluation::default().normalized(), 0);
        }

        #[test]
        fn test_mate_takes_precedence_over_cp() {
            let eval = Evaluation {
                cp: Some(10),
                mate: Some(2),
            };
            assert_eq!(eval.normalized(), MATE_SCORE - 2 * MATE_STEP);
        }

        #[test]
        fn test_closer_mates_are_more_extreme() {
            for n in 1..50 {
                assert!(Evaluation::mate(n).normalized() > Evaluation::mate(n + 1).normalized());
                assert!(Evaluation::mate(-n).normalized() < Evaluation::mate(-n - 1).normalized());
            }
        }

        #[test]
        fn test_long_mates_stay_above_floor() {
            assert_eq!(Evaluation::mate(10_000).normalized(), MATE_FLOOR);
            assert_eq!(Evaluation::mate(-10_000).normalized(), -MATE_FLOOR);
            assert!(Evaluation::mate(10_000).normalized() > Evaluation::cp(30_000).normalized());
        }

        #[test]
        fn test_mate_zero_means_side_to_move_is_mated() {
            assert_eq!(Evaluation::mate(0).normalized(), -MATE_SCORE);
            assert!(Evaluation::mate(0).normalized() < Evaluation::mate(-1).normalized());
        }
    }

    mod perspective {
        use super::*;

        #[test]
        fn test_negation_is_involution() {
            for eval in [Evaluation::cp(120), Evaluation::mate(-4), Evaluation::default()] {
                assert_eq!(eval.negated().negated(), eval);
            }
            assert_eq!(Evaluation::cp(120).negated().normalized(), -120);
        }

        #[test]
        fn test_white_perspective_conversion() {
            let eval = Evaluation::cp(50);
            assert_eq!(eval.from_white_perspective(true), eval);
            assert_eq!(eval.from_white_perspective(false), Evaluation::cp(-50));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::cp(135).to_string(), "+1.35");
        assert_eq!(Evaluation::cp(-40).to_string(), "-0.40");
        assert_eq!(Evaluation::mate(3).to_string(), "M3");
        assert_eq!(Evaluation::mate(-2).to_string(), "-M2");
    }

    #[test]
    fn test_engine_evaluation_json_shape() {
        let json = r#"{"cp":31,"depth":18,"pv":["e2e4","e7e5"],
            "alternatives":[{"cp":12,"depth":18,"pv":["d2d4"]},{"mate":-3,"depth":18}]}"#;
        let parsed: EngineEvaluation = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.evaluation(), Evaluation::cp(31));
        assert_eq!(parsed.best_move(), Some("e2e4"));
        assert_eq!(parsed.alternatives.len(), 2);
        let losses = parsed.alternative_losses();
        assert_eq!(losses[0], 19);
        assert!(losses[1] > 10_000);
    }

    #[test]
    fn test_multi_pv_is_clamped() {
        assert_eq!(EngineEvaluation::clamp_multi_pv(0), 1);
        assert_eq!(EngineEvaluation::clamp_multi_pv(4), 4);
        assert_eq!(EngineEvaluation::clamp_multi_pv(64), 10);
    }
}
