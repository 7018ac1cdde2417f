//! Move classification: from an evaluation pair to a move-quality label.
//!
//! # Pipeline
//!
//! [`classify_move`] runs four steps:
//!
//! 1. **Book check** - book moves are labelled [`Classification::Book`] with zero loss and
//!    nothing else is computed.
//! 2. **Raw label** - the centipawn loss ([`calculate_cp_loss`]) is compared against
//!    rating-dependent [`ClassificationThresholds`].
//! 3. **Status downgrade** - both positions are placed in a [`PositionStatus`] band from
//!    the mover's perspective. When the move stays inside the same *decided* band
//!    (decisive or lost) the practical result did not change, and the label is softened
//!    by one step.
//! 4. **Special labels** - a move that survived as `excellent` or `good` may be
//!    re-labelled [`Classification::Brilliant`] or [`Classification::Forced`].
//!
//! # Rating Calibration
//!
//! Thresholds are interpolated linearly between calibration points and clamped outside
//! them:
//!
//! | Rating | Excellent | Inaccuracy | Mistake | Blunder |
//! |-------:|----------:|-----------:|--------:|--------:|
//! |    800 |        25 |        120 |     260 |     450 |
//! |   1200 |        20 |         80 |     170 |     300 |
//! |   1600 |        15 |         60 |     130 |     250 |
//! |   2000 |        12 |         45 |     100 |     200 |
//! |   2400 |        10 |         35 |      80 |     160 |
//! |   2800 |         8 |         25 |      60 |     120 |
//!
//! Each label applies from its threshold upwards (inclusive).
//!
//! # Status Bands
//!
//! Band boundaries are inclusive on the higher-magnitude side: exactly `+500` is
//! decisive, exactly `+30` is a slight edge, and exactly `-30` is a slight deficit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluation::Evaluation;

/// Loss at or below which a move can be brilliant.
pub const BRILLIANT_MAX_LOSS: i32 = 10;

/// Human-move probability below which a move counts as surprising.
pub const BRILLIANT_MAX_PROBABILITY: f32 = 0.10;

/// How much worse every alternative must be for the played move to count as forced.
pub const FORCED_MARGIN: i32 = 200;

/// Largest legal-move count that makes a move forced on its own.
pub const FORCED_MAX_LEGAL_MOVES: u32 = 2;

/// Move-quality label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Book,
    Brilliant,
    Forced,
    Excellent,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl Classification {
    pub const ALL: [Self; 8] = [
        Self::Book,
        Self::Brilliant,
        Self::Forced,
        Self::Excellent,
        Self::Good,
        Self::Inaccuracy,
        Self::Mistake,
        Self::Blunder,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Brilliant => "brilliant",
            Self::Forced => "forced",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Inaccuracy => "inaccuracy",
            Self::Mistake => "mistake",
            Self::Blunder => "blunder",
        }
    }

    /// Error severity: 0 for non-errors, 1 inaccuracy, 2 mistake, 3 blunder.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Book | Self::Brilliant | Self::Forced | Self::Excellent | Self::Good => 0,
            Self::Inaccuracy => 1,
            Self::Mistake => 2,
            Self::Blunder => 3,
        }
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        self.severity() > 0
    }

    /// One step softer: blunder to mistake, mistake to inaccuracy, inaccuracy to good.
    #[must_use]
    pub const fn downgraded(self) -> Self {
        match self {
            Self::Blunder => Self::Mistake,
            Self::Mistake => Self::Inaccuracy,
            Self::Inaccuracy => Self::Good,
            other => other,
        }
    }

    /// PGN Numeric Annotation Glyph for this label, if it has one.
    ///
    /// `$2` mistake (?), `$3` brilliant (!!), `$4` blunder (??), `$6` inaccuracy (?!).
    #[must_use]
    pub const fn nag(self) -> Option<u8> {
        match self {
            Self::Mistake => Some(2),
            Self::Brilliant => Some(3),
            Self::Blunder => Some(4),
            Self::Inaccuracy => Some(6),
            Self::Book | Self::Forced | Self::Excellent | Self::Good => None,
        }
    }

    /// Move-text suffix matching [`Self::nag`].
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Mistake => "?",
            Self::Brilliant => "!!",
            Self::Blunder => "??",
            Self::Inaccuracy => "?!",
            Self::Book | Self::Forced | Self::Excellent | Self::Good => "",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation band of a position, from one side's perspective.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Lost,
    Losing,
    Disadvantage,
    SlightDeficit,
    Equal,
    SlightEdge,
    Advantage,
    Winning,
    Decisive,
}

impl PositionStatus {
    /// Band of a normalized score.
    #[must_use]
    pub const fn from_cp(cp: i32) -> Self {
        match cp {
            500.. => Self::Decisive,
            200..=499 => Self::Winning,
            100..=199 => Self::Advantage,
            30..=99 => Self::SlightEdge,
            -29..=29 => Self::Equal,
            -99..=-30 => Self::SlightDeficit,
            -199..=-100 => Self::Disadvantage,
            -499..=-200 => Self::Losing,
            _ => Self::Lost,
        }
    }

    #[must_use]
    pub fn from_evaluation(evaluation: Evaluation) -> Self {
        Self::from_cp(evaluation.normalized())
    }

    /// Decisive or lost: the practical outcome is settled.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        matches!(self, Self::Decisive | Self::Lost)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Losing => "losing",
            Self::Disadvantage => "disadvantage",
            Self::SlightDeficit => "slight_deficit",
            Self::Equal => "equal",
            Self::SlightEdge => "slight_edge",
            Self::Advantage => "advantage",
            Self::Winning => "winning",
            Self::Decisive => "decisive",
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Centipawn-loss thresholds for one target rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub excellent: f32,
    pub inaccuracy: f32,
    pub mistake: f32,
    pub blunder: f32,
}

impl ClassificationThresholds {
    const CALIBRATION: [(u32, Self); 6] = [
        (800, Self::new(25.0, 120.0, 260.0, 450.0)),
        (1200, Self::new(20.0, 80.0, 170.0, 300.0)),
        (1600, Self::new(15.0, 60.0, 130.0, 250.0)),
        (2000, Self::new(12.0, 45.0, 100.0, 200.0)),
        (2400, Self::new(10.0, 35.0, 80.0, 160.0)),
        (2800, Self::new(8.0, 25.0, 60.0, 120.0)),
    ];

    const fn new(excellent: f32, inaccuracy: f32, mistake: f32, blunder: f32) -> Self {
        Self {
            excellent,
            inaccuracy,
            mistake,
            blunder,
        }
    }

    /// Thresholds interpolated for `rating`.
    #[must_use]
    pub fn for_rating(rating: u32) -> Self {
        let points = &Self::CALIBRATION;
        let (first_rating, first) = points[0];
        let (last_rating, last) = points[points.len() - 1];
        if rating <= first_rating {
            return first;
        }
        if rating >= last_rating {
            return last;
        }
        let (lo_rating, lo, hi_rating, hi) = points
            .windows(2)
            .find_map(|w| {
                let ((lo_rating, lo), (hi_rating, hi)) = (w[0], w[1]);
                (rating <= hi_rating).then_some((lo_rating, lo, hi_rating, hi))
            })
            .unwrap_or((last_rating, last, last_rating, last));
        if hi_rating == lo_rating {
            return hi;
        }
        #[expect(clippy::cast_precision_loss)]
        let t = (rating - lo_rating) as f32 / (hi_rating - lo_rating) as f32;
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        Self {
            excellent: lerp(lo.excellent, hi.excellent),
            inaccuracy: lerp(lo.inaccuracy, hi.inaccuracy),
            mistake: lerp(lo.mistake, hi.mistake),
            blunder: lerp(lo.blunder, hi.blunder),
        }
    }

    /// Raw label for a centipawn loss, before any status adjustment.
    #[must_use]
    pub fn classify(&self, cp_loss: i32) -> Classification {
        #[expect(clippy::cast_precision_loss)]
        let loss = cp_loss as f32;
        if loss >= self.blunder {
            Classification::Blunder
        } else if loss >= self.mistake {
            Classification::Mistake
        } else if loss >= self.inaccuracy {
            Classification::Inaccuracy
        } else if loss <= self.excellent {
            Classification::Excellent
        } else {
            Classification::Good
        }
    }
}

/// Optional context for [`classify_move`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    pub is_book_move: bool,
    /// Target audience rating used to pick thresholds.
    pub rating: u32,
    pub legal_move_count: Option<u32>,
    /// Centipawn losses of the other candidate moves, if the engine reported them.
    pub alternatives: Option<Vec<i32>>,
    /// Probability that a human of `rating` plays this move.
    pub human_probability: Option<f32>,
    pub is_sacrifice: Option<bool>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            is_book_move: false,
            rating: 1500,
            legal_move_count: None,
            alternatives: None,
            human_probability: None,
            is_sacrifice: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: Classification,
    pub raw_classification: Classification,
    pub was_adjusted: bool,
    pub cp_loss: i32,
    pub status_before: PositionStatus,
    pub status_after: PositionStatus,
    pub is_white_move: bool,
}

/// Ground given up by the mover.
///
/// `before` is the mover's score before the move, `after` the opponent's score after
/// it. Both are side-to-move scores, so no color branch is needed.
#[must_use]
pub fn calculate_cp_loss(before: Evaluation, after: Evaluation) -> i32 {
    before
        .normalized()
        .saturating_add(after.normalized())
        .max(0)
}

/// Classifies one move.
///
/// See the [module documentation](self) for the steps involved.
#[must_use]
pub fn classify_move(
    before: Evaluation,
    after: Evaluation,
    is_white_move: bool,
    options: &ClassifyOptions,
) -> ClassificationResult {
    let status_before = PositionStatus::from_evaluation(before);
    // Negate the normalized score rather than the evaluation: `mate 0` has no
    // positive counterpart.
    let status_after = PositionStatus::from_cp(after.normalized().saturating_neg());

    if options.is_book_move {
        return ClassificationResult {
            classification: Classification::Book,
            raw_classification: Classification::Book,
            was_adjusted: false,
            cp_loss: 0,
            status_before,
            status_after,
            is_white_move,
        };
    }

    let cp_loss = calculate_cp_loss(before, after);
    let raw = ClassificationThresholds::for_rating(options.rating).classify(cp_loss);

    let downgraded = if status_before == status_after && status_before.is_decided() {
        raw.downgraded()
    } else {
        raw
    };
    let mut classification = downgraded;

    if !classification.is_error() {
        if is_brilliant_move(cp_loss, options.human_probability, options.is_sacrifice) {
            classification = Classification::Brilliant;
        } else if options.legal_move_count.is_some_and(|count| {
            is_forced_move(cp_loss, count, options.alternatives.as_deref())
        }) {
            classification = Classification::Forced;
        }
    }

    ClassificationResult {
        classification,
        raw_classification: raw,
        was_adjusted: downgraded != raw,
        cp_loss,
        status_before,
        status_after,
        is_white_move,
    }
}

/// Whether the played move was (practically) the only move.
///
/// With at most [`FORCED_MAX_LEGAL_MOVES`] legal moves the answer is always yes.
/// Otherwise every alternative must lose at least [`FORCED_MARGIN`] more than the
/// played move; an empty or missing alternative list proves nothing.
#[must_use]
pub fn is_forced_move(cp_loss: i32, legal_move_count: u32, alternatives: Option<&[i32]>) -> bool {
    if legal_move_count <= FORCED_MAX_LEGAL_MOVES {
        return true;
    }
    alternatives.is_some_and(|alternatives| {
        !alternatives.is_empty()
            && alternatives
                .iter()
                .all(|&loss| loss >= cp_loss.saturating_add(FORCED_MARGIN))
    })
}

/// Whether a move is a surprising top move.
///
/// Requires a near-zero loss and a known, low human probability. A move known not to
/// sacrifice material is never brilliant; an unknown sacrifice status does not veto.
#[must_use]
pub fn is_brilliant_move(
    cp_loss: i32,
    human_probability: Option<f32>,
    is_sacrifice: Option<bool>,
) -> bool {
    cp_loss <= BRILLIANT_MAX_LOSS
        && human_probability.is_some_and(|p| p < BRILLIANT_MAX_PROBABILITY)
        && is_sacrifice != Some(false)
}
