//! Per-ply input and the classified result built from it.

use kibitz_board::Color;
use kibitz_evaluator::{
    classification::{Classification, ClassificationResult, PositionStatus},
    evaluation::Evaluation,
};
use serde::{Deserialize, Serialize};

/// One ply as supplied by the caller.
///
/// Both evaluations are side-to-move scores: `eval_before` from the mover's view,
/// `eval_after` from the opponent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyInput {
    pub ply: u32,
    pub san: String,
    pub fen_before: String,
    pub eval_before: Evaluation,
    pub eval_after: Evaluation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_move_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_probability: Option<f32>,
    #[serde(default)]
    pub is_book_move: bool,
    /// Centipawn losses of the engine's other candidate moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sacrifice: Option<bool>,
}

impl PlyInput {
    #[must_use]
    pub fn new(
        ply: u32,
        san: impl Into<String>,
        fen_before: impl Into<String>,
        eval_before: Evaluation,
        eval_after: Evaluation,
    ) -> Self {
        Self {
            ply,
            san: san.into(),
            fen_before: fen_before.into(),
            eval_before,
            eval_after,
            best_move: None,
            legal_move_count: None,
            human_probability: None,
            is_book_move: false,
            alternatives: None,
            is_sacrifice: None,
        }
    }
}

/// A classified ply.
///
/// The evaluation and classification data is fixed at construction and only exposed
/// through getters. Commentary may later attach a comment and explored variations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAnalysis {
    ply: u32,
    san: String,
    fen_before: String,
    fen_after: String,
    mover: Color,
    eval_before: Evaluation,
    eval_after: Evaluation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    best_move: Option<String>,
    #[serde(flatten)]
    result: ClassificationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nag: Option<u8>,
    is_critical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Variations explored from this ply, each a list of SAN moves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explored_variations: Vec<Vec<String>>,
}

impl MoveAnalysis {
    #[must_use]
    pub fn new(
        input: &PlyInput,
        canonical_san: String,
        fen_after: String,
        mover: Color,
        result: ClassificationResult,
    ) -> Self {
        Self {
            ply: input.ply,
            san: canonical_san,
            fen_before: input.fen_before.clone(),
            fen_after,
            mover,
            eval_before: input.eval_before,
            eval_after: input.eval_after,
            best_move: input.best_move.clone(),
            nag: result.classification.nag(),
            result,
            is_critical: false,
            comment: None,
            explored_variations: vec![],
        }
    }

    #[must_use]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[must_use]
    pub fn san(&self) -> &str {
        &self.san
    }

    #[must_use]
    pub fn fen_before(&self) -> &str {
        &self.fen_before
    }

    #[must_use]
    pub fn fen_after(&self) -> &str {
        &self.fen_after
    }

    #[must_use]
    pub fn mover(&self) -> Color {
        self.mover
    }

    #[must_use]
    pub fn eval_before(&self) -> Evaluation {
        self.eval_before
    }

    #[must_use]
    pub fn eval_after(&self) -> Evaluation {
        self.eval_after
    }

    #[must_use]
    pub fn best_move(&self) -> Option<&str> {
        self.best_move.as_deref()
    }

    #[must_use]
    pub fn cp_loss(&self) -> i32 {
        self.result.cp_loss
    }

    #[must_use]
    pub fn classification(&self) -> Classification {
        self.result.classification
    }

    #[must_use]
    pub fn raw_classification(&self) -> Classification {
        self.result.raw_classification
    }

    #[must_use]
    pub fn was_adjusted(&self) -> bool {
        self.result.was_adjusted
    }

    #[must_use]
    pub fn status_before(&self) -> PositionStatus {
        self.result.status_before
    }

    #[must_use]
    pub fn status_after(&self) -> PositionStatus {
        self.result.status_after
    }

    #[must_use]
    pub fn nag(&self) -> Option<u8> {
        self.nag
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    pub(crate) fn set_critical(&mut self, is_critical: bool) {
        self.is_critical = is_critical;
    }

    /// Signed change of the mover's evaluation caused by the move.
    ///
    /// Negative when the mover lost ground. Unlike [`cp_loss`](Self::cp_loss) it is
    /// not clamped, so improvements show up as positive swings.
    #[must_use]
    pub fn eval_swing(&self) -> i32 {
        self.eval_after
            .normalized()
            .saturating_add(self.eval_before.normalized())
            .saturating_neg()
    }
}
