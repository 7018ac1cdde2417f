//! Asynchronous collaborators consulted while exploring.

use async_trait::async_trait;
use kibitz_evaluator::evaluation::EngineEvaluation;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum ServiceError {
    #[display("{service} is unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },
    #[display("{service} timed out after {after_ms}ms")]
    Timeout { service: &'static str, after_ms: u64 },
    #[display("{service} returned an unusable response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
}

/// Engine analysis of positions.
#[async_trait]
pub trait EvaluationService: Send + Sync {
    /// Evaluates `fen` from the side to move's perspective, returning up to
    /// `multi_pv` lines.
    async fn evaluate(&self, fen: &str, multi_pv: u32) -> Result<EngineEvaluation, ServiceError>;
}

/// A move a human of some rating is likely to play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanMove {
    pub san: String,
    pub probability: f32,
}

/// Prediction of the moves humans play.
#[async_trait]
pub trait HumanMoveService: Send + Sync {
    /// Likely moves in `fen` for a player of `rating`, most likely first.
    async fn predict(&self, fen: &str, rating: u32) -> Result<Vec<HumanMove>, ServiceError>;
}
