//! Exploration of critical positions.
//!
//! - [`tree`] - the [`VariationTree`], an arena of annotated variations that
//!   tool-calling agents navigate through [`NodeInfo`] and [`ToolResponse`] records
//! - [`heuristics`] - [`assess_continuation`], deciding whether a variation deserves
//!   more moves
//! - [`session`] - [`ExplorationSession`], which grows a tree automatically under the
//!   budgets of a [`StoppingConfig`]
//! - [`services`] - the asynchronous evaluation and human-move collaborators
//!
//! Everything except the session is synchronous. The session suspends only while
//! waiting on a service.

pub use self::{
    config::{StoppingConfig, StoppingPreset},
    heuristics::{
        ContinuationAssessment, ContinuationConfig, Suggestion, Tension, assess_continuation,
        should_hard_stop,
    },
    services::{EvaluationService, HumanMove, HumanMoveService, ServiceError},
    session::{ExplorationSession, ExplorationState, StopHandle, StopReason},
    tree::{MoveInfo, NodeId, NodeInfo, ToolResponse, TreeError, VariationNode, VariationTree},
};

pub mod config;
pub mod heuristics;
pub mod services;
pub mod session;
pub mod tree;
