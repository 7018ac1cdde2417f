//! Budgets for exploration sessions.

use serde::{Deserialize, Serialize};

/// Named budget levels.
///
/// ```
/// use kibitz_explorer::config::{StoppingConfig, StoppingPreset};
///
/// let preset: StoppingPreset = "deep".parse().unwrap();
/// assert_eq!(StoppingConfig::from(preset), StoppingConfig::deep());
/// ```
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum StoppingPreset {
    Quick,
    #[default]
    Standard,
    Deep,
    Exhaustive,
}

/// When an exploration session gives up.
///
/// All limits are checked once per loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoppingConfig {
    /// Nodes added to the tree before stopping.
    pub max_nodes: usize,
    /// Plies below the starting node.
    pub max_depth: u32,
    /// Wall-clock budget in milliseconds.
    pub budget_ms: u64,
    /// Queue entries below this priority are not worth exploring.
    pub min_priority: f32,
    /// Number of consecutive evaluations that must agree before the position counts
    /// as resolved.
    pub eval_stability_threshold: usize,
    /// Largest spread, in centipawns, of evaluations that still agree.
    pub eval_stability_cp_range: i32,
}

impl Default for StoppingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<StoppingPreset> for StoppingConfig {
    fn from(preset: StoppingPreset) -> Self {
        match preset {
            StoppingPreset::Quick => Self::quick(),
            StoppingPreset::Standard => Self::standard(),
            StoppingPreset::Deep => Self::deep(),
            StoppingPreset::Exhaustive => Self::exhaustive(),
        }
    }
}

impl StoppingConfig {
    #[must_use]
    pub const fn quick() -> Self {
        Self {
            max_nodes: 8,
            max_depth: 6,
            budget_ms: 5_000,
            min_priority: 0.6,
            eval_stability_threshold: 2,
            eval_stability_cp_range: 15,
        }
    }

    #[must_use]
    pub const fn standard() -> Self {
        Self {
            max_nodes: 20,
            max_depth: 10,
            budget_ms: 15_000,
            min_priority: 0.4,
            eval_stability_threshold: 3,
            eval_stability_cp_range: 20,
        }
    }

    #[must_use]
    pub const fn deep() -> Self {
        Self {
            max_nodes: 50,
            max_depth: 16,
            budget_ms: 45_000,
            min_priority: 0.25,
            eval_stability_threshold: 4,
            eval_stability_cp_range: 25,
        }
    }

    #[must_use]
    pub const fn exhaustive() -> Self {
        Self {
            max_nodes: 150,
            max_depth: 24,
            budget_ms: 120_000,
            min_priority: 0.1,
            eval_stability_threshold: 6,
            eval_stability_cp_range: 30,
        }
    }
}
