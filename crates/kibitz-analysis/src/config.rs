use kibitz_themes::{AnalysisTier, lifecycle::DEFAULT_DECAY_RATE};
use serde::{Deserialize, Serialize};

/// Settings for one game analysis.
///
/// Missing fields take their default when deserialized:
///
/// ```
/// use kibitz_analysis::config::AnalysisConfig;
///
/// let config: AnalysisConfig = serde_json::from_str(r#"{"target_rating": 1800}"#).unwrap();
/// assert_eq!(config.target_rating, 1800);
/// assert_eq!(config, AnalysisConfig { target_rating: 1800, ..AnalysisConfig::default() });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rating of the intended audience; drives classification thresholds.
    pub target_rating: u32,
    /// Upper bound on critical moments as a fraction of all moves.
    pub max_critical_ratio: f32,
    /// Moves scoring below this are never critical.
    pub min_interest_score: u8,
    /// Novelty lost per ply by a persisting theme.
    pub decay_rate: f32,
    pub tier: AnalysisTier,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_rating: 1500,
            max_critical_ratio: 0.15,
            min_interest_score: 25,
            decay_rate: DEFAULT_DECAY_RATE,
            tier: AnalysisTier::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("max_critical_ratio must be within 0..=1, got {value}")]
    CriticalRatio { value: f32 },
    #[display("decay_rate must be finite and non-negative, got {value}")]
    DecayRate { value: f32 },
    #[display("min_interest_score must be at most 100, got {value}")]
    InterestScore { value: u8 },
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.max_critical_ratio) {
            return Err(ConfigError::CriticalRatio {
                value: self.max_critical_ratio,
            });
        }
        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(ConfigError::DecayRate {
                value: self.decay_rate,
            });
        }
        if self.min_interest_score > 100 {
            return Err(ConfigError::InterestScore {
                value: self.min_interest_score,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(AnalysisConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let config = AnalysisConfig {
            max_critical_ratio: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::CriticalRatio { .. })));

        let config = AnalysisConfig {
            decay_rate: f32::NAN,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::DecayRate { .. })));
    }

    #[test]
    fn test_tier_parses_from_snake_case() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"tier": "deep"}"#).unwrap();
        assert_eq!(config.tier, AnalysisTier::Deep);
        assert_eq!(config.min_interest_score, 25);
    }
}
