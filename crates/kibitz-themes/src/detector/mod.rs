//! Theme detectors.
//!
//! Detectors are a closed set: [`Detector`] enumerates every one of them, and
//! [`Detector::detect`] dispatches to the implementing module. Each detector declares
//!
//! - the [`ThemeType`]s it can emit ([`Detector::emits`]),
//! - its [`ThemeCategory`],
//! - the lowest [`AnalysisTier`] it runs at ([`Detector::min_tier`]),
//! - a run priority ([`Detector::priority`], higher runs first).
//!
//! # Detectors
//!
//! **Tactical**
//! - [`Detector::LineTactics`] - pins, skewers, discovered attacks and checks, all from
//!   one shared ray scan per slider
//! - [`Detector::BackRank`] - a boxed-in king on its home rank with a heavy piece able
//!   to reach that rank
//! - [`Detector::Fork`] - one piece attacking two or more worthwhile targets
//! - [`Detector::DefenderTactics`] - hanging pieces and overloaded defenders
//!
//! **Structural**
//! - [`Detector::PawnStructure`] - isolated, doubled, backward and passed pawns,
//!   connected passers, pawn chains, wing majorities
//!
//! **Positional**
//! - [`Detector::Files`] - rooks and queens on open or semi-open files
//! - [`Detector::Outposts`] - minor pieces on pawn-supported squares no enemy pawn can
//!   challenge
//! - [`Detector::Space`] - control of the opponent's half of the board
//! - [`Detector::ColorComplex`] - weak squares of one color around a king whose side
//!   lacks the matching bishop

use kibitz_board::Color;
use serde::{Deserialize, Serialize};

use crate::{
    position::PositionAnalysis,
    theme::{AnalysisTier, ThemeCategory, ThemeInstance, ThemeType},
};

mod back_rank;
mod defender;
mod fork;
mod line;
mod pawn;
mod positional;

/// Everything a detector may look at.
#[derive(Debug, Clone, Copy)]
pub struct DetectorContext<'a> {
    pub analysis: &'a PositionAnalysis,
    pub ply: u32,
    pub tier: AnalysisTier,
    /// Themes active at the previous ply. Detectors look at the position only; the
    /// registry diffs its result against these.
    pub previous: &'a [ThemeInstance],
}

impl<'a> DetectorContext<'a> {
    #[must_use]
    pub fn new(
        analysis: &'a PositionAnalysis,
        ply: u32,
        tier: AnalysisTier,
        previous: &'a [ThemeInstance],
    ) -> Self {
        Self {
            analysis,
            ply,
            tier,
            previous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum DetectorError {
    #[display("{color} has no king")]
    MissingKing { color: Color },
    #[display("inconsistent position: {reason}")]
    InconsistentPosition { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    #[display("line_tactics")]
    LineTactics,
    #[display("back_rank")]
    BackRank,
    #[display("fork")]
    Fork,
    #[display("defender_tactics")]
    DefenderTactics,
    #[display("pawn_structure")]
    PawnStructure,
    #[display("files")]
    Files,
    #[display("outposts")]
    Outposts,
    #[display("space")]
    Space,
    #[display("color_complex")]
    ColorComplex,
}

impl Detector {
    pub const ALL: [Self; 9] = [
        Self::LineTactics,
        Self::BackRank,
        Self::Fork,
        Self::DefenderTactics,
        Self::PawnStructure,
        Self::Files,
        Self::Outposts,
        Self::Space,
        Self::ColorComplex,
    ];

    #[must_use]
    pub const fn emits(self) -> &'static [ThemeType] {
        match self {
            Self::LineTactics => &[
                ThemeType::Pin,
                ThemeType::Skewer,
                ThemeType::DiscoveredAttack,
                ThemeType::DiscoveredCheck,
            ],
            Self::BackRank => &[ThemeType::BackRankThreat],
            Self::Fork => &[ThemeType::Fork],
            Self::DefenderTactics => &[ThemeType::HangingPiece, ThemeType::OverloadedDefender],
            Self::PawnStructure => &[
                ThemeType::IsolatedPawn,
                ThemeType::DoubledPawns,
                ThemeType::BackwardPawn,
                ThemeType::PassedPawn,
                ThemeType::ConnectedPassers,
                ThemeType::PawnChain,
                ThemeType::PawnMajority,
            ],
            Self::Files => &[ThemeType::OpenFile, ThemeType::SemiOpenFile],
            Self::Outposts => &[ThemeType::Outpost],
            Self::Space => &[ThemeType::SpaceAdvantage],
            Self::ColorComplex => &[ThemeType::WeakColorComplex],
        }
    }

    #[must_use]
    pub const fn category(self) -> ThemeCategory {
        match self {
            Self::LineTactics | Self::BackRank | Self::Fork | Self::DefenderTactics => {
                ThemeCategory::Tactical
            }
            Self::PawnStructure => ThemeCategory::Structural,
            Self::Files | Self::Outposts | Self::Space | Self::ColorComplex => {
                ThemeCategory::Positional
            }
        }
    }

    #[must_use]
    pub const fn min_tier(self) -> AnalysisTier {
        match self {
            Self::LineTactics | Self::BackRank | Self::Fork | Self::DefenderTactics => {
                AnalysisTier::Quick
            }
            Self::PawnStructure | Self::Files | Self::Outposts => AnalysisTier::Standard,
            Self::Space | Self::ColorComplex => AnalysisTier::Deep,
        }
    }

    /// Run order; higher runs first. Has no effect on results.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::LineTactics => 100,
            Self::BackRank => 90,
            Self::Fork => 80,
            Self::DefenderTactics => 70,
            Self::PawnStructure => 50,
            Self::Files => 40,
            Self::Outposts => 35,
            Self::Space => 20,
            Self::ColorComplex => 10,
        }
    }

    pub fn detect(self, ctx: &DetectorContext<'_>) -> Result<Vec<ThemeInstance>, DetectorError> {
        match self {
            Self::LineTactics => Ok(line::detect(ctx)),
            Self::BackRank => back_rank::detect(ctx),
            Self::Fork => Ok(fork::detect(ctx)),
            Self::DefenderTactics => Ok(defender::detect(ctx)),
            Self::PawnStructure => pawn::detect(ctx),
            Self::Files => Ok(positional::detect_files(ctx)),
            Self::Outposts => Ok(positional::detect_outposts(ctx)),
            Self::Space => Ok(positional::detect_space(ctx)),
            Self::ColorComplex => positional::detect_color_complex(ctx),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_match_emitted_types() {
        for detector in Detector::ALL {
            for theme_type in detector.emits() {
                assert_eq!(theme_type.category(), detector.category(), "{detector}");
            }
        }
    }

    #[test]
    fn test_every_theme_type_has_a_detector() {
        for theme_type in ThemeType::ALL {
            assert!(
                Detector::ALL.iter().any(|d| d.emits().contains(&theme_type)),
                "{theme_type}"
            );
        }
    }

    #[test]
    fn test_priorities_are_distinct() {
        let mut priorities = Detector::ALL.map(Detector::priority);
        priorities.sort_unstable();
        assert!(priorities.windows(2).all(|w| w[0] < w[1]));
    }
}
