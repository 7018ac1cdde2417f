//! Theme data model.

use std::{collections::HashMap, fmt, str::FromStr};

use kibitz_board::{Color, PlacedPiece, Square};
use serde::{Deserialize, Serialize};

/// Every motif the detectors can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeType {
    // tactical
    Pin,
    Skewer,
    DiscoveredAttack,
    DiscoveredCheck,
    BackRankThreat,
    Fork,
    HangingPiece,
    OverloadedDefender,
    // structural
    IsolatedPawn,
    DoubledPawns,
    BackwardPawn,
    PassedPawn,
    ConnectedPassers,
    PawnChain,
    PawnMajority,
    // positional
    OpenFile,
    SemiOpenFile,
    SpaceAdvantage,
    Outpost,
    WeakColorComplex,
}

impl ThemeType {
    pub const ALL: [Self; 20] = [
        Self::Pin,
        Self::Skewer,
        Self::DiscoveredAttack,
        Self::DiscoveredCheck,
        Self::BackRankThreat,
        Self::Fork,
        Self::HangingPiece,
        Self::OverloadedDefender,
        Self::IsolatedPawn,
        Self::DoubledPawns,
        Self::BackwardPawn,
        Self::PassedPawn,
        Self::ConnectedPassers,
        Self::PawnChain,
        Self::PawnMajority,
        Self::OpenFile,
        Self::SemiOpenFile,
        Self::SpaceAdvantage,
        Self::Outpost,
        Self::WeakColorComplex,
    ];

    #[must_use]
    pub const fn category(self) -> ThemeCategory {
        match self {
            Self::Pin
            | Self::Skewer
            | Self::DiscoveredAttack
            | Self::DiscoveredCheck
            | Self::BackRankThreat
            | Self::Fork
            | Self::HangingPiece
            | Self::OverloadedDefender => ThemeCategory::Tactical,
            Self::IsolatedPawn
            | Self::DoubledPawns
            | Self::BackwardPawn
            | Self::PassedPawn
            | Self::ConnectedPassers
            | Self::PawnChain
            | Self::PawnMajority => ThemeCategory::Structural,
            Self::OpenFile
            | Self::SemiOpenFile
            | Self::SpaceAdvantage
            | Self::Outpost
            | Self::WeakColorComplex => ThemeCategory::Positional,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Skewer => "skewer",
            Self::DiscoveredAttack => "discovered_attack",
            Self::DiscoveredCheck => "discovered_check",
            Self::BackRankThreat => "back_rank_threat",
            Self::Fork => "fork",
            Self::HangingPiece => "hanging_piece",
            Self::OverloadedDefender => "overloaded_defender",
            Self::IsolatedPawn => "isolated_pawn",
            Self::DoubledPawns => "doubled_pawns",
            Self::BackwardPawn => "backward_pawn",
            Self::PassedPawn => "passed_pawn",
            Self::ConnectedPassers => "connected_passers",
            Self::PawnChain => "pawn_chain",
            Self::PawnMajority => "pawn_majority",
            Self::OpenFile => "open_file",
            Self::SemiOpenFile => "semi_open_file",
            Self::SpaceAdvantage => "space_advantage",
            Self::Outpost => "outpost",
            Self::WeakColorComplex => "weak_color_complex",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ThemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ThemeCategory {
    #[display("tactical")]
    Tactical,
    #[display("structural")]
    Structural,
    #[display("positional")]
    Positional,
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    #[display("minor")]
    Minor,
    #[display("moderate")]
    Moderate,
    #[display("significant")]
    Significant,
    #[display("critical")]
    Critical,
}

impl Severity {
    /// Severity of a threat against a piece worth `value` pawns.
    #[must_use]
    pub const fn for_material(value: i32) -> Self {
        match value {
            100.. => Self::Critical,
            9..=99 => Self::Significant,
            5..=8 => Self::Moderate,
            _ => Self::Minor,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    /// `< 0.5` low, `< 0.8` medium, otherwise high.
    #[must_use]
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence < 0.5 {
            Self::Low
        } else if confidence < 0.8 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// How much work detection may spend on one position.
///
/// Each detector declares the lowest tier it runs at.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::FromStr,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTier {
    /// Tactics only.
    #[display("quick")]
    Quick,
    /// Tactics plus pawn structure and piece placement.
    #[default]
    #[display("standard")]
    Standard,
    /// Everything, including whole-board evaluations.
    #[display("deep")]
    Deep,
}

/// Lifecycle state of a theme relative to the previous ply.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum ThemeStatus {
    #[default]
    #[display("emerged")]
    Emerged,
    #[display("persisting")]
    Persisting,
    #[display("escalated")]
    Escalated,
    #[display("resolved")]
    Resolved,
    #[display("transformed")]
    Transformed,
}

/// Cross-ply identity of a theme: `type:square:beneficiary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeKey {
    pub theme_type: ThemeType,
    pub square: Square,
    pub beneficiary: Color,
}

impl ThemeKey {
    #[must_use]
    pub const fn new(theme_type: ThemeType, square: Square, beneficiary: Color) -> Self {
        Self {
            theme_type,
            square,
            beneficiary,
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.theme_type, self.square, self.beneficiary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid theme key '{key}'")]
pub struct ParseThemeKeyError {
    pub key: String,
}

impl FromStr for ThemeKey {
    type Err = ParseThemeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseThemeKeyError { key: s.to_owned() };
        let mut parts = s.split(':');
        let (Some(theme_type), Some(square), Some(beneficiary), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        Ok(Self {
            theme_type: ThemeType::from_name(theme_type).ok_or_else(err)?,
            square: square.parse().map_err(|_| err())?,
            beneficiary: Color::from_name(beneficiary).ok_or_else(err)?,
        })
    }
}

impl Serialize for ThemeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ThemeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One detected motif in one position.
///
/// Detectors fill in the geometric fields; `first_seen_ply`, `last_seen_ply`, `status`
/// and `novelty_score` are owned by the
/// [`ThemeLifecycleTracker`](crate::ThemeLifecycleTracker), which overwrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeInstance {
    pub key: ThemeKey,
    pub theme_type: ThemeType,
    pub category: ThemeCategory,
    pub beneficiary: Color,
    pub primary_square: Square,
    pub secondary_squares: Vec<Square>,
    pub pieces: Vec<PlacedPiece>,
    pub severity: Severity,
    pub confidence: f32,
    pub confidence_band: ConfidenceBand,
    /// Pawn units that change hands if the motif is executed.
    pub material_at_stake: i32,
    /// Absolute pin, skewer of or through the king, or discovered check.
    pub is_absolute: bool,
    pub first_seen_ply: u32,
    pub last_seen_ply: u32,
    pub status: ThemeStatus,
    pub novelty_score: f32,
}

impl ThemeInstance {
    /// A fresh `emerged` instance with minor severity and medium confidence.
    #[must_use]
    pub fn new(theme_type: ThemeType, primary_square: Square, beneficiary: Color, ply: u32) -> Self {
        let confidence = 0.6;
        Self {
            key: ThemeKey::new(theme_type, primary_square, beneficiary),
            theme_type,
            category: theme_type.category(),
            beneficiary,
            primary_square,
            secondary_squares: vec![],
            pieces: vec![],
            severity: Severity::Minor,
            confidence,
            confidence_band: ConfidenceBand::from_confidence(confidence),
            material_at_stake: 0,
            is_absolute: false,
            first_seen_ply: ply,
            last_seen_ply: ply,
            status: ThemeStatus::Emerged,
            novelty_score: 1.0,
        }
    }

    #[must_use]
    pub fn with_secondary<I>(mut self, squares: I) -> Self
    where
        I: IntoIterator<Item = Square>,
    {
        self.secondary_squares.extend(squares);
        self
    }

    #[must_use]
    pub fn with_pieces<I>(mut self, pieces: I) -> Self
    where
        I: IntoIterator<Item = PlacedPiece>,
    {
        self.pieces.extend(pieces);
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the confidence (clamped to `0..=1`) and its band.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self.confidence_band = ConfidenceBand::from_confidence(self.confidence);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material_at_stake: i32) -> Self {
        self.material_at_stake = material_at_stake;
        self
    }

    #[must_use]
    pub fn absolute(mut self, is_absolute: bool) -> Self {
        self.is_absolute = is_absolute;
        self
    }

    /// Ranking used when two instances share a key: higher severity, then confidence.
    pub(crate) fn outranks(&self, other: &Self) -> bool {
        (self.severity, self.confidence) > (other.severity, other.confidence)
    }
}

/// A theme's transition between two consecutive plies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDelta {
    pub theme: ThemeInstance,
    pub transition: ThemeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<ThemeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_severity: Option<Severity>,
}

impl ThemeDelta {
    /// Whether this delta signals new tactical or strategic activity.
    #[must_use]
    pub fn is_activity(&self) -> bool {
        matches!(
            self.transition,
            ThemeStatus::Emerged | ThemeStatus::Escalated
        )
    }
}

/// Keeps one instance per key, preferring the one that [outranks](ThemeInstance::outranks)
/// the others. First-seen order is preserved.
#[must_use]
pub fn dedup_by_key(themes: Vec<ThemeInstance>) -> Vec<ThemeInstance> {
    let mut index = HashMap::<ThemeKey, usize>::new();
    let mut unique = Vec::<ThemeInstance>::with_capacity(themes.len());
    for theme in themes {
        if let Some(&i) = index.get(&theme.key) {
            if theme.outranks(&unique[i]) {
                unique[i] = theme;
            }
        } else {
            index.insert(theme.key, unique.len());
            unique.push(theme);
        }
    }
    unique
}
