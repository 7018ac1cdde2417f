//! Chess motif ("theme") detection and cross-ply tracking.
//!
//! # Overview
//!
//! Themes are tactical, structural and positional patterns found in a single position:
//! a pin, an isolated pawn, a rook on an open file. This crate finds them and follows
//! them through a game.
//!
//! The work is split into three layers:
//!
//! 1. **Detection** ([`detector`], [`registry`]) - a fixed set of detectors scans one
//!    [`PositionAnalysis`] and emits [`ThemeInstance`]s. The [`ThemeRegistry`] runs them
//!    in priority order, isolates failures as [`DetectorNote`]s and deduplicates by
//!    [`ThemeKey`].
//! 2. **Lifecycle** ([`lifecycle`]) - the [`ThemeLifecycleTracker`] compares each ply's
//!    themes to the previous ply's and labels every theme as emerged, persisting,
//!    escalated, transformed or resolved, with a decaying novelty score.
//! 3. **Redundancy** ([`idea`]) - the [`IdeaKeySet`] remembers which ideas have already
//!    been surfaced so they are not explained twice.
//!
//! # Theme Identity
//!
//! A theme is identified across plies by its [`ThemeKey`], rendered as
//! `type:square:beneficiary` (for example `pin:f6:white`). The square is the theme's
//! primary square: the pinned piece, the forking piece, the weak pawn, and so on.
//!
//! # Example
//!
//! ```
//! use kibitz_board::{BoardService, ShakmatyBoard};
//! use kibitz_themes::{
//!     AnalysisTier, DetectorContext, PositionAnalysis, ThemeLifecycleTracker, ThemeRegistry,
//!     ThemeStatus, ThemeType,
//! };
//!
//! let snapshot = ShakmatyBoard
//!     .snapshot("8/8/8/4k3/4r3/8/4R3/6K1 w - - 0 1")
//!     .unwrap();
//! let analysis = PositionAnalysis::new(snapshot);
//! let registry = ThemeRegistry::default();
//! let output = registry.detect(&DetectorContext::new(&analysis, 10, AnalysisTier::Standard, &[]));
//!
//! let mut tracker = ThemeLifecycleTracker::default();
//! let deltas = tracker.update(10, output.themes);
//! let skewer = deltas
//!     .iter()
//!     .find(|d| d.theme.theme_type == ThemeType::Skewer)
//!     .unwrap();
//! assert!(skewer.theme.is_absolute);
//! assert_eq!(skewer.transition, ThemeStatus::Emerged);
//! ```

pub use self::{
    detector::{Detector, DetectorContext, DetectorError},
    idea::{IdeaKey, IdeaKeySet},
    lifecycle::ThemeLifecycleTracker,
    position::PositionAnalysis,
    registry::{DetectionOutput, DetectorNote, ThemeRegistry},
    theme::*,
};

pub mod detector;
pub mod idea;
pub mod lifecycle;
pub mod position;
pub mod registry;
pub mod theme;
