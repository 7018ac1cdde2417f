//! Whole-game analysis: classification, themes and critical moments.
//!
//! A caller supplies one [`PlyInput`] per ply: the move, the position before it, and
//! engine evaluations before and after. [`GameAnalyzer`] turns these into a
//! [`GameReport`]:
//!
//! - one [`MoveAnalysis`] per ply, carrying the classification and NAG,
//! - the theme transitions at every ply ([`PlyThemes`]),
//! - a bounded set of [`CriticalMoment`]s, ranked by [`InterestScore`],
//! - per-side accuracy and centipawn-loss statistics ([`GameSummary`]).
//!
//! # Example
//!
//! ```
//! use kibitz_analysis::{AnalysisConfig, GameAnalyzer, PlyInput};
//! use kibitz_board::ShakmatyBoard;
//! use kibitz_evaluator::{classification::Classification, evaluation::Evaluation};
//!
//! let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
//! let plies = [PlyInput::new(0, "e4", start, Evaluation::cp(30), Evaluation::cp(-25))];
//!
//! let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
//! let report = analyzer.analyze(&plies).unwrap();
//! assert_eq!(report.moves[0].classification(), Classification::Excellent);
//! assert_eq!(report.summary.white.moves, 1);
//! ```

pub use self::{
    config::{AnalysisConfig, ConfigError},
    critical::{CriticalMoment, CriticalMomentSelector, CriticalMomentType, InterestScore},
    game::{AnalysisError, GameAnalyzer, GameReport, GameSummary, PlyThemes, SideSummary},
    moves::{MoveAnalysis, PlyInput},
};

pub mod config;
pub mod critical;
pub mod game;
pub mod moves;
