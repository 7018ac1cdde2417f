//! The per-game analysis pass.
//!
//! [`GameAnalyzer::analyze`] walks the plies of one game strictly in order:
//!
//! 1. play the move through the [`BoardService`] to get the canonical SAN and the
//!    resulting position,
//! 2. classify it,
//! 3. detect themes in the resulting position and feed them to the lifecycle tracker,
//!
//! and then selects and marks the critical moments and summarizes both sides.
//!
//! An analyzer owns its tracker, so one analyzer serves one game at a time. Run
//! separate analyzers to analyze games in parallel.

use std::collections::BTreeMap;

use kibitz_board::{BoardError, BoardService, Color};
use kibitz_evaluator::{
    accuracy::calculate_accuracy,
    classification::{Classification, ClassifyOptions, classify_move},
};
use kibitz_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
use kibitz_themes::{
    DetectorContext, DetectorNote, PositionAnalysis, ThemeDelta, ThemeLifecycleTracker,
    ThemeRegistry,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AnalysisConfig, ConfigError},
    critical::{CriticalMoment, CriticalMomentSelector, mark_critical},
    moves::{MoveAnalysis, PlyInput},
};

/// Percentile points reported for centipawn losses.
const LOSS_PERCENTILES: [f32; 2] = [50.0, 90.0];

#[derive(
    Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum AnalysisError {
    #[display("invalid configuration: {source}")]
    Config { source: ConfigError },
    #[display("ply {ply}: {source}")]
    Board { ply: u32, source: BoardError },
    #[display("ply {ply} follows ply {previous}; plies must be strictly increasing")]
    PlyOutOfOrder { ply: u32, previous: u32 },
}

/// Theme transitions and detector failures at one ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyThemes {
    pub ply: u32,
    pub deltas: Vec<ThemeDelta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<DetectorNote>,
}

impl PlyThemes {
    /// Number of emerged or escalated themes.
    #[must_use]
    pub fn activity(&self) -> usize {
        self.deltas.iter().filter(|d| d.is_activity()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub moves: usize,
    pub accuracy: f32,
    pub classifications: BTreeMap<Classification, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp_loss: Option<DescriptiveStats>,
    /// Median and 90th percentile; empty when the side made no moves.
    pub cp_loss_percentiles: Percentiles,
}

impl SideSummary {
    #[must_use]
    pub fn from_moves(moves: &[MoveAnalysis], side: Color) -> Self {
        let own = moves.iter().filter(|m| m.mover() == side).collect::<Vec<_>>();
        let losses = own.iter().map(|m| m.cp_loss()).collect::<Vec<_>>();
        let mut classifications = BTreeMap::new();
        for m in &own {
            *classifications.entry(m.classification()).or_insert(0) += 1;
        }
        #[expect(clippy::cast_precision_loss)]
        let loss_values = losses.iter().map(|&l| l as f32).collect::<Vec<_>>();
        Self {
            moves: own.len(),
            accuracy: calculate_accuracy(&losses),
            classifications,
            cp_loss: DescriptiveStats::from_centipawns(&losses),
            cp_loss_percentiles: if loss_values.is_empty() {
                Percentiles::default()
            } else {
                Percentiles::new(&loss_values, &LOSS_PERCENTILES)
            },
        }
    }

    #[must_use]
    pub fn count(&self, classification: Classification) -> usize {
        self.classifications.get(&classification).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub total_moves: usize,
    pub white: SideSummary,
    pub black: SideSummary,
}

impl GameSummary {
    #[must_use]
    pub fn from_moves(moves: &[MoveAnalysis]) -> Self {
        Self {
            total_moves: moves.len(),
            white: SideSummary::from_moves(moves, Color::White),
            black: SideSummary::from_moves(moves, Color::Black),
        }
    }

    #[must_use]
    pub fn side(&self, color: Color) -> &SideSummary {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub moves: Vec<MoveAnalysis>,
    pub critical_moments: Vec<CriticalMoment>,
    pub themes: Vec<PlyThemes>,
    pub summary: GameSummary,
}

#[derive(Debug)]
pub struct GameAnalyzer<B> {
    board: B,
    config: AnalysisConfig,
    registry: ThemeRegistry,
    tracker: ThemeLifecycleTracker,
}

impl<B> GameAnalyzer<B>
where
    B: BoardService,
{
    pub fn new(board: B, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config
            .validate()
            .map_err(|source| AnalysisError::Config { source })?;
        Ok(Self {
            board,
            tracker: ThemeLifecycleTracker::new(config.decay_rate),
            registry: ThemeRegistry::default(),
            config,
        })
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ThemeRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes one game. Tracker state from a previous game is discarded first.
    pub fn analyze(&mut self, plies: &[PlyInput]) -> Result<GameReport, AnalysisError> {
        self.tracker.reset();
        let mut moves = Vec::with_capacity(plies.len());
        let mut themes = Vec::with_capacity(plies.len());
        let mut previous_ply = None;
        for input in plies {
            if let Some(previous) = previous_ply
                && input.ply <= previous
            {
                return Err(AnalysisError::PlyOutOfOrder {
                    ply: input.ply,
                    previous,
                });
            }
            previous_ply = Some(input.ply);

            let (analysis, ply_themes) = self.analyze_ply(input)?;
            moves.push(analysis);
            themes.push(ply_themes);
        }

        let selector = CriticalMomentSelector {
            max_critical_ratio: self.config.max_critical_ratio,
            min_interest_score: self.config.min_interest_score,
        };
        let activity = themes.iter().map(PlyThemes::activity).collect::<Vec<_>>();
        let critical_moments = selector.select(&moves, &activity);
        mark_critical(&mut moves, &critical_moments);

        let summary = GameSummary::from_moves(&moves);
        log::debug!(
            "analyzed {} plies, {} critical moments",
            moves.len(),
            critical_moments.len()
        );
        Ok(GameReport {
            moves,
            critical_moments,
            themes,
            summary,
        })
    }

    fn analyze_ply(
        &mut self,
        input: &PlyInput,
    ) -> Result<(MoveAnalysis, PlyThemes), AnalysisError> {
        let ply = input.ply;
        let board_err = |source| AnalysisError::Board { ply, source };

        let mover = self
            .board
            .header(&input.fen_before)
            .map_err(board_err)?
            .side_to_move;
        let outcome = self
            .board
            .make_move(&input.fen_before, &input.san)
            .map_err(board_err)?;
        let legal_move_count = match input.legal_move_count {
            Some(count) => count,
            None => {
                let count = self
                    .board
                    .legal_moves(&input.fen_before)
                    .map_err(board_err)?
                    .len();
                u32::try_from(count).unwrap_or(u32::MAX)
            }
        };

        let options = ClassifyOptions {
            is_book_move: input.is_book_move,
            rating: self.config.target_rating,
            legal_move_count: Some(legal_move_count),
            alternatives: input.alternatives.clone(),
            human_probability: input.human_probability,
            is_sacrifice: input.is_sacrifice,
        };
        let result = classify_move(
            input.eval_before,
            input.eval_after,
            mover == Color::White,
            &options,
        );

        let snapshot = self.board.snapshot(&outcome.fen_after).map_err(board_err)?;
        let position = PositionAnalysis::new(snapshot);
        let previous = self.tracker.active_themes();
        let ctx = DetectorContext::new(&position, ply, self.config.tier, &previous);
        let detection = self.registry.detect(&ctx);
        let deltas = self.tracker.update(ply, detection.themes);

        let analysis = MoveAnalysis::new(input, outcome.san, outcome.fen_after, mover, result);
        Ok((
            analysis,
            PlyThemes {
                ply,
                deltas,
                notes: detection.notes,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use kibitz_board::ShakmatyBoard;
    use kibitz_evaluator::evaluation::Evaluation;

    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn plies(moves: &[(&str, Evaluation, Evaluation)]) -> Vec<PlyInput> {
        let board = ShakmatyBoard;
        let mut fen = START.to_owned();
        let mut plies = vec![];
        for (ply, &(san, before, after)) in (0..).zip(moves) {
            plies.push(PlyInput::new(ply, san, fen.clone(), before, after));
            fen = board.make_move(&fen, san).unwrap().fen_after;
        }
        plies
    }

    #[test]
    fn test_analyzer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<GameAnalyzer<ShakmatyBoard>>();
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            max_critical_ratio: -0.1,
            ..AnalysisConfig::default()
        };
        let err = GameAnalyzer::new(ShakmatyBoard, config).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_illegal_move_reports_ply() {
        let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
        let mut input = plies(&[("e4", Evaluation::cp(30), Evaluation::cp(-30))]);
        input[0].san = "e5".to_owned();
        let err = analyzer.analyze(&input).unwrap_err();
        assert!(matches!(err, AnalysisError::Board { ply: 0, .. }));
    }

    #[test]
    fn test_plies_must_increase() {
        let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
        let mut input = plies(&[
            ("e4", Evaluation::cp(30), Evaluation::cp(-30)),
            ("e5", Evaluation::cp(-30), Evaluation::cp(30)),
        ]);
        input[1].ply = 0;
        assert_eq!(
            analyzer.analyze(&input).unwrap_err(),
            AnalysisError::PlyOutOfOrder { ply: 0, previous: 0 }
        );
    }

    #[test]
    fn test_legal_move_count_is_filled_in() {
        let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
        let fen = "4k3/8/8/8/8/8/r7/K7 w - - 0 1";
        let input = PlyInput::new(0, "Kb1", fen, Evaluation::cp(-600), Evaluation::cp(600));
        let report = analyzer.analyze(&[input]).unwrap();
        // In check from the a2 rook, only Kxa2 and Kb1 are legal.
        assert_eq!(report.moves[0].classification(), Classification::Forced);
    }
}
