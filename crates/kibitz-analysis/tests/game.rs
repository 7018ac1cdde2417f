use kibitz_analysis::{AnalysisConfig, CriticalMomentType, GameAnalyzer, PlyInput};
use kibitz_board::{BoardService as _, Color, ShakmatyBoard};
use kibitz_evaluator::{classification::Classification, evaluation::Evaluation};
use kibitz_themes::{AnalysisTier, ThemeCategory};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7#
fn scholars_mate() -> Vec<PlyInput> {
    let moves = [
        ("e4", Evaluation::cp(30), Evaluation::cp(-30)),
        ("e5", Evaluation::cp(-30), Evaluation::cp(35)),
        ("Qh5", Evaluation::cp(35), Evaluation::cp(-10)),
        ("Nc6", Evaluation::cp(10), Evaluation::cp(-15)),
        ("Bc4", Evaluation::cp(15), Evaluation::cp(-10)),
        ("Nf6", Evaluation::cp(10), Evaluation::mate(1)),
        ("Qxf7", Evaluation::mate(1), Evaluation::mate(0)),
    ];
    let board = ShakmatyBoard;
    let mut fen = START.to_owned();
    let mut plies = vec![];
    for (ply, (san, before, after)) in (0..).zip(moves) {
        plies.push(PlyInput::new(ply, san, fen.clone(), before, after));
        fen = board.make_move(&fen, san).unwrap().fen_after;
    }
    plies
}

#[test]
fn test_scholars_mate_report() {
    let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
    let report = analyzer.analyze(&scholars_mate()).unwrap();

    assert_eq!(report.moves.len(), 7);
    assert_eq!(report.themes.len(), 7);
    assert!(report.themes.iter().all(|t| t.notes.is_empty()));

    let mate = &report.moves[6];
    assert_eq!(mate.san(), "Qxf7#");
    assert_eq!(mate.mover(), Color::White);
    assert_eq!(mate.cp_loss(), 0);

    let blunder = &report.moves[5];
    assert_eq!(blunder.mover(), Color::Black);
    assert_eq!(blunder.classification(), Classification::Blunder);
    assert_eq!(blunder.nag(), Some(4));
    assert!(blunder.is_critical());

    // ceil(7 * 0.15) = 2
    assert!(report.critical_moments.len() <= 2);
    let moment = report
        .critical_moments
        .iter()
        .find(|m| m.ply == 5)
        .unwrap();
    assert_eq!(moment.moment_type, CriticalMomentType::Blunder);
    assert!(report.critical_moments.is_sorted_by_key(|m| m.ply));
    for m in &report.moves {
        assert_eq!(
            m.is_critical(),
            report.critical_moments.iter().any(|c| c.ply == m.ply())
        );
    }

    let summary = &report.summary;
    assert_eq!(summary.total_moves, 7);
    assert_eq!(summary.white.moves, 4);
    assert_eq!(summary.black.moves, 3);
    assert_eq!(summary.black.count(Classification::Blunder), 1);
    assert_eq!(summary.white.count(Classification::Blunder), 0);
    assert!(summary.white.accuracy > summary.black.accuracy);
    assert_eq!(summary.side(Color::Black).moves, 3);
}

#[test]
fn test_reanalysis_is_deterministic() {
    let plies = scholars_mate();
    let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
    let first = analyzer.analyze(&plies).unwrap();
    let second = analyzer.analyze(&plies).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_quick_tier_reports_only_tactical_themes() {
    let config = AnalysisConfig {
        tier: AnalysisTier::Quick,
        ..AnalysisConfig::default()
    };
    let mut analyzer = GameAnalyzer::new(ShakmatyBoard, config).unwrap();
    let report = analyzer.analyze(&scholars_mate()).unwrap();
    assert!(
        report
            .themes
            .iter()
            .flat_map(|t| &t.deltas)
            .all(|d| d.theme.theme_type.category() == ThemeCategory::Tactical)
    );
}

#[test]
fn test_report_serializes() {
    let mut analyzer = GameAnalyzer::new(ShakmatyBoard, AnalysisConfig::default()).unwrap();
    let report = analyzer.analyze(&scholars_mate()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["moves"][5]["classification"], "blunder");
    assert_eq!(json["summary"]["black"]["classifications"]["blunder"], 1);
}
