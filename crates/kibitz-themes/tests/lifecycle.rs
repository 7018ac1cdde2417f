use kibitz_board::{BoardService as _, Color, ShakmatyBoard, Square};
use kibitz_themes::{
    AnalysisTier, DetectorContext, PositionAnalysis, ThemeInstance, ThemeLifecycleTracker,
    ThemeRegistry, ThemeStatus, ThemeType,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

#[test]
fn test_random_presence_keeps_lifecycle_invariants() {
    let mut rng = Pcg64Mcg::seed_from_u64(0x6b69_6274);
    let pool = [
        ThemeInstance::new(ThemeType::Pin, sq("f6"), Color::White, 0),
        ThemeInstance::new(ThemeType::Fork, sq("c7"), Color::White, 0),
        ThemeInstance::new(ThemeType::IsolatedPawn, sq("d5"), Color::Black, 0),
        ThemeInstance::new(ThemeType::OpenFile, sq("e1"), Color::White, 0),
    ];
    let mut tracker = ThemeLifecycleTracker::default();
    let mut last_novelty = std::collections::HashMap::new();
    let mut present_before = std::collections::HashSet::new();

    for ply in 0..200 {
        let current = pool
            .iter()
            .filter(|_| rng.random_bool(0.6))
            .cloned()
            .collect::<Vec<_>>();
        let deltas = tracker.update(ply, current.clone());

        let resolved = deltas
            .iter()
            .filter(|d| d.transition == ThemeStatus::Resolved)
            .map(|d| d.theme.key)
            .collect::<Vec<_>>();
        for key in &resolved {
            assert!(present_before.contains(key), "ply {ply}: {key} resolved twice");
            assert!(!current.iter().any(|t| t.key == *key));
        }

        for delta in deltas.iter().filter(|d| d.transition != ThemeStatus::Resolved) {
            let novelty = delta.theme.novelty_score;
            assert!((0.0..=1.0).contains(&novelty));
            if delta.transition == ThemeStatus::Emerged {
                assert!((novelty - 1.0).abs() < f32::EPSILON);
                assert!(!present_before.contains(&delta.theme.key));
            } else {
                let before = last_novelty[&delta.theme.key];
                assert!(novelty <= before, "ply {ply}: novelty rose for {}", delta.theme.key);
            }
            last_novelty.insert(delta.theme.key, novelty);
        }

        present_before = current.iter().map(|t| t.key).collect();
        assert_eq!(tracker.active().count(), present_before.len());
    }
}

#[test]
fn test_detected_pin_resolves_when_broken() {
    let board = ShakmatyBoard;
    let registry = ThemeRegistry::default();
    let mut tracker = ThemeLifecycleTracker::default();
    // 1. e4 e5 2. Nf3 Nc6 3. Bb5 d6 and then 4. Bxc6+ removes the pinned knight.
    let plies = [
        (6, "r1bqkbnr/ppp2ppp/2np4/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4"),
        (7, "r1bqkbnr/ppp2ppp/2Bp4/4p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 0 4"),
    ];

    let mut transitions = vec![];
    for (ply, fen) in plies {
        let analysis = PositionAnalysis::new(board.snapshot(fen).unwrap());
        let previous = tracker.active_themes();
        let ctx = DetectorContext::new(&analysis, ply, AnalysisTier::Standard, &previous);
        let output = registry.detect(&ctx);
        assert!(output.notes.is_empty());
        transitions.push(tracker.update(ply, output.themes));
    }

    let pin = transitions[0]
        .iter()
        .find(|d| d.theme.theme_type == ThemeType::Pin && d.theme.primary_square == sq("c6"))
        .unwrap();
    assert_eq!(pin.transition, ThemeStatus::Emerged);
    assert!(pin.theme.is_absolute);

    let resolved = transitions[1]
        .iter()
        .find(|d| d.theme.key == pin.theme.key)
        .unwrap();
    assert_eq!(resolved.transition, ThemeStatus::Resolved);
}
