//! Following themes from ply to ply.
//!
//! [`ThemeLifecycleTracker::update`] receives the themes of each ply in turn and
//! labels every one of them relative to the previous ply:
//!
//! | transition    | condition                                                  |
//! |---------------|------------------------------------------------------------|
//! | `emerged`     | key not present at the previous ply                        |
//! | `escalated`   | key present, severity strictly higher                      |
//! | `transformed` | key present, secondary squares changed substantially       |
//! | `persisting`  | key present otherwise                                      |
//! | `resolved`    | key present at the previous ply but not now (reported once) |
//!
//! Novelty starts at 1.0 and falls by `decay_rate` for every ply since the theme was
//! first seen, never below zero.

use std::collections::BTreeMap;

use kibitz_board::{Square, SquareSet};

use crate::theme::{ThemeDelta, ThemeInstance, ThemeKey, ThemeStatus, dedup_by_key};

pub const DEFAULT_DECAY_RATE: f32 = 0.15;

/// Secondary squares overlapping less than this (Jaccard index) mark a transformation.
const TRANSFORM_OVERLAP: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct ThemeLifecycleTracker {
    decay_rate: f32,
    active: BTreeMap<ThemeKey, ThemeInstance>,
    last_ply: Option<u32>,
}

impl Default for ThemeLifecycleTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_RATE)
    }
}

impl ThemeLifecycleTracker {
    /// Negative or non-finite decay rates are treated as zero.
    #[must_use]
    pub fn new(decay_rate: f32) -> Self {
        let decay_rate = if decay_rate.is_finite() {
            decay_rate.max(0.0)
        } else {
            0.0
        };
        Self {
            decay_rate,
            active: BTreeMap::new(),
            last_ply: None,
        }
    }

    #[must_use]
    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    #[must_use]
    pub fn last_ply(&self) -> Option<u32> {
        self.last_ply
    }

    /// Themes active after the last update, in key order.
    pub fn active(&self) -> impl Iterator<Item = &ThemeInstance> {
        self.active.values()
    }

    /// Owned copy of [`active`](Self::active), suitable as the previous themes of a
    /// [`DetectorContext`](crate::DetectorContext).
    #[must_use]
    pub fn active_themes(&self) -> Vec<ThemeInstance> {
        self.active.values().cloned().collect()
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.last_ply = None;
    }

    /// Records the themes found at `ply` and returns one delta per current theme
    /// followed by one per resolved theme.
    pub fn update(&mut self, ply: u32, themes: Vec<ThemeInstance>) -> Vec<ThemeDelta> {
        if let Some(last) = self.last_ply
            && ply <= last
        {
            log::warn!("theme lifecycle went from ply {last} to ply {ply}");
        }

        let mut previous = std::mem::take(&mut self.active);
        let mut deltas = vec![];
        for mut theme in dedup_by_key(themes) {
            theme.last_seen_ply = ply;
            let delta = match previous.remove(&theme.key) {
                None => {
                    theme.first_seen_ply = ply;
                    theme.status = ThemeStatus::Emerged;
                    theme.novelty_score = 1.0;
                    ThemeDelta {
                        theme,
                        transition: ThemeStatus::Emerged,
                        previous_status: None,
                        previous_severity: None,
                    }
                }
                Some(before) => {
                    let transition = if theme.severity > before.severity {
                        ThemeStatus::Escalated
                    } else if overlap(&before.secondary_squares, &theme.secondary_squares)
                        < TRANSFORM_OVERLAP
                    {
                        ThemeStatus::Transformed
                    } else {
                        ThemeStatus::Persisting
                    };
                    theme.first_seen_ply = before.first_seen_ply;
                    theme.status = transition;
                    theme.novelty_score = self.novelty(ply, before.first_seen_ply);
                    ThemeDelta {
                        theme,
                        transition,
                        previous_status: Some(before.status),
                        previous_severity: Some(before.severity),
                    }
                }
            };
            self.active.insert(delta.theme.key, delta.theme.clone());
            deltas.push(delta);
        }

        for (_, before) in previous {
            let previous_status = before.status;
            let previous_severity = before.severity;
            deltas.push(ThemeDelta {
                theme: ThemeInstance {
                    status: ThemeStatus::Resolved,
                    ..before
                },
                transition: ThemeStatus::Resolved,
                previous_status: Some(previous_status),
                previous_severity: Some(previous_severity),
            });
        }

        self.last_ply = Some(ply);
        deltas
    }

    fn novelty(&self, ply: u32, first_seen_ply: u32) -> f32 {
        #[expect(clippy::cast_precision_loss)]
        let age = ply.saturating_sub(first_seen_ply) as f32;
        (1.0 - age * self.decay_rate).max(0.0)
    }
}

/// Jaccard index of two square lists; two empty lists overlap fully.
fn overlap(a: &[Square], b: &[Square]) -> f32 {
    let a = a.iter().copied().collect::<SquareSet>();
    let b = b.iter().copied().collect::<SquareSet>();
    let union = a.union(b).len();
    if union == 0 {
        return 1.0;
    }
    #[expect(clippy::cast_precision_loss)]
    let ratio = a.intersection(b).len() as f32 / union as f32;
    ratio
}

#[cfg(test)]
mod tests {
    use kibitz_board::Color;

    use super::*;
    use crate::theme::{Severity, ThemeType};

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn pin(secondary: &[&str], severity: Severity) -> ThemeInstance {
        ThemeInstance::new(ThemeType::Pin, sq("f6"), Color::White, 0)
            .with_secondary(secondary.iter().map(|s| sq(s)))
            .with_severity(severity)
    }

    mod transitions {
        use super::*;

        #[test]
        fn test_new_theme_emerges_with_full_novelty() {
            let mut tracker = ThemeLifecycleTracker::default();
            let deltas = tracker.update(5, vec![pin(&["g5", "d8"], Severity::Moderate)]);
            assert_eq!(deltas.len(), 1);
            assert_eq!(deltas[0].transition, ThemeStatus::Emerged);
            assert_eq!(deltas[0].theme.first_seen_ply, 5);
            assert!((deltas[0].theme.novelty_score - 1.0).abs() < f32::EPSILON);
            assert!(deltas[0].previous_status.is_none());
        }

        #[test]
        fn test_persisting_theme_decays() {
            let mut tracker = ThemeLifecycleTracker::default();
            tracker.update(1, vec![pin(&["g5", "d8"], Severity::Moderate)]);
            let deltas = tracker.update(3, vec![pin(&["g5", "d8"], Severity::Moderate)]);
            assert_eq!(deltas[0].transition, ThemeStatus::Persisting);
            assert_eq!(deltas[0].theme.first_seen_ply, 1);
            assert_eq!(deltas[0].theme.last_seen_ply, 3);
            assert!((deltas[0].theme.novelty_score - 0.7).abs() < 1e-6);
        }

        #[test]
        fn test_higher_severity_escalates() {
            let mut tracker = ThemeLifecycleTracker::default();
            tracker.update(1, vec![pin(&["g5", "d8"], Severity::Moderate)]);
            let deltas = tracker.update(2, vec![pin(&["g5", "d8"], Severity::Critical)]);
            assert_eq!(deltas[0].transition, ThemeStatus::Escalated);
            assert_eq!(deltas[0].previous_severity, Some(Severity::Moderate));
            assert!(deltas[0].is_activity());
        }

        #[test]
        fn test_changed_geometry_transforms() {
            let mut tracker = ThemeLifecycleTracker::default();
            tracker.update(1, vec![pin(&["g5", "d8"], Severity::Moderate)]);
            let deltas = tracker.update(2, vec![pin(&["h4", "e7"], Severity::Moderate)]);
            assert_eq!(deltas[0].transition, ThemeStatus::Transformed);
            assert!(!deltas[0].is_activity());
        }

        #[test]
        fn test_resolved_once_then_forgotten() {
            let mut tracker = ThemeLifecycleTracker::default();
            tracker.update(1, vec![pin(&["g5"], Severity::Minor)]);
            let deltas = tracker.update(2, vec![]);
            assert_eq!(deltas.len(), 1);
            assert_eq!(deltas[0].transition, ThemeStatus::Resolved);
            assert_eq!(deltas[0].theme.status, ThemeStatus::Resolved);
            assert_eq!(deltas[0].theme.last_seen_ply, 1);
            assert!(tracker.update(3, vec![]).is_empty());
            assert_eq!(tracker.active().count(), 0);
        }

        #[test]
        fn test_reappearing_theme_emerges_again() {
            let mut tracker = ThemeLifecycleTracker::default();
            tracker.update(1, vec![pin(&["g5"], Severity::Minor)]);
            tracker.update(2, vec![]);
            let deltas = tracker.update(3, vec![pin(&["g5"], Severity::Minor)]);
            assert_eq!(deltas[0].transition, ThemeStatus::Emerged);
            assert_eq!(deltas[0].theme.first_seen_ply, 3);
        }
    }

    #[test]
    fn test_novelty_counts_plies_since_first_sighting() {
        let mut tracker = ThemeLifecycleTracker::default();
        tracker.update(1, vec![pin(&[], Severity::Minor)]);
        let deltas = tracker.update(2, vec![pin(&[], Severity::Minor)]);
        assert!((deltas[0].theme.novelty_score - 0.85).abs() < 1e-6);
        let deltas = tracker.update(5, vec![pin(&[], Severity::Minor)]);
        assert!((deltas[0].theme.novelty_score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_novelty_floors_at_zero() {
        let mut tracker = ThemeLifecycleTracker::new(0.5);
        tracker.update(0, vec![pin(&[], Severity::Minor)]);
        let deltas = tracker.update(10, vec![pin(&[], Severity::Minor)]);
        assert!(deltas[0].theme.novelty_score.abs() < f32::EPSILON);
        assert_eq!(deltas[0].transition, ThemeStatus::Persisting);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut tracker = ThemeLifecycleTracker::default();
        tracker.update(4, vec![pin(&["g5"], Severity::Minor)]);
        tracker.reset();
        assert_eq!(tracker.last_ply(), None);
        let deltas = tracker.update(5, vec![pin(&["g5"], Severity::Minor)]);
        assert_eq!(deltas[0].transition, ThemeStatus::Emerged);
    }

    #[test]
    fn test_overlap() {
        assert!((overlap(&[], &[]) - 1.0).abs() < f32::EPSILON);
        assert!((overlap(&[sq("a1"), sq("b2")], &[sq("b2"), sq("c3")]) - 1.0 / 3.0).abs() < 1e-6);
    }
}
