//! Running detectors over one position.
//!
//! [`ThemeRegistry`] owns an ordered set of [`Detector`]s. A failing detector never
//! aborts the run: its error becomes a [`DetectorNote`] and the other detectors still
//! contribute their themes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    detector::{Detector, DetectorContext},
    theme::{AnalysisTier, ThemeDelta, ThemeInstance, ThemeKey, ThemeStatus, dedup_by_key},
};

/// A detector failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorNote {
    pub detector: Detector,
    pub ply: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutput {
    /// Deduplicated themes, in detector priority order.
    pub themes: Vec<ThemeInstance>,
    /// Emerged, persisting and resolved themes relative to the context's previous
    /// themes. Escalation and transformation are left to the lifecycle tracker.
    pub deltas: Vec<ThemeDelta>,
    pub notes: Vec<DetectorNote>,
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    detectors: Vec<Detector>,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new(Detector::ALL)
    }
}

impl ThemeRegistry {
    /// Builds a registry over `detectors`, sorted by descending priority.
    /// Duplicates are dropped.
    pub fn new<I>(detectors: I) -> Self
    where
        I: IntoIterator<Item = Detector>,
    {
        let mut detectors = detectors.into_iter().collect::<Vec<_>>();
        detectors.sort_by_key(|d| std::cmp::Reverse(d.priority()));
        detectors.dedup();
        Self { detectors }
    }

    #[must_use]
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// Detectors that run at `tier`.
    pub fn active_detectors(&self, tier: AnalysisTier) -> impl Iterator<Item = Detector> + '_ {
        self.detectors
            .iter()
            .copied()
            .filter(move |d| d.min_tier() <= tier)
    }

    #[must_use]
    pub fn detect(&self, ctx: &DetectorContext<'_>) -> DetectionOutput {
        let mut themes = vec![];
        let mut notes = vec![];
        for detector in self.active_detectors(ctx.tier) {
            match detector.detect(ctx) {
                Ok(found) => themes.extend(found),
                Err(err) => {
                    log::warn!("detector {detector} failed at ply {}: {err}", ctx.ply);
                    notes.push(DetectorNote {
                        detector,
                        ply: ctx.ply,
                        message: err.to_string(),
                    });
                }
            }
        }
        let themes = dedup_by_key(themes);
        log::debug!("ply {}: {} themes", ctx.ply, themes.len());
        let deltas = preliminary_deltas(&themes, ctx.previous);
        DetectionOutput {
            themes,
            deltas,
            notes,
        }
    }
}

fn preliminary_deltas(current: &[ThemeInstance], previous: &[ThemeInstance]) -> Vec<ThemeDelta> {
    let current_keys = current.iter().map(|t| t.key).collect::<HashSet<ThemeKey>>();
    let mut deltas = current
        .iter()
        .map(|theme| {
            let before = previous.iter().find(|p| p.key == theme.key);
            ThemeDelta {
                theme: theme.clone(),
                transition: if before.is_some() {
                    ThemeStatus::Persisting
                } else {
                    ThemeStatus::Emerged
                },
                previous_status: before.map(|p| p.status),
                previous_severity: before.map(|p| p.severity),
            }
        })
        .collect::<Vec<_>>();
    deltas.extend(
        previous
            .iter()
            .filter(|p| !current_keys.contains(&p.key))
            .map(|p| ThemeDelta {
                theme: ThemeInstance {
                    status: ThemeStatus::Resolved,
                    ..p.clone()
                },
                transition: ThemeStatus::Resolved,
                previous_status: Some(p.status),
                previous_severity: Some(p.severity),
            }),
    );
    deltas
}
