//! Remembering which ideas have already been explained.
//!
//! An idea is coarser than a theme: "White's pin on f6" and "White's pin" are both
//! ideas, the second being the [coarse](IdeaKey::coarse) form of the first. Commentary
//! consults an [`IdeaKeySet`] before explaining something and records it afterwards.

use std::{collections::HashMap, fmt};

use kibitz_board::{Color, Square};
use serde::{Deserialize, Serialize};

use crate::theme::ThemeInstance;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdeaKey {
    pub concept: String,
    pub beneficiary: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Square>,
}

impl IdeaKey {
    #[must_use]
    pub fn new(concept: impl Into<String>, beneficiary: Color, anchor: Option<Square>) -> Self {
        Self {
            concept: concept.into(),
            beneficiary,
            anchor,
        }
    }

    /// The same idea without its anchor square.
    #[must_use]
    pub fn coarse(&self) -> Self {
        Self {
            anchor: None,
            ..self.clone()
        }
    }
}

impl From<&ThemeInstance> for IdeaKey {
    fn from(theme: &ThemeInstance) -> Self {
        Self::new(
            theme.theme_type.as_str(),
            theme.beneficiary,
            Some(theme.primary_square),
        )
    }
}

impl fmt::Display for IdeaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.concept, self.beneficiary)?;
        if let Some(anchor) = self.anchor {
            write!(f, ":{anchor}")?;
        }
        Ok(())
    }
}

/// Ideas surfaced so far, with the ply each was last recorded at.
#[derive(Debug, Clone, Default)]
pub struct IdeaKeySet {
    exact: HashMap<IdeaKey, u32>,
    coarse: HashMap<IdeaKey, u32>,
    cooldown: Option<u32>,
}

impl IdeaKeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ideas become fresh again `cooldown` plies after they were last recorded.
    #[must_use]
    pub fn with_cooldown(cooldown: u32) -> Self {
        Self {
            cooldown: Some(cooldown),
            ..Self::default()
        }
    }

    pub fn record(&mut self, key: &IdeaKey, ply: u32) {
        self.exact.insert(key.clone(), ply);
        self.coarse.insert(key.coarse(), ply);
    }

    /// Whether exactly this idea was surfaced and is still within its cooldown.
    #[must_use]
    pub fn is_redundant(&self, key: &IdeaKey, ply: u32) -> bool {
        self.exact.get(key).is_some_and(|&at| self.within_cooldown(at, ply))
    }

    /// Whether the idea was surfaced at any anchor.
    #[must_use]
    pub fn is_coarse_redundant(&self, key: &IdeaKey, ply: u32) -> bool {
        self.coarse
            .get(&key.coarse())
            .is_some_and(|&at| self.within_cooldown(at, ply))
    }

    fn within_cooldown(&self, recorded_at: u32, ply: u32) -> bool {
        self.cooldown
            .is_none_or(|cooldown| ply.saturating_sub(recorded_at) < cooldown)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    pub fn clear(&mut self) {
        self.exact.clear();
        self.coarse.clear();
    }
}
