//! Pure level gating and badge tiers over a [`ProgressMap`] snapshot.
//!
//! Unlocking only looks at the immediate predecessor: with `{1, 5}` completed,
//! level 6 is unlocked while 2..=4 are not. The normal play path can never
//! produce such a set, but a hand-edited one is honoured as-is.

use std::fmt;

use serde::Serialize;

use crate::category::Category;
use crate::progress::ProgressMap;

/// Derived per-level state, in lattice order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelState {
    Locked,
    Unlocked,
    Completed,
}

pub fn is_unlocked(progress: &ProgressMap, category: Category, level: u32) -> bool {
    match level {
        0 => false,
        1 => true,
        n => progress.contains(category, n - 1),
    }
}

pub fn is_completed(progress: &ProgressMap, category: Category, level: u32) -> bool {
    progress.contains(category, level)
}

/// A completed level reads as `Completed` even if its predecessor is missing.
pub fn level_state(progress: &ProgressMap, category: Category, level: u32) -> LevelState {
    if is_completed(progress, category, level) {
        LevelState::Completed
    } else if is_unlocked(progress, category, level) {
        LevelState::Unlocked
    } else {
        LevelState::Locked
    }
}

// --- Badges -------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Badge {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
    Grandmaster,
}

/// Inclusive lower bounds, highest first.
const BADGE_THRESHOLDS: [(u32, Badge); 5] = [
    (2500, Badge::Grandmaster),
    (2000, Badge::Master),
    (1500, Badge::Expert),
    (1000, Badge::Advanced),
    (500, Badge::Intermediate),
];

impl Badge {
    pub fn for_score(score: u32) -> Self {
        BADGE_THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map_or(Badge::Beginner, |(_, badge)| *badge)
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::Beginner => "Beginner",
            Badge::Intermediate => "Intermediate",
            Badge::Advanced => "Advanced",
            Badge::Expert => "Expert",
            Badge::Master => "Master",
            Badge::Grandmaster => "Grandmaster",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn badge_for_score(score: u32) -> Badge {
    Badge::for_score(score)
}
