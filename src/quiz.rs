//! Quiz flow: open a level through the gate, answer it, record completion.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, Difficulty, QuizLevel};
use crate::category::Category;
use crate::error::{ProgressError, Result};
use crate::gate::{self, LevelState};
use crate::progress::{PersistencePort, ProgressMap, ProgressStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// One open quiz modal.
#[derive(Clone, Debug)]
pub struct QuizAttempt {
    category: Category,
    level: QuizLevel,
    selected: Option<usize>,
    outcome: Option<Outcome>,
    /// Completion already reported to the store.
    recorded: bool,
}

impl QuizAttempt {
    fn new(category: Category, level: QuizLevel) -> Self {
        Self {
            category,
            level,
            selected: None,
            outcome: None,
            recorded: false,
        }
    }

    pub fn level(&self) -> &QuizLevel {
        &self.level
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Ignored while a result is showing or when `option` is out of range.
    pub fn select(&mut self, option: usize) -> bool {
        if self.outcome.is_some() || option >= self.level.options.len() {
            return false;
        }
        self.selected = Some(option);
        true
    }

    /// No-op without a selection.
    fn grade(&mut self) -> Option<Outcome> {
        let answer = self.selected?;
        let outcome = if self.level.is_correct(answer) {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.outcome = Some(outcome);
        Some(outcome)
    }

    pub fn retry(&mut self) {
        self.selected = None;
        self.outcome = None;
    }
}

/// Level card as rendered in the level grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelCard {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
    pub state: LevelState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub completed: u32,
    pub total: u32,
}

impl CategoryProgress {
    /// Progress bar fill in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }
}

/// Result of grading an attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// None when nothing was selected.
    pub outcome: Option<Outcome>,
    /// True only for the submission that wrote the level to the store.
    pub recorded: bool,
    pub progress: ProgressMap,
}

pub struct GameSession<P: PersistencePort> {
    store: ProgressStore<P>,
    catalog: Catalog,
}

impl<P: PersistencePort> GameSession<P> {
    pub fn new(store: ProgressStore<P>, catalog: Catalog) -> Self {
        Self { store, catalog }
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore<P> {
        &mut self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Attempts opened against the old catalog stay valid; they carry their
    /// own copy of the level.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn open(&mut self, category: Category, level: u32) -> Result<QuizAttempt> {
        let entry = self
            .catalog
            .level(category, level)
            .ok_or(ProgressError::UnknownLevel { category, level })?
            .clone();
        if !gate::is_unlocked(&self.store.read(), category, level) {
            return Err(ProgressError::LevelLocked { category, level });
        }
        debug!(%category, level, "quiz opened");
        Ok(QuizAttempt::new(category, entry))
    }

    /// Grades the attempt. The first correct answer records the level; later
    /// correct answers on the same attempt do not write again.
    pub fn submit(&mut self, attempt: &mut QuizAttempt) -> Result<Submission> {
        let outcome = attempt.grade();
        if outcome == Some(Outcome::Correct) && !attempt.recorded {
            let progress = self.store.mark_complete(attempt.category, attempt.level.id)?;
            attempt.recorded = true;
            return Ok(Submission {
                outcome,
                recorded: true,
                progress,
            });
        }
        Ok(Submission {
            outcome,
            recorded: false,
            progress: self.store.read(),
        })
    }

    pub fn level_cards(&mut self, category: Category) -> Vec<LevelCard> {
        let progress = self.store.read();
        self.catalog
            .levels(category)
            .iter()
            .map(|l| LevelCard {
                id: l.id,
                title: l.title.clone(),
                difficulty: l.difficulty,
                state: gate::level_state(&progress, category, l.id),
            })
            .collect()
    }

    pub fn category_progress(&mut self, category: Category) -> CategoryProgress {
        CategoryProgress {
            completed: self.store.completed_count(category),
            total: self.catalog.len(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::StoreConfig;
    use crate::progress::MemoryPersistence;

    fn level(id: u32) -> QuizLevel {
        QuizLevel {
            id,
            title: format!("Level {id}"),
            difficulty: Difficulty::Easy,
            description: String::new(),
            question: "2 + 2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct_answer: 1,
            explanation: String::new(),
        }
    }

    fn session() -> GameSession<MemoryPersistence> {
        let levels: BTreeMap<Category, Vec<QuizLevel>> =
            [(Category::Html, (1..=4).map(level).collect())].into_iter().collect();
        let catalog = Catalog::new(levels, &StoreConfig::default()).unwrap();
        GameSession::new(ProgressStore::new(MemoryPersistence::new()), catalog)
    }

    #[test]
    fn locked_level_cannot_be_opened() {
        let mut s = session();
        assert!(matches!(
            s.open(Category::Html, 3),
            Err(ProgressError::LevelLocked { level: 3, .. })
        ));
        assert!(s.open(Category::Html, 2).is_ok());
    }

    #[test]
    fn unknown_level_is_reported() {
        let mut s = session();
        assert!(matches!(
            s.open(Category::Html, 9),
            Err(ProgressError::UnknownLevel { level: 9, .. })
        ));
        assert!(matches!(
            s.open(Category::Css, 1),
            Err(ProgressError::UnknownLevel { .. })
        ));
    }

    #[test]
    fn submit_without_selection_is_noop() {
        let mut s = session();
        let mut a = s.open(Category::Html, 2).unwrap();
        let sub = s.submit(&mut a).unwrap();
        assert_eq!(sub.outcome, None);
        assert!(!sub.recorded);
        assert!(!sub.progress.contains(Category::Html, 2));
    }

    #[test]
    fn wrong_answer_records_nothing_and_locks_selection() {
        let mut s = session();
        let mut a = s.open(Category::Html, 2).unwrap();
        assert!(a.select(0));
        let sub = s.submit(&mut a).unwrap();
        assert_eq!(sub.outcome, Some(Outcome::Incorrect));
        assert!(!sub.progress.contains(Category::Html, 2));
        assert!(!a.select(1), "selection frozen while result shows");
        assert_eq!(a.outcome(), Some(Outcome::Incorrect));
        a.retry();
        assert_eq!(a.outcome(), None);
        assert!(a.select(1));
        let sub = s.submit(&mut a).unwrap();
        assert_eq!(sub.outcome, Some(Outcome::Correct));
        assert!(sub.recorded);
        assert!(sub.progress.contains(Category::Html, 2));
    }

    #[test]
    fn correct_attempt_records_once() {
        let mut s = session();
        let mut a = s.open(Category::Html, 2).unwrap();
        a.select(1);
        assert!(s.submit(&mut a).unwrap().recorded);
        a.retry();
        a.select(1);
        let again = s.submit(&mut a).unwrap();
        assert_eq!(again.outcome, Some(Outcome::Correct));
        assert!(!again.recorded);
    }

    #[test]
    fn swapping_catalog_changes_cards() {
        let mut s = session();
        assert_eq!(s.catalog().len(Category::Html), 4);
        s.set_catalog(Catalog::default());
        assert!(s.level_cards(Category::Html).is_empty());
        assert_eq!(s.category_progress(Category::Html).total, 0);
    }

    #[test]
    fn correct_answer_unlocks_next_level() {
        let mut s = session();
        let mut a = s.open(Category::Html, 2).unwrap();
        a.select(1);
        s.submit(&mut a).unwrap();
        let states: Vec<_> = s.level_cards(Category::Html).iter().map(|c| c.state).collect();
        assert_eq!(
            states,
            [
                LevelState::Completed,
                LevelState::Completed,
                LevelState::Unlocked,
                LevelState::Locked
            ]
        );
        let p = s.category_progress(Category::Html);
        assert_eq!(p, CategoryProgress { completed: 2, total: 4 });
        assert!((p.fraction() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut s = session();
        let mut a = s.open(Category::Html, 1).unwrap();
        assert!(!a.select(5));
        assert_eq!(a.selected(), None);
    }
}
