//! Level catalog: per-category quiz levels supplied by the host page as JSON.
//!
//! The progress core only ever consumes level ids; titles, questions and
//! difficulty are display data. Difficulty does not feed into scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::config::StoreConfig;
use crate::error::{ProgressError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

/// One multiple-choice level. Field names follow the page's camelCase JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizLevel {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizLevel {
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    levels: BTreeMap<Category, Vec<QuizLevel>>,
}

impl Catalog {
    /// Validates every category: ids contiguous from 1, at most
    /// `config.levels_per_category` levels, answer index within options.
    pub fn new(mut levels: BTreeMap<Category, Vec<QuizLevel>>, config: &StoreConfig) -> Result<Self> {
        for (category, list) in levels.iter_mut() {
            list.sort_by_key(|l| l.id);
            validate(*category, list, config.levels_per_category)?;
        }
        Ok(Self { levels })
    }

    /// `{"html": [{"id": 1, ...}], "css": [...]}`
    pub fn from_json(json: &str, config: &StoreConfig) -> Result<Self> {
        let wire: BTreeMap<String, Vec<QuizLevel>> = serde_json::from_str(json)?;
        let mut levels = BTreeMap::new();
        for (key, list) in wire {
            let category: Category = key.parse()?;
            levels.insert(category, list);
        }
        Self::new(levels, config)
    }

    pub fn levels(&self, category: Category) -> &[QuizLevel] {
        self.levels
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn level(&self, category: Category, id: u32) -> Option<&QuizLevel> {
        // ids are contiguous from 1 after validation
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.levels(category).get(idx)
    }

    pub fn len(&self, category: Category) -> u32 {
        self.levels(category).len() as u32
    }
}

fn validate(category: Category, list: &[QuizLevel], max: u32) -> Result<()> {
    if list.len() > max as usize {
        return Err(ProgressError::Catalog(format!(
            "{category} has {} levels, limit is {max}",
            list.len()
        )));
    }
    for (idx, level) in list.iter().enumerate() {
        let expected = idx as u32 + 1;
        if level.id != expected {
            return Err(ProgressError::Catalog(format!(
                "{category} level ids must be contiguous from 1: expected {expected}, found {}",
                level.id
            )));
        }
        if level.correct_answer >= level.options.len() {
            return Err(ProgressError::Catalog(format!(
                "{category} level {} answer index {} out of {} options",
                level.id,
                level.correct_answer,
                level.options.len()
            )));
        }
    }
    Ok(())
}
