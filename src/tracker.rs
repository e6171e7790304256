//! JavaScript facade. Pages hold one `ProgressTracker` and call into it from
//! the level grid, the quiz modal and the leaderboard.

use serde::Serialize;
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::catalog::Catalog;
use crate::category::Category;
use crate::config::StoreConfig;
use crate::error::ProgressError;
use crate::gate::{self, Badge};
use crate::leaderboard;
use crate::progress::{MemoryPersistence, PersistencePort, ProgressStore};
use crate::quiz::{GameSession, QuizAttempt};

#[wasm_bindgen]
pub struct ProgressTracker {
    session: GameSession<Box<dyn PersistencePort>>,
    /// The quiz modal currently open, if any.
    attempt: Option<QuizAttempt>,
}

#[wasm_bindgen]
impl ProgressTracker {
    /// `config_json` may be omitted; see `StoreConfig` for the fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ProgressTracker, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => StoreConfig::from_json(json).map_err(to_js)?,
            None => StoreConfig::default(),
        };
        #[cfg(target_arch = "wasm32")]
        crate::logging::init(config.max_level());
        let port = open_port(&config.storage_key);
        Ok(Self::with_port(port, config))
    }

    // --- Progress -----------------------------------------------------------

    /// Current mapping as `{"html":[1,2],...}`.
    pub fn progress_json(&mut self) -> Result<String, JsValue> {
        self.store().read().to_json().map_err(to_js)
    }

    /// Records `level` and returns the new mapping as JSON. Prefer
    /// `submit_answer`, which gates and records exactly once.
    pub fn mark_complete(&mut self, category: &str, level: u32) -> Result<String, JsValue> {
        let category = parse_category(category)?;
        let map = self.store().mark_complete(category, level).map_err(to_js)?;
        map.to_json().map_err(to_js)
    }

    pub fn reset(&mut self) {
        self.attempt = None;
        self.store().reset();
    }

    pub fn completed_count(&mut self, category: &str) -> Result<u32, JsValue> {
        let category = parse_category(category)?;
        Ok(self.store().completed_count(category))
    }

    pub fn total_score(&mut self) -> u32 {
        self.store().total_score()
    }

    pub fn is_unlocked(&mut self, category: &str, level: u32) -> Result<bool, JsValue> {
        let category = parse_category(category)?;
        Ok(gate::is_unlocked(&self.store().read(), category, level))
    }

    pub fn is_completed(&mut self, category: &str, level: u32) -> Result<bool, JsValue> {
        let category = parse_category(category)?;
        Ok(gate::is_completed(&self.store().read(), category, level))
    }

    /// Badge label for the current total score.
    pub fn badge(&mut self) -> String {
        Badge::for_score(self.store().total_score()).label().to_string()
    }

    /// Ranked table including the current player, as a JSON array.
    pub fn leaderboard_json(&mut self) -> Result<String, JsValue> {
        let score = self.store().total_score();
        let table = leaderboard::standings(score, &self.store().read());
        to_json(&table)
    }

    /// False when storage is unavailable and progress only lives for this page load.
    pub fn is_persistent(&mut self) -> bool {
        self.store().is_persistent()
    }

    // --- Catalog & quiz -----------------------------------------------------

    /// Replace the level catalog (`{"html":[{"id":1,...}],...}`). Closes any
    /// open level.
    pub fn load_catalog(&mut self, json: &str) -> Result<(), JsValue> {
        let config = self.store().config().clone();
        let catalog = Catalog::from_json(json, &config).map_err(to_js)?;
        self.session.set_catalog(catalog);
        self.attempt = None;
        Ok(())
    }

    pub fn level_count(&self, category: &str) -> Result<u32, JsValue> {
        Ok(self.session.catalog().len(parse_category(category)?))
    }

    /// `[{"id":1,"title":..,"difficulty":..,"state":"completed"},...]`
    pub fn level_cards_json(&mut self, category: &str) -> Result<String, JsValue> {
        let cards = self.session.level_cards(parse_category(category)?);
        to_json(&cards)
    }

    /// `{"completed":n,"total":m}` for the progress bar.
    pub fn category_progress_json(&mut self, category: &str) -> Result<String, JsValue> {
        let progress = self.session.category_progress(parse_category(category)?);
        to_json(&progress)
    }

    /// Opens a level if it is unlocked and returns its catalog entry as JSON.
    pub fn open_level(&mut self, category: &str, level: u32) -> Result<String, JsValue> {
        let category = parse_category(category)?;
        let attempt = self.session.open(category, level).map_err(to_js)?;
        let json = to_json(attempt.level())?;
        self.attempt = Some(attempt);
        Ok(json)
    }

    /// Picks an option in the open level. False if ignored.
    pub fn select_answer(&mut self, option: usize) -> bool {
        self.attempt.as_mut().is_some_and(|a| a.select(option))
    }

    /// Grades the open level: `{"outcome":"Correct","recorded":true,"progress":{..}}`.
    pub fn submit_answer(&mut self) -> Result<String, JsValue> {
        let attempt = self
            .attempt
            .as_mut()
            .ok_or_else(|| to_js(ProgressError::NoOpenLevel))?;
        let submission = self.session.submit(attempt).map_err(to_js)?;
        to_json(&submission)
    }

    /// Clears selection and result so the player can answer again.
    pub fn retry_level(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.retry();
        }
    }

    pub fn close_level(&mut self) {
        self.attempt = None;
    }
}

impl ProgressTracker {
    /// Build over an explicit port; used by tests and non-browser hosts.
    pub fn with_port(port: Box<dyn PersistencePort>, config: StoreConfig) -> Self {
        debug!(key = %config.storage_key, "progress tracker ready");
        Self {
            session: GameSession::new(ProgressStore::with_config(port, config), Catalog::default()),
            attempt: None,
        }
    }

    fn store(&mut self) -> &mut ProgressStore<Box<dyn PersistencePort>> {
        self.session.store_mut()
    }
}

#[wasm_bindgen(js_name = badgeForScore)]
pub fn badge_label_for_score(score: u32) -> String {
    gate::badge_for_score(score).label().to_string()
}

#[cfg(target_arch = "wasm32")]
fn open_port(key: &str) -> Box<dyn PersistencePort> {
    use crate::progress::LocalStoragePersistence;

    match LocalStoragePersistence::open(key) {
        Ok(port) => Box::new(port),
        Err(err) => {
            tracing::warn!(error = %err, "localStorage unavailable");
            // the store notices on first read and stays in memory
            Box::new(MemoryPersistence::unavailable())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_port(_key: &str) -> Box<dyn PersistencePort> {
    Box::new(MemoryPersistence::new())
}

fn parse_category(s: &str) -> Result<Category, JsValue> {
    s.parse::<Category>().map_err(to_js)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| to_js(e.into()))
}

fn to_js(err: ProgressError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
