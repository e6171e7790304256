//! Code Combat core crate.
//!
//! Tracks which quiz levels a player has completed per category, derives
//! unlock state, score and badge from that, and ranks the player on the
//! leaderboard. Progress lives in browser `localStorage`; everything else
//! (rendering, animation, routing) stays on the JS side and talks to
//! [`ProgressTracker`].

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod category;
pub mod config;
pub mod error;
pub mod gate;
pub mod leaderboard;
pub mod logging;
pub mod progress;
pub mod quiz;
mod tracker;

pub use catalog::{Catalog, Difficulty, QuizLevel};
pub use category::Category;
pub use config::StoreConfig;
pub use error::{ProgressError, Result};
pub use gate::{Badge, LevelState, badge_for_score, is_completed, is_unlocked, level_state};
pub use progress::{
    LocalStoragePersistence, MemoryPersistence, PersistencePort, ProgressMap, ProgressStore,
};
pub use quiz::{GameSession, Outcome, QuizAttempt};
pub use tracker::{ProgressTracker, badge_label_for_score};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
