//! Error type shared by the store, gate, catalog and JS facade.

use crate::category::Category;

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid level id {0}: level ids start at 1")]
    InvalidLevel(u32),

    #[error("level {level} of {category} is locked")]
    LevelLocked { category: Category, level: u32 },

    #[error("level {level} of {category} is not in the catalog")]
    UnknownLevel { category: Category, level: u32 },

    #[error("no level is open")]
    NoOpenLevel,

    #[error("persisted progress is malformed: {0}")]
    Corrupt(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("invalid level catalog: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProgressError>;
