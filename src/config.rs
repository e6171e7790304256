//! Host-supplied configuration. Every field has a default so pages can pass
//! `{}` or nothing at all.

use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_STORAGE_KEY: &str = "codecombat-progress";
pub const DEFAULT_POINTS_PER_LEVEL: u32 = 100;
pub const DEFAULT_LEVELS_PER_CATEGORY: u32 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// localStorage slot holding the serialized progress mapping.
    pub storage_key: String,
    pub points_per_level: u32,
    /// Upper bound on catalog size per category.
    pub levels_per_category: u32,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            points_per_level: DEFAULT_POINTS_PER_LEVEL,
            levels_per_category: DEFAULT_LEVELS_PER_CATEGORY,
            log_level: "info".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn max_level(&self) -> tracing::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = StoreConfig::from_json(r#"{"points_per_level": 50}"#).unwrap();
        assert_eq!(cfg.points_per_level, 50);
        assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(cfg.levels_per_category, 30);
        assert_eq!(cfg.max_level(), tracing::Level::INFO);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(StoreConfig::from_json("{points").is_err());
    }
}
