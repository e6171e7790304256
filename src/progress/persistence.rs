//! Where the progress mapping lives between page loads.

use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::{Storage, window};

use super::ProgressMap;
use crate::error::{ProgressError, Result};

/// Persistence seam for [`super::ProgressStore`]. `load` returns `Ok(None)`
/// when nothing was saved yet.
pub trait PersistencePort {
    fn load(&self) -> Result<Option<ProgressMap>>;
    fn save(&mut self, progress: &ProgressMap) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

impl<T: PersistencePort + ?Sized> PersistencePort for Box<T> {
    fn load(&self) -> Result<Option<ProgressMap>> {
        (**self).load()
    }
    fn save(&mut self, progress: &ProgressMap) -> Result<()> {
        (**self).save(progress)
    }
    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

// --- In-memory ------------------------------------------------------------------

/// Keeps the serialized JSON text, so a reload goes through the same codec as
/// browser storage does.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    raw: Option<String>,
    unavailable: bool,
    /// `save` fails while `load`/`clear` still work, like a full quota.
    quota_full: bool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded slot, malformed text included.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Every call fails with `StorageUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Reads and removal work, writes fail with `StorageUnavailable`.
    pub fn quota_full(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            quota_full: true,
            ..Self::default()
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            return Err(ProgressError::StorageUnavailable(
                "memory slot disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl PersistencePort for MemoryPersistence {
    fn load(&self) -> Result<Option<ProgressMap>> {
        self.check()?;
        self.raw.as_deref().map(ProgressMap::from_json).transpose()
    }

    fn save(&mut self, progress: &ProgressMap) -> Result<()> {
        self.check()?;
        if self.quota_full {
            return Err(ProgressError::StorageUnavailable("quota exceeded".to_string()));
        }
        self.raw = Some(progress.to_json()?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.check()?;
        self.raw = None;
        Ok(())
    }
}

// --- Browser localStorage -------------------------------------------------------

/// `window.localStorage`, one key. Only usable on wasm32 inside a browser.
pub struct LocalStoragePersistence {
    storage: Storage,
    key: String,
}

impl LocalStoragePersistence {
    pub fn open(key: &str) -> Result<Self> {
        let win = window().ok_or_else(|| unavailable("no window"))?;
        let storage = win
            .local_storage()
            .map_err(|e| unavailable(&js_reason(&e)))?
            .ok_or_else(|| unavailable("localStorage disabled"))?;
        debug!(key, "opened localStorage");
        Ok(Self {
            storage,
            key: key.to_string(),
        })
    }
}

impl PersistencePort for LocalStoragePersistence {
    fn load(&self) -> Result<Option<ProgressMap>> {
        let raw = self
            .storage
            .get_item(&self.key)
            .map_err(|e| unavailable(&js_reason(&e)))?;
        raw.as_deref().map(ProgressMap::from_json).transpose()
    }

    fn save(&mut self, progress: &ProgressMap) -> Result<()> {
        let json = progress.to_json()?;
        // quota errors land here
        self.storage
            .set_item(&self.key, &json)
            .map_err(|e| unavailable(&js_reason(&e)))
    }

    fn clear(&mut self) -> Result<()> {
        self.storage
            .remove_item(&self.key)
            .map_err(|e| unavailable(&js_reason(&e)))
    }
}

fn unavailable(reason: &str) -> ProgressError {
    ProgressError::StorageUnavailable(reason.to_string())
}

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    #[test]
    fn memory_round_trip_goes_through_json() {
        let mut port = MemoryPersistence::new();
        assert!(port.load().unwrap().is_none());
        let map = ProgressMap::from_pairs([(Category::Html, [1, 2, 3])]);
        port.save(&map).unwrap();
        assert_eq!(port.raw(), Some(r#"{"html":[1,2,3]}"#));
        assert_eq!(port.load().unwrap(), Some(map));
        port.clear().unwrap();
        assert!(port.raw().is_none());
    }

    #[test]
    fn unavailable_memory_fails_every_call() {
        let mut port = MemoryPersistence::unavailable();
        assert!(matches!(port.load(), Err(ProgressError::StorageUnavailable(_))));
        assert!(port.save(&ProgressMap::default_seed()).is_err());
        assert!(port.clear().is_err());
    }

    #[test]
    fn full_quota_only_fails_saves() {
        let mut port = MemoryPersistence::quota_full(r#"{"css":[1,2]}"#);
        assert_eq!(
            port.load().unwrap(),
            Some(ProgressMap::from_pairs([(Category::Css, [1, 2])]))
        );
        assert!(matches!(
            port.save(&ProgressMap::default_seed()),
            Err(ProgressError::StorageUnavailable(_))
        ));
        assert_eq!(port.raw(), Some(r#"{"css":[1,2]}"#));
        port.clear().unwrap();
        assert!(port.raw().is_none());
    }

    #[test]
    fn boxed_port_delegates() {
        let mut port: Box<dyn PersistencePort> = Box::new(MemoryPersistence::new());
        port.save(&ProgressMap::default_seed()).unwrap();
        assert_eq!(port.load().unwrap(), Some(ProgressMap::default_seed()));
    }
}
