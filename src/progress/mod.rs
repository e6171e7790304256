//! Progress ledger: which levels of which category are completed.
//!
//! [`ProgressMap`] is the value type (category -> sorted set of level ids) and
//! [`ProgressStore`] is the single owner that reads and writes it through a
//! [`PersistencePort`]. The store trusts its caller: it never checks that a
//! level was unlocked before recording it, that is the gate's job
//! (see [`crate::gate`]).
//!
//! Failure policy:
//! - malformed persisted value: discarded, default seed written back
//! - storage unavailable: the store keeps working in memory for the rest of
//!   the session and stops writing to the port; `reset` still removes the
//!   saved value

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::config::StoreConfig;
use crate::error::{ProgressError, Result};

mod persistence;

pub use persistence::{LocalStoragePersistence, MemoryPersistence, PersistencePort};

// --- Value type ---------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressMap {
    levels: BTreeMap<Category, BTreeSet<u32>>,
}

impl ProgressMap {
    /// First-run state: every category already has level 1 completed.
    pub fn default_seed() -> Self {
        let mut map = Self::default();
        for c in Category::ALL {
            map.insert(c, 1);
        }
        map
    }

    /// Build from explicit `(category, levels)` pairs. Level 0 is skipped.
    pub fn from_pairs<I, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, L)>,
        L: IntoIterator<Item = u32>,
    {
        let mut map = Self::default();
        for (c, levels) in pairs {
            let set = map.levels.entry(c).or_default();
            set.extend(levels.into_iter().filter(|&l| l > 0));
        }
        map
    }

    pub fn completed(&self, category: Category) -> Option<&BTreeSet<u32>> {
        self.levels.get(&category)
    }

    pub fn contains(&self, category: Category, level: u32) -> bool {
        self.levels
            .get(&category)
            .is_some_and(|set| set.contains(&level))
    }

    pub fn completed_count(&self, category: Category) -> u32 {
        self.levels.get(&category).map_or(0, |set| set.len() as u32)
    }

    pub fn total_completed(&self) -> u32 {
        self.levels.values().map(|set| set.len() as u32).sum()
    }

    /// Returns true when the id was not already present.
    pub fn insert(&mut self, category: Category, level: u32) -> bool {
        self.levels.entry(category).or_default().insert(level)
    }

    /// Wire format: `{"html":[1,2],"css":[1]}` with ascending arrays.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Lenient decode. Unknown category keys and ids outside `1..=u32::MAX`
    /// are dropped; anything that is not an object of integer arrays is
    /// [`ProgressError::Corrupt`].
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: BTreeMap<String, Vec<i64>> =
            serde_json::from_str(json).map_err(|e| ProgressError::Corrupt(e.to_string()))?;
        let mut map = Self::default();
        for (key, ids) in wire {
            let Ok(category) = key.parse::<Category>() else {
                debug!(key = %key, "dropping unknown category from persisted progress");
                continue;
            };
            let set = map.levels.entry(category).or_default();
            for id in ids {
                match u32::try_from(id) {
                    Ok(level) if level > 0 => {
                        set.insert(level);
                    }
                    _ => debug!(%category, id, "dropping invalid level id"),
                }
            }
        }
        Ok(map)
    }
}

impl Serialize for ProgressMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire: BTreeMap<&'static str, Vec<u32>> = self
            .levels
            .iter()
            .map(|(c, set)| (c.key(), set.iter().copied().collect()))
            .collect();
        wire.serialize(serializer)
    }
}

// --- Store --------------------------------------------------------------------

pub struct ProgressStore<P: PersistencePort> {
    port: P,
    config: StoreConfig,
    /// Last snapshot handed out. Sole copy once `degraded` is set.
    session: ProgressMap,
    degraded: bool,
}

impl<P: PersistencePort> ProgressStore<P> {
    pub fn new(port: P) -> Self {
        Self::with_config(port, StoreConfig::default())
    }

    pub fn with_config(port: P, config: StoreConfig) -> Self {
        Self {
            port,
            config,
            session: ProgressMap::default_seed(),
            degraded: false,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// False once the port failed and the store fell back to session memory.
    pub fn is_persistent(&self) -> bool {
        !self.degraded
    }

    /// Current mapping. Never fails: missing or malformed data yields (and
    /// persists) the default seed.
    pub fn read(&mut self) -> ProgressMap {
        if self.degraded {
            return self.session.clone();
        }
        match self.port.load() {
            Ok(Some(map)) => {
                debug!(levels = map.total_completed(), "loaded progress");
                self.session = map.clone();
                map
            }
            Ok(None) => {
                debug!("no saved progress, writing default seed");
                self.reseed()
            }
            Err(ProgressError::StorageUnavailable(reason)) => {
                self.degrade(&reason);
                self.session.clone()
            }
            Err(err) => {
                warn!(error = %err, "discarding saved progress");
                self.reseed()
            }
        }
    }

    /// Idempotent insert of `level` into `category`, then a full write-back.
    pub fn mark_complete(&mut self, category: Category, level: u32) -> Result<ProgressMap> {
        if level == 0 {
            return Err(ProgressError::InvalidLevel(level));
        }
        let mut map = self.read();
        if map.insert(category, level) {
            info!(%category, level, "level completed");
        } else {
            debug!(%category, level, "level already completed");
        }
        self.session = map.clone();
        self.persist();
        Ok(map)
    }

    /// Forget everything. The next [`read`](Self::read) regenerates the seed.
    /// Removal is attempted even after falling back to memory: a full quota
    /// blocks writes but not `removeItem`.
    pub fn reset(&mut self) {
        if let Err(err) = self.port.clear() {
            warn!(error = %err, "could not clear saved progress");
            self.degrade(&err.to_string());
        }
        self.session = ProgressMap::default_seed();
        info!("progress reset");
    }

    pub fn completed_count(&mut self, category: Category) -> u32 {
        self.read().completed_count(category)
    }

    /// Flat points per completed level; difficulty is not weighted.
    pub fn total_score(&mut self) -> u32 {
        score_for(&self.read(), self.config.points_per_level)
    }

    fn reseed(&mut self) -> ProgressMap {
        self.session = ProgressMap::default_seed();
        self.persist();
        self.session.clone()
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }
        if let Err(err) = self.port.save(&self.session) {
            self.degrade(&err.to_string());
        }
    }

    fn degrade(&mut self, reason: &str) {
        if !self.degraded {
            warn!(reason, "progress storage unavailable, keeping progress in memory for this session");
        }
        self.degraded = true;
    }
}

/// Sum of completed levels across categories times `points_per_level`.
pub fn score_for(progress: &ProgressMap, points_per_level: u32) -> u32 {
    progress.total_completed().saturating_mul(points_per_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ProgressStore<MemoryPersistence> {
        ProgressStore::new(MemoryPersistence::new())
    }

    #[test]
    fn first_read_persists_default_seed() {
        let mut s = store();
        let map = s.read();
        assert_eq!(map, ProgressMap::default_seed());
        for c in Category::ALL {
            assert!(map.contains(c, 1));
        }
        let raw = s.port().raw().unwrap();
        assert_eq!(ProgressMap::from_json(raw).unwrap(), map);
    }

    #[test]
    fn mark_complete_is_idempotent() {
        let mut s = store();
        let once = s.mark_complete(Category::Css, 2).unwrap();
        let twice = s.mark_complete(Category::Css, 2).unwrap();
        assert_eq!(once, twice);
        assert_eq!(s.completed_count(Category::Css), 2);
    }

    #[test]
    fn mark_complete_rejects_level_zero() {
        let mut s = store();
        assert!(matches!(
            s.mark_complete(Category::Html, 0),
            Err(ProgressError::InvalidLevel(0))
        ));
        assert_eq!(s.read(), ProgressMap::default_seed());
    }

    #[test]
    fn malformed_value_falls_back_to_seed() {
        let mut s = ProgressStore::new(MemoryPersistence::with_raw("{not json"));
        assert_eq!(s.read(), ProgressMap::default_seed());
        // the bad value was replaced
        assert_eq!(
            ProgressMap::from_json(s.port().raw().unwrap()).unwrap(),
            ProgressMap::default_seed()
        );
        assert!(s.is_persistent());
    }

    #[test]
    fn non_object_json_is_corrupt() {
        for raw in ["null", "[1,2]", r#"{"html":"1"}"#, r#"{"html":[1.5]}"#] {
            assert!(
                matches!(ProgressMap::from_json(raw), Err(ProgressError::Corrupt(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn decode_drops_unknown_keys_and_bad_ids() {
        let map = ProgressMap::from_json(r#"{"html":[3,1,-2,0],"rust":[1]}"#).unwrap();
        assert_eq!(map, ProgressMap::from_pairs([(Category::Html, vec![1, 3])]));
    }

    #[test]
    fn encode_sorts_ids() {
        let mut map = ProgressMap::default();
        map.insert(Category::Python, 7);
        map.insert(Category::Python, 2);
        map.insert(Category::Python, 4);
        assert_eq!(map.to_json().unwrap(), r#"{"python":[2,4,7]}"#);
    }

    #[test]
    fn unavailable_storage_degrades_to_memory() {
        let mut s = ProgressStore::new(MemoryPersistence::unavailable());
        assert_eq!(s.read(), ProgressMap::default_seed());
        assert!(!s.is_persistent());
        let map = s.mark_complete(Category::Html, 2).unwrap();
        assert!(map.contains(Category::Html, 2));
        assert_eq!(s.read(), map);
        s.reset();
        assert_eq!(s.read(), ProgressMap::default_seed());
    }

    #[test]
    fn reset_clears_storage_after_failed_save() {
        let mut s = ProgressStore::new(MemoryPersistence::quota_full(r#"{"html":[1,2,3]}"#));
        s.mark_complete(Category::Html, 4).unwrap();
        assert!(!s.is_persistent());
        assert_eq!(s.port().raw(), Some(r#"{"html":[1,2,3]}"#));

        s.reset();
        assert!(s.port().raw().is_none());
        assert_eq!(s.read(), ProgressMap::default_seed());
    }

    #[test]
    fn score_uses_configured_points() {
        let cfg = StoreConfig {
            points_per_level: 10,
            ..StoreConfig::default()
        };
        let mut s = ProgressStore::with_config(MemoryPersistence::new(), cfg);
        s.mark_complete(Category::Cpp, 2).unwrap();
        assert_eq!(s.total_score(), 60);
    }
}
