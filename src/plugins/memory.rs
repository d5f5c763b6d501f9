//! In-memory karma store.
//!
//! Backs `--ephemeral` runs and unit tests. Records are kept in insertion
//! order, which is also the tie-break for rankings.

use crate::core::error::KarmaError;
use crate::core::store::{Delta, KarmaRecord, KarmaStore, Ranking, normalize_key};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryKarmaStore {
    records: Mutex<Vec<KarmaRecord>>,
}

impl MemoryKarmaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with explicit counters, in the given order.
    pub fn with_records(records: impl IntoIterator<Item = (String, u64, u64)>) -> Self {
        let records = records
            .into_iter()
            .map(|(name, positive, negative)| KarmaRecord {
                name: normalize_key(&name),
                positive_count: positive,
                negative_count: negative,
            })
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<KarmaRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KarmaStore for MemoryKarmaStore {
    fn ensure(&self, name: &str) -> Result<(), KarmaError> {
        let key = normalize_key(name);
        let mut records = self.lock();
        if !records.iter().any(|r| r.name == key) {
            records.push(KarmaRecord::new(&key));
        }
        Ok(())
    }

    fn increment(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError> {
        let key = normalize_key(name);
        let mut records = self.lock();
        let record = records
            .iter_mut()
            .find(|r| r.name == key)
            .ok_or(KarmaError::NotFound(key))?;
        record.apply(delta);
        Ok(record.clone())
    }

    fn bump(&self, name: &str, delta: Delta) -> Result<KarmaRecord, KarmaError> {
        let key = normalize_key(name);
        let mut records = self.lock();
        let idx = match records.iter().position(|r| r.name == key) {
            Some(idx) => idx,
            None => {
                records.push(KarmaRecord::new(&key));
                records.len() - 1
            }
        };
        records[idx].apply(delta);
        Ok(records[idx].clone())
    }

    fn get(&self, name: &str) -> Result<Option<KarmaRecord>, KarmaError> {
        let key = normalize_key(name);
        Ok(self.lock().iter().find(|r| r.name == key).cloned())
    }

    fn rank(&self, by: Ranking) -> Result<Vec<(String, i64)>, KarmaError> {
        let mut ranked: Vec<(String, i64)> = self
            .lock()
            .iter()
            .map(|r| (r.name.clone(), by.score(r)))
            .collect();
        // sort_by is stable: equal scores keep insertion order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(ranked)
    }
}
