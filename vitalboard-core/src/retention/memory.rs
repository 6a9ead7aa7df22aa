//! In-memory retention store

use alloc::vec::Vec;

use crate::errors::StoreError;
use crate::record::SensorRecord;
use crate::time::Timestamp;
use crate::traits::RetentionStore;

/// `Vec`-backed store, insertion ordered
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<SensorRecord>,
    limit: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects inserts once it holds `limit` records
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Stored records, oldest insert first
    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RetentionStore for MemoryStore {
    fn insert(&mut self, record: &SensorRecord) -> Result<(), StoreError> {
        if self.limit.is_some_and(|limit| self.records.len() >= limit) {
            return Err(StoreError::Rejected { reason: "store full" });
        }
        self.records.push(*record);
        Ok(())
    }

    fn delete_older_than(&mut self, cutoff: Timestamp) -> Result<usize, StoreError> {
        let before = self.records.len();
        self.records.retain(|r| r.timestamp >= cutoff);
        Ok(before - self.records.len())
    }

    fn latest(&self) -> Result<Option<SensorRecord>, StoreError> {
        Ok(self.records.iter().max_by_key(|r| r.timestamp).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_by_timestamp_not_insert_order() {
        let mut store = MemoryStore::new();
        store.insert(&SensorRecord::new(300)).unwrap();
        store.insert(&SensorRecord::new(100)).unwrap();

        assert_eq!(store.latest().unwrap().map(|r| r.timestamp), Some(300));
    }

    #[test]
    fn empty_store_has_no_latest() {
        assert_eq!(MemoryStore::new().latest(), Ok(None));
    }

    #[test]
    fn delete_keeps_boundary() {
        let mut store = MemoryStore::new();
        for ts in [10, 20, 30] {
            store.insert(&SensorRecord::new(ts)).unwrap();
        }
        assert_eq!(store.delete_older_than(20), Ok(1));
        assert_eq!(store.len(), 2);
    }
}
