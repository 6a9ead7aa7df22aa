//! Retention Store Abstraction
//!
//! The poll loop hands every finished [`SensorRecord`] to a store and then
//! asks it to forget everything older than the retention horizon. The
//! store only has to support three operations, so a SQL table, a JSON
//! lines file or a `Vec` all qualify.
//!
//! ## Boundary Semantics
//!
//! `delete_older_than(cutoff)` removes records with `timestamp < cutoff`.
//! A record stamped exactly at the cutoff is kept.

use crate::errors::StoreError;
use crate::record::SensorRecord;
use crate::time::Timestamp;

/// Append + prune persistence for poll records
pub trait RetentionStore {
    /// Append one record
    fn insert(&mut self, record: &SensorRecord) -> Result<(), StoreError>;

    /// Remove every record strictly older than `cutoff`, returning how many
    fn delete_older_than(&mut self, cutoff: Timestamp) -> Result<usize, StoreError>;

    /// Newest record by timestamp, if any
    fn latest(&self) -> Result<Option<SensorRecord>, StoreError>;
}

impl<T: RetentionStore + ?Sized> RetentionStore for &mut T {
    fn insert(&mut self, record: &SensorRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn delete_older_than(&mut self, cutoff: Timestamp) -> Result<usize, StoreError> {
        (**self).delete_older_than(cutoff)
    }

    fn latest(&self) -> Result<Option<SensorRecord>, StoreError> {
        (**self).latest()
    }
}
