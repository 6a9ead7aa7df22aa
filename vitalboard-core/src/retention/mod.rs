//! Rolling Retention
//!
//! Records are kept for a fixed horizon (7 days by default). Pruning is a
//! side effect of writing: every insert is followed immediately by a delete
//! of everything older than `record.timestamp − horizon`, so the store never
//! needs a separate cleanup schedule.
//!
//! ```text
//!            cutoff = T − 7 d                       T
//!  ──────────────┼──────────────────────────────────┼──►
//!   deleted      │ kept (a record exactly at the    │ just inserted
//!                │ cutoff is kept)                  │
//! ```
//!
//! ## Stores
//!
//! - [`MemoryStore`]: `Vec`-backed, for tests and targets without a file system
//! - [`JsonLinesStore`]: hourly JSON-lines segments under a directory, pruned by
//!   unlinking whole segments and raising a watermark (`store-file` feature)

use serde::{Deserialize, Serialize};

use crate::constants::time::{DEFAULT_RETENTION_DAYS, MS_PER_DAY};
use crate::errors::StoreError;
use crate::record::SensorRecord;
use crate::time::Timestamp;
use crate::traits::RetentionStore;

pub mod memory;
pub use memory::MemoryStore;

#[cfg(feature = "store-file")]
pub mod file;
#[cfg(feature = "store-file")]
pub use file::{JsonLinesStore, SegmentStats};

/// How long records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Age beyond which records are deleted (milliseconds)
    pub horizon_ms: u64,
}

impl RetentionPolicy {
    /// Keep records for `days` days
    pub const fn from_days(days: u32) -> Self {
        Self {
            horizon_ms: days as u64 * MS_PER_DAY,
        }
    }

    /// Oldest timestamp still retained relative to `now`
    pub const fn cutoff(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.horizon_ms)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from_days(DEFAULT_RETENTION_DAYS)
    }
}

/// Counters kept by a [`RetentionWriter`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetentionStats {
    /// Records inserted
    pub inserted: u64,
    /// Records pruned
    pub pruned: u64,
    /// Failed insert or prune calls
    pub failures: u64,
}

/// Insert-then-prune front end for a [`RetentionStore`]
#[derive(Debug)]
pub struct RetentionWriter<S> {
    store: S,
    policy: RetentionPolicy,
    stats: RetentionStats,
}

impl<S: RetentionStore> RetentionWriter<S> {
    /// Wrap `store` with `policy`
    pub fn new(store: S, policy: RetentionPolicy) -> Self {
        Self {
            store,
            policy,
            stats: RetentionStats::default(),
        }
    }

    /// Insert `record`, then prune relative to its timestamp
    ///
    /// Returns the number of records pruned. If the insert fails the prune
    /// is skipped; the next cycle catches up.
    pub fn commit(&mut self, record: &SensorRecord) -> Result<usize, StoreError> {
        if let Err(e) = self.store.insert(record) {
            self.stats.failures += 1;
            return Err(e);
        }
        self.stats.inserted += 1;

        let cutoff = self.policy.cutoff(record.timestamp);
        match self.store.delete_older_than(cutoff) {
            Ok(pruned) => {
                self.stats.pruned += pruned as u64;
                Ok(pruned)
            }
            Err(e) => {
                self.stats.failures += 1;
                Err(e)
            }
        }
    }

    /// Active policy
    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Counters since construction
    pub fn stats(&self) -> &RetentionStats {
        &self.stats
    }

    /// Borrow the store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back
    pub fn into_inner(self) -> S {
        self.store
    }
}
