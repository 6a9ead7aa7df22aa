//! Time Source Abstraction
//!
//! This module provides the `TimeSource` trait which abstracts the clock
//! used to stamp records and compute the retention cutoff.
//!
//! ## Common Implementations
//!
//! - `SystemTime`: Wall clock time (may jump due to NTP)
//! - `FixedTime`: Controllable time for testing

use crate::time::Timestamp;

/// Source of time for the system
///
/// The retention horizon is only meaningful against a wall clock. A
/// monotonic source still works but pruning then restarts at every boot.
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}
