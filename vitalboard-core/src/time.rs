//! Time management for the polling loop
//!
//! Records carry wall-clock timestamps so the retention horizon means the
//! same thing across restarts:
//! - System clock (Linux host, requires `std`)
//! - Fixed clock (tests, replay)

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock stopped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(42);
        assert_eq!(time.now(), 42);
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_time_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemTime.now() > 1_577_836_800_000);
    }
}
