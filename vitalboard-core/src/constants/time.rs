//! Time-Related Constants
//!
//! Unit conversions and default intervals used by the poll loop and the
//! retention policy. All timestamps in the crate are milliseconds.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Hours per day.
pub const HOURS_PER_DAY: u64 = 24;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE * MINUTES_PER_HOUR;

/// Milliseconds per day.
pub const MS_PER_DAY: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE * MINUTES_PER_HOUR * HOURS_PER_DAY;

// ===== INTERVALS =====

/// Default pause between poll cycles (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default retention horizon (days).
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Span of one file segment in the JSON-lines store (milliseconds).
pub const STORE_SEGMENT_MS: u64 = MS_PER_HOUR;
