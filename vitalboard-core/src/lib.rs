//! Sensor board core for VitalBoard
//!
//! Decodes the register payloads of six I2C sensors, estimates heart rate
//! and SpO2 from a rolling PPG window, and persists one record per poll
//! cycle under a rolling retention horizon.
//!
//! Key constraints:
//! - `no_std` + `alloc` capable; drivers only need an `embedded-hal` bus
//! - No ambient hardware handles: bus, delay, clock and store are passed in
//! - A faulty sensor never takes its siblings down with it
//!
//! ```no_run
//! use vitalboard_core::{BoardConfig, SensorBoard, MemoryStore, RetentionPolicy, RetentionWriter};
//! # fn run<B: vitalboard_core::BusTransport, D: embedded_hal::delay::DelayNs>(mut bus: B, mut delay: D) {
//! let mut board = SensorBoard::new(&BoardConfig::default());
//! let mut writer = RetentionWriter::new(MemoryStore::new(), RetentionPolicy::default());
//!
//! board.configure(&mut bus, &mut delay);
//! let outcome = board.poll(&mut bus, &mut delay, 1_700_000_000_000);
//! if let Err(_e) = writer.commit(&outcome.record) {
//!     // Logged by the caller; the loop carries on
//! }
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
#[allow(unused_macros)]
macro_rules! log_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}

#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}

pub mod board;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod constants;
pub mod crc;
pub mod errors;
pub mod record;
pub mod retention;
pub mod sensors;
pub mod time;
pub mod traits;
pub mod vitals;

// Public API
pub use board::{PollOutcome, SensorBoard};
pub use buffer::{PpgBuffer, PpgSample, PpgWindow};
pub use config::{BoardConfig, SensorAddresses};
pub use errors::{BusError, DecodeError, SensorError, SensorFault, StoreError, VitalsError};
pub use record::{FlatRecord, SensorRecord};
pub use retention::{MemoryStore, RetentionPolicy, RetentionWriter};
#[cfg(feature = "store-file")]
pub use retention::JsonLinesStore;
pub use sensors::{Sensor, SensorId};
pub use time::{FixedTime, TimeSource, Timestamp};
#[cfg(feature = "std")]
pub use time::SystemTime;
pub use traits::{BusTransport, HalBus, RetentionStore};
pub use vitals::{EstimatorConfig, VitalsEstimate, VitalsEstimator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
