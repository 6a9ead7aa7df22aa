//! Error Types for Sensor Acquisition and Persistence
//!
//! ## Design Philosophy
//!
//! Errors follow the same rules as the rest of the core:
//!
//! 1. **Small and Copy**: every error is a handful of bytes and implements
//!    `Copy`, so a fault can be logged, stored in a record and returned
//!    without allocation.
//!
//! 2. **No Heap Allocation**: reasons are `&'static str`, never `String`.
//!
//! 3. **Isolation First**: a fault always names the sensor it came from.
//!    The board orchestrator turns a [`SensorFault`] into "unavailable"
//!    fields for that sensor only and keeps polling the others.
//!
//! ## Error Categories
//!
//! ### Decode Failures (pure, no I/O)
//! - `MalformedTransfer`: payload shorter than the register layout needs
//! - `ChecksumMismatch`: CRC-8 over the payload disagrees with the device
//! - `DeviceBusy`: measurement still in progress
//! - `NotReady`: stale data, warming up, or uninitialised calibration
//!
//! ### Transport Failures
//! - `Transport`: the bus transaction itself failed (NACK, arbitration loss,
//!   character device error)
//!
//! ### Vitals Rejections
//! - `VitalsError`: why a PPG window produced no heart rate/SpO2 estimate
//!
//! ### Persistence Failures
//! - `StoreError`: the retention store could not insert, prune or read
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use vitalboard_core::errors::{SensorError, SensorFault};
//!
//! fn report(fault: SensorFault) {
//!     match fault.error {
//!         SensorError::ChecksumMismatch { .. } => {
//!             // Corrupted transfer - next cycle is the retry
//!         }
//!         SensorError::Transport(_) => {
//!             // Device missing or bus wedged
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use thiserror_no_std::Error;

use crate::sensors::SensorId;

/// Result type for pure register decoders
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for full sensor acquisitions
pub type SensorResult<T> = Result<T, SensorFault>;

/// Failures detected while turning raw register bytes into physical values
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Byte sequence shorter than the layout requires
    #[error("Malformed transfer: need {required} bytes, have {available}")]
    MalformedTransfer {
        /// Bytes the layout needs
        required: usize,
        /// Bytes actually received
        available: usize,
    },

    /// CRC-8 over the payload does not match the transmitted checksum
    #[error("Checksum mismatch: computed {computed:#04x}, expected {expected:#04x}")]
    ChecksumMismatch {
        /// Checksum computed locally
        computed: u8,
        /// Checksum byte sent by the device
        expected: u8,
    },

    /// Device reports a measurement still in progress
    #[error("Device busy")]
    DeviceBusy,

    /// Device data is stale or the device is not initialised
    #[error("Device not ready: {reason}")]
    NotReady {
        /// What the status bits said
        reason: &'static str,
    },
}

/// Bus transport failure
///
/// The underlying HAL error types differ per platform, so only the kind of
/// failure is kept.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Address or data byte not acknowledged
    #[error("No acknowledge from device")]
    NoAcknowledge,

    /// Bus arbitration lost to another controller
    #[error("Arbitration lost")]
    ArbitrationLoss,

    /// Any other I/O failure reported by the platform
    #[error("Bus I/O failure")]
    Other,
}

/// Everything that can go wrong while acquiring one sensor
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Byte layout too short
    #[error("Malformed transfer: need {required} bytes, have {available}")]
    MalformedTransfer {
        /// Bytes the layout needs
        required: usize,
        /// Bytes actually received
        available: usize,
    },

    /// CRC-8 mismatch
    #[error("Checksum mismatch: computed {computed:#04x}, expected {expected:#04x}")]
    ChecksumMismatch {
        /// Checksum computed locally
        computed: u8,
        /// Checksum byte sent by the device
        expected: u8,
    },

    /// Busy flag set
    #[error("Device busy")]
    DeviceBusy,

    /// Stale, warming up or uninitialised
    #[error("Device not ready: {reason}")]
    NotReady {
        /// What the status bits said
        reason: &'static str,
    },

    /// Bus I/O failure
    #[error("Transport error: {0}")]
    Transport(BusError),
}

impl From<DecodeError> for SensorError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MalformedTransfer { required, available } => {
                Self::MalformedTransfer { required, available }
            }
            DecodeError::ChecksumMismatch { computed, expected } => {
                Self::ChecksumMismatch { computed, expected }
            }
            DecodeError::DeviceBusy => Self::DeviceBusy,
            DecodeError::NotReady { reason } => Self::NotReady { reason },
        }
    }
}

impl From<BusError> for SensorError {
    fn from(err: BusError) -> Self {
        Self::Transport(err)
    }
}

/// A sensor error tagged with the sensor that produced it
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{sensor} fault: {error}")]
pub struct SensorFault {
    /// Which sensor failed
    pub sensor: SensorId,
    /// Why it failed
    pub error: SensorError,
}

impl SensorFault {
    /// Tag an error with its sensor
    pub fn new(sensor: SensorId, error: impl Into<SensorError>) -> Self {
        Self {
            sensor,
            error: error.into(),
        }
    }
}

/// Retention store failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying file or database I/O failed
    #[error("Store I/O failure during {operation}")]
    Io {
        /// Operation that failed
        operation: &'static str,
    },

    /// A stored row could not be encoded or decoded
    #[error("Store row could not be (de)serialised")]
    Serialization,

    /// The store refused the row (full, read-only)
    #[error("Store rejected row: {reason}")]
    Rejected {
        /// Why the row was refused
        reason: &'static str,
    },
}

/// Reasons the vitals estimator rejects a window
///
/// Every variant maps to the invalid sentinel for both heart rate and
/// SpO2; the variant only says why, for logging.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum VitalsError {
    /// Window shorter than the filter's settling length
    #[error("Insufficient samples: need {required}, have {available}")]
    InsufficientSamples {
        /// Samples the filter needs
        required: usize,
        /// Samples in the window
        available: usize,
    },

    /// Fewer than two pulse peaks, or no valleys at all
    #[error("No pulse detected ({peaks} peaks, {valleys} valleys)")]
    NoPulse {
        /// Peaks found
        peaks: usize,
        /// Valleys found
        valleys: usize,
    },

    /// Peak-to-valley gap outside the plausible band
    #[error("Pulse amplitude {gap:.1} outside plausible range")]
    ImplausibleAmplitude {
        /// Mean peak minus mean valley
        gap: f64,
    },

    /// A channel is flat or zero, so the ratio of ratios is undefined
    #[error("Degenerate optical channel")]
    DegenerateChannel,

    /// SpO2 below the calibration floor
    #[error("SpO2 {spo2:.1}% below calibration floor")]
    Spo2BelowFloor {
        /// The rejected estimate
        spo2: f64,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for DecodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MalformedTransfer { required, available } =>
                defmt::write!(fmt, "Need {} bytes, have {}", required, available),
            Self::ChecksumMismatch { computed, expected } =>
                defmt::write!(fmt, "CRC {=u8:#x} != {=u8:#x}", computed, expected),
            Self::DeviceBusy =>
                defmt::write!(fmt, "Device busy"),
            Self::NotReady { reason } =>
                defmt::write!(fmt, "Not ready: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorFault {
    fn format(&self, fmt: defmt::Formatter) {
        match self.error {
            SensorError::MalformedTransfer { required, available } =>
                defmt::write!(fmt, "{}: need {} bytes, have {}", self.sensor.name(), required, available),
            SensorError::ChecksumMismatch { computed, expected } =>
                defmt::write!(fmt, "{}: CRC {=u8:#x} != {=u8:#x}", self.sensor.name(), computed, expected),
            SensorError::DeviceBusy =>
                defmt::write!(fmt, "{}: busy", self.sensor.name()),
            SensorError::NotReady { reason } =>
                defmt::write!(fmt, "{}: not ready ({})", self.sensor.name(), reason),
            SensorError::Transport(_) =>
                defmt::write!(fmt, "{}: transport error", self.sensor.name()),
        }
    }
}
