//! Device Decoders and Drivers
//!
//! ## Overview
//!
//! One module per sensor model on the board. Each module is split in two
//! layers:
//!
//! 1. **Pure decode**: `decode(&[u8]) -> Result<Reading, DecodeError>`.
//!    No I/O, no state: register bytes in, physical values out. This is
//!    where the status-bit checks, CRC validation, sign extension and
//!    fixed-point scaling live, and it is what the unit tests hammer.
//!
//! 2. **Driver**: a small struct holding the device address that knows the
//!    acquisition sequence (which registers, in what order, with which
//!    delays) and calls `decode` on the bytes it fetched. Drivers borrow the
//!    bus per call; they never own it.
//!
//! ## Board Inventory
//!
//! | Sensor   | Quantity                         | Addr | Integrity check        |
//! |----------|----------------------------------|------|------------------------|
//! | DHT20    | temperature °C, humidity %RH     | 0x38 | busy bit, CRC-8        |
//! | AGS10    | TVOC ppm                         | 0x1A | update bit, CRC-8      |
//! | BH1750   | illuminance lux                  | 0x23 | none                   |
//! | BMP581   | temperature °C, pressure Pa      | 0x46 | NVM/POR status at init |
//! | MPU6500  | accel g, gyro dps, temperature   | 0x68 | none                   |
//! | MAX30102 | red/IR PPG FIFO, die temperature | 0x57 | FIFO pointers          |
//!
//! ## Fault Isolation
//!
//! Every driver returns `Result<Reading, SensorFault>`. A fault names the
//! sensor and is confined to that sensor's fields for the cycle; see
//! [`crate::board::SensorBoard::poll`].

use core::fmt;

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::errors::SensorResult;
use crate::traits::BusTransport;

pub mod ags10;
pub mod bh1750;
pub mod bmp581;
pub mod dht20;
pub mod max30102;
pub mod mpu6500;

pub use ags10::{Ags10, Ags10Reading};
pub use bh1750::{Bh1750, Bh1750Reading};
pub use bmp581::{Bmp581, Bmp581Reading};
pub use dht20::{Dht20, Dht20Reading};
pub use max30102::{Max30102, Max30102Reading};
pub use mpu6500::{Mpu6500, Mpu6500Reading};

/// Number of sensors on the board
pub const SENSOR_COUNT: usize = 6;

/// Identifies a sensor model on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorId {
    /// Humidity/temperature sensor
    Dht20,
    /// TVOC gas sensor
    Ags10,
    /// Ambient light sensor
    Bh1750,
    /// Barometric pressure/temperature sensor
    Bmp581,
    /// 6-axis inertial sensor
    Mpu6500,
    /// Pulse oximetry (PPG) sensor
    Max30102,
}

impl SensorId {
    /// All sensors in poll order
    pub const ALL: [SensorId; SENSOR_COUNT] = [
        SensorId::Dht20,
        SensorId::Ags10,
        SensorId::Bh1750,
        SensorId::Bmp581,
        SensorId::Mpu6500,
        SensorId::Max30102,
    ];

    /// Model name as printed on the part
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dht20 => "DHT20",
            Self::Ags10 => "AGS10",
            Self::Bh1750 => "BH1750FVI",
            Self::Bmp581 => "BMP581",
            Self::Mpu6500 => "MPU6500",
            Self::Max30102 => "MAX30102",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sensor that can be configured and read over a borrowed bus
pub trait Sensor {
    /// Typed physical reading produced per acquisition
    type Reading;

    /// Which sensor this driver talks to
    const ID: SensorId;

    /// Apply the power-on register configuration
    ///
    /// Sensors that need no configuration keep the default.
    fn configure<B, D>(&mut self, _bus: &mut B, _delay: &mut D) -> SensorResult<()>
    where
        B: BusTransport,
        D: DelayNs,
    {
        Ok(())
    }

    /// Run one full acquisition and decode it
    fn read<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<Self::Reading>
    where
        B: BusTransport,
        D: DelayNs;
}
