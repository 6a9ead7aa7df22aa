//! Board Configuration
//!
//! Everything the orchestrator needs to know about the physical board is
//! passed in explicitly through [`BoardConfig`]. All fields have defaults
//! matching the reference board, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "addresses": { "dht20": 56, "ags10": 26, "bh1750": 35,
//!                  "bmp581": 70, "mpu6500": 104, "max30102": 87 },
//!   "window_capacity": 300,
//!   "estimator": { "cutoff_hz": 3.0, "spo2_floor": 90.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_WINDOW_CAPACITY;
use crate::sensors::{ags10, bh1750, bmp581, dht20, max30102, mpu6500};
use crate::vitals::EstimatorConfig;

/// 7-bit I2C address of every sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorAddresses {
    /// Humidity/temperature
    pub dht20: u8,
    /// TVOC
    pub ags10: u8,
    /// Ambient light
    pub bh1750: u8,
    /// Pressure
    pub bmp581: u8,
    /// Inertial
    pub mpu6500: u8,
    /// PPG
    pub max30102: u8,
}

impl Default for SensorAddresses {
    fn default() -> Self {
        Self {
            dht20: dht20::ADDRESS,
            ags10: ags10::ADDRESS,
            bh1750: bh1750::ADDRESS,
            bmp581: bmp581::ADDRESS,
            mpu6500: mpu6500::ADDRESS,
            max30102: max30102::ADDRESS,
        }
    }
}

/// Board layout and vitals tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Sensor addresses
    pub addresses: SensorAddresses,
    /// PPG samples kept for the estimator
    pub window_capacity: usize,
    /// Heart-rate/SpO2 estimator tuning
    pub estimator: EstimatorConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            addresses: SensorAddresses::default(),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            estimator: EstimatorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_board_addresses() {
        let addresses = SensorAddresses::default();
        assert_eq!(
            [
                addresses.dht20,
                addresses.ags10,
                addresses.bh1750,
                addresses.bmp581,
                addresses.mpu6500,
                addresses.max30102,
            ],
            [0x38, 0x1A, 0x23, 0x46, 0x68, 0x57]
        );
        assert_eq!(BoardConfig::default().window_capacity, 300);
    }
}
