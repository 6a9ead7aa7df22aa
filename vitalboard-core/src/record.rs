//! Poll Records
//!
//! One [`SensorRecord`] is produced per poll cycle. Each sensor group is an
//! `Option`: `None` means that sensor faulted this cycle and its fields are
//! unavailable, never that they were partially decoded.
//!
//! ## Flat Shape
//!
//! Downstream consumers (dashboards, the daemon's `query` command) want a
//! single flat mapping. [`SensorRecord::to_flat`] produces it:
//!
//! | Field                  | Unit | Unavailable | Rejected |
//! |------------------------|------|-------------|----------|
//! | `dht20_temperature`    | °C   | `null`      |          |
//! | `dht20_humidity`       | %RH  | `null`      |          |
//! | `ags10_tvoc`           | ppm  | `null`      |          |
//! | `bh1750_lux`           | lx   | `null`      |          |
//! | `bmp581_temperature`   | °C   | `null`      |          |
//! | `bmp581_pressure`      | Pa   | `null`      |          |
//! | `mpu6500_accel_{x,y,z}`| g    | `null`      |          |
//! | `mpu6500_gyro_{x,y,z}` | dps  | `null`      |          |
//! | `mpu6500_temperature`  | °C   | `null`      |          |
//! | `heart_rate_bpm`       | bpm  | `null`      | `-1.0`   |
//! | `spo2_percent`         | %    | `null`      | `-1.0`   |
//! | `max30102_temperature` | °C   | `null`      |          |
//!
//! Consumers must treat both `null` and `-1.0` as "no data this cycle".

use serde::{Deserialize, Serialize};

use crate::sensors::{Ags10Reading, Bh1750Reading, Bmp581Reading, Dht20Reading, Mpu6500Reading};
use crate::time::Timestamp;
use crate::vitals::VitalsEstimate;

/// Everything measured in one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Humidity/temperature
    pub dht20: Option<Dht20Reading>,
    /// TVOC
    pub ags10: Option<Ags10Reading>,
    /// Illuminance
    pub bh1750: Option<Bh1750Reading>,
    /// Pressure/temperature
    pub bmp581: Option<Bmp581Reading>,
    /// Inertial
    pub mpu6500: Option<Mpu6500Reading>,
    /// PPG sensor die temperature (°C)
    pub max30102_temperature_c: Option<f32>,
    /// Heart rate and SpO2; `None` when the PPG sensor faulted
    pub vitals: Option<VitalsEstimate>,
}

impl SensorRecord {
    /// Empty record stamped at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Number of sensor groups that produced a value
    pub fn available_count(&self) -> usize {
        [
            self.dht20.is_some(),
            self.ags10.is_some(),
            self.bh1750.is_some(),
            self.bmp581.is_some(),
            self.mpu6500.is_some(),
            self.max30102_temperature_c.is_some(),
        ]
        .iter()
        .filter(|&&available| available)
        .count()
    }

    /// Flatten into one named field per physical value
    pub fn to_flat(&self) -> FlatRecord {
        let f = |v: f32| Some(v as f64);

        FlatRecord {
            timestamp: self.timestamp,
            dht20_temperature: self.dht20.and_then(|r| f(r.temperature_c)),
            dht20_humidity: self.dht20.and_then(|r| f(r.humidity_pct)),
            ags10_tvoc: self.ags10.and_then(|r| f(r.tvoc_ppm)),
            bh1750_lux: self.bh1750.and_then(|r| f(r.lux)),
            bmp581_temperature: self.bmp581.and_then(|r| f(r.temperature_c)),
            bmp581_pressure: self.bmp581.and_then(|r| f(r.pressure_pa)),
            mpu6500_accel_x: self.mpu6500.and_then(|r| f(r.accel_g[0])),
            mpu6500_accel_y: self.mpu6500.and_then(|r| f(r.accel_g[1])),
            mpu6500_accel_z: self.mpu6500.and_then(|r| f(r.accel_g[2])),
            mpu6500_gyro_x: self.mpu6500.and_then(|r| f(r.gyro_dps[0])),
            mpu6500_gyro_y: self.mpu6500.and_then(|r| f(r.gyro_dps[1])),
            mpu6500_gyro_z: self.mpu6500.and_then(|r| f(r.gyro_dps[2])),
            mpu6500_temperature: self.mpu6500.and_then(|r| f(r.temperature_c)),
            heart_rate_bpm: self.vitals.map(|v| v.heart_rate_bpm),
            spo2_percent: self.vitals.map(|v| v.spo2_percent),
            max30102_temperature: self.max30102_temperature_c.and_then(f),
        }
    }
}

/// Flat view of a [`SensorRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// °C
    pub dht20_temperature: Option<f64>,
    /// %RH
    pub dht20_humidity: Option<f64>,
    /// ppm
    pub ags10_tvoc: Option<f64>,
    /// lx
    pub bh1750_lux: Option<f64>,
    /// °C
    pub bmp581_temperature: Option<f64>,
    /// Pa
    pub bmp581_pressure: Option<f64>,
    /// g
    pub mpu6500_accel_x: Option<f64>,
    /// g
    pub mpu6500_accel_y: Option<f64>,
    /// g
    pub mpu6500_accel_z: Option<f64>,
    /// dps
    pub mpu6500_gyro_x: Option<f64>,
    /// dps
    pub mpu6500_gyro_y: Option<f64>,
    /// dps
    pub mpu6500_gyro_z: Option<f64>,
    /// °C
    pub mpu6500_temperature: Option<f64>,
    /// Beats per minute; -1.0 when rejected
    pub heart_rate_bpm: Option<f64>,
    /// Percent saturation; -1.0 when rejected
    pub spo2_percent: Option<f64>,
    /// °C
    pub max30102_temperature: Option<f64>,
}
