//! MPU6500 6-Axis Inertial Sensor
//!
//! The accelerometer, temperature and gyroscope output registers are
//! contiguous, so one 14-byte burst from ACCEL_XOUT_H returns a coherent
//! snapshot:
//!
//! ```text
//! offset  0    2    4    6     8    10   12
//!       ┌────┬────┬────┬─────┬────┬────┬────┐
//!       │ AX │ AY │ AZ │TEMP │ GX │ GY │ GZ │   all i16 big-endian
//!       └────┴────┴────┴─────┴────┴────┴────┘
//!
//! accel = raw / 4096     g     (±8 g)
//! gyro  = raw / 32.8     dps   (±1000 dps)
//! temp  = (raw - 21) / 333.87 + 21   °C
//! ```

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, BitField},
    constants::sensors::{
        MPU6500_ACCEL_LSB_PER_G, MPU6500_GYRO_LSB_PER_DPS, MPU6500_TEMP_LSB_PER_C,
        MPU6500_TEMP_OFFSET_C,
    },
    errors::{DecodeResult, SensorError, SensorFault, SensorResult},
    traits::BusTransport,
};

use super::{Sensor, SensorId};

/// Default I2C address (AD0 low)
pub const ADDRESS: u8 = 0x68;

/// Register map
pub mod reg {
    /// DLPF configuration
    pub const CONFIG: u8 = 0x1A;
    /// Gyroscope full scale
    pub const GYRO_CONFIG: u8 = 0x1B;
    /// Accelerometer full scale
    pub const ACCEL_CONFIG: u8 = 0x1C;
    /// Accelerometer DLPF
    pub const ACCEL_CONFIG_2: u8 = 0x1D;
    /// Low-power accelerometer output data rate
    pub const LP_ACCEL_ODR: u8 = 0x1E;
    /// Wake-on-motion threshold
    pub const WOM_THRESHOLD: u8 = 0x1F;
    /// Interrupt enable
    pub const INT_ENABLE: u8 = 0x38;
    /// First output register
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    /// Accelerometer intelligence control
    pub const ACCEL_INTEL_CTRL: u8 = 0x69;
    /// User control
    pub const USER_CTRL: u8 = 0x6A;
    /// Power management 1
    pub const PWR_MGMT_1: u8 = 0x6B;
    /// Power management 2
    pub const PWR_MGMT_2: u8 = 0x6C;
}

/// Settle time after waking the device
pub const WAKE_DELAY_MS: u32 = 200;

/// Configuration written after wake-up, in order
pub const CONFIG_WRITES: [(u8, u8); 11] = [
    (reg::CONFIG, 0x00),
    (reg::GYRO_CONFIG, 0x10),
    (reg::ACCEL_CONFIG, 0x10),
    (reg::ACCEL_CONFIG_2, 0x01),
    (reg::LP_ACCEL_ODR, 0x08),
    (reg::WOM_THRESHOLD, 0xC8),
    (reg::INT_ENABLE, 0x40),
    (reg::ACCEL_INTEL_CTRL, 0xC0),
    (reg::USER_CTRL, 0x80),
    (reg::PWR_MGMT_1, 0x01),
    (reg::PWR_MGMT_2, 0x00),
];

/// Length of the output burst
pub const BLOCK_LEN: usize = 14;

const ACCEL: [BitField; 3] = [
    BitField::be(0, 2).signed(),
    BitField::be(2, 2).signed(),
    BitField::be(4, 2).signed(),
];
const TEMPERATURE: BitField = BitField::be(6, 2).signed();
const GYRO: [BitField; 3] = [
    BitField::be(8, 2).signed(),
    BitField::be(10, 2).signed(),
    BitField::be(12, 2).signed(),
];

/// Decoded MPU6500 measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mpu6500Reading {
    /// Acceleration x, y, z in g
    pub accel_g: [f32; 3],
    /// Angular rate x, y, z in degrees per second
    pub gyro_dps: [f32; 3],
    /// Die temperature in °C
    pub temperature_c: f32,
}

fn axes(fields: &[BitField; 3], block: &[u8], lsb_per_unit: f32) -> DecodeResult<[f32; 3]> {
    let mut out = [0.0; 3];
    for (value, field) in out.iter_mut().zip(fields) {
        *value = codec::scale_by(field.extract(block)?, lsb_per_unit);
    }
    Ok(out)
}

/// Decode a 14-byte output burst
pub fn decode(block: &[u8]) -> DecodeResult<Mpu6500Reading> {
    let block = codec::require(block, BLOCK_LEN)?;
    let temperature = TEMPERATURE.extract(block)? as f32;

    Ok(Mpu6500Reading {
        accel_g: axes(&ACCEL, block, MPU6500_ACCEL_LSB_PER_G)?,
        gyro_dps: axes(&GYRO, block, MPU6500_GYRO_LSB_PER_DPS)?,
        temperature_c: (temperature - MPU6500_TEMP_OFFSET_C) / MPU6500_TEMP_LSB_PER_C
            + MPU6500_TEMP_OFFSET_C,
    })
}

fn fault<E: Into<SensorError>>(error: E) -> SensorFault {
    SensorFault::new(SensorId::Mpu6500, error)
}

/// MPU6500 driver
#[derive(Debug, Clone)]
pub struct Mpu6500 {
    address: u8,
}

impl Mpu6500 {
    /// Driver for a device at `address`
    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Mpu6500 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Sensor for Mpu6500 {
    type Reading = Mpu6500Reading;
    const ID: SensorId = SensorId::Mpu6500;

    fn configure<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: BusTransport,
        D: DelayNs,
    {
        bus.write_register(self.address, reg::PWR_MGMT_1, 0x00)
            .map_err(fault)?;
        delay.delay_ms(WAKE_DELAY_MS);

        for (register, value) in CONFIG_WRITES {
            bus.write_register(self.address, register, value).map_err(fault)?;
        }
        Ok(())
    }

    fn read<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<Mpu6500Reading>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let mut block = [0u8; BLOCK_LEN];
        bus.read(self.address, reg::ACCEL_XOUT_H, &mut block)
            .map_err(fault)?;
        decode(&block).map_err(fault)
    }
}
