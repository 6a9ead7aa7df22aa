//! BMP581 Barometric Pressure Sensor
//!
//! ## Startup Checks
//!
//! Before configuration the driver verifies that the part finished its
//! power-on sequence:
//!
//! | Register | Check                      | Meaning               |
//! |----------|----------------------------|-----------------------|
//! | 0x01     | `!= 0`                     | chip id present       |
//! | 0x28     | bit 1 (0x02) set           | NVM ready             |
//! | 0x28     | bit 2 (0x04) clear         | no NVM error          |
//! | 0x27     | `== 0x10`                  | POR complete          |
//!
//! ## Data Block
//!
//! Six bytes from 0x1D, two signed 24-bit little-endian fields:
//!
//! ```text
//! byte   0      1      2       3      4      5
//!      ┌──────┬──────┬──────┐┌──────┬──────┬──────┐
//!      │ T_XL │ T_L  │ T_H  ││ P_XL │ P_L  │ P_H  │
//!      └──────┴──────┴──────┘└──────┴──────┴──────┘
//!
//! T = raw / 2^16   °C
//! P = raw / 2^6    Pa
//! ```

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, BitField},
    constants::sensors::{BMP581_PRESSURE_FRACTION_BITS, BMP581_TEMP_FRACTION_BITS},
    errors::{DecodeError, DecodeResult, SensorError, SensorFault, SensorResult},
    traits::BusTransport,
};

use super::{Sensor, SensorId};

/// Default I2C address (SDO low)
pub const ADDRESS: u8 = 0x46;

/// Register map
pub mod reg {
    /// Chip identification
    pub const CHIP_ID: u8 = 0x01;
    /// Temperature XLSB; first byte of the data block
    pub const TEMP_DATA_XLSB: u8 = 0x1D;
    /// Interrupt status
    pub const INT_STATUS: u8 = 0x27;
    /// Device status
    pub const STATUS: u8 = 0x28;
    /// Oversampling rate configuration
    pub const OSR_CONFIG: u8 = 0x36;
    /// Data-ready interrupt routing
    pub const INT_SOURCE: u8 = 0x31;
    /// Output data rate and power mode
    pub const ODR_CONFIG: u8 = 0x37;
}

/// NVM ready bit of the status register
pub const STATUS_NVM_READY: u8 = 0x02;

/// NVM error bit of the status register
pub const STATUS_NVM_ERROR: u8 = 0x04;

/// Interrupt status value once power-on reset is complete
pub const INT_STATUS_POR_DONE: u8 = 0x10;

/// Configuration written after the startup checks pass
pub const CONFIG_WRITES: [(u8, u8); 3] = [
    (reg::OSR_CONFIG, 0x7F),
    (reg::INT_SOURCE, 0x09),
    (reg::ODR_CONFIG, 0xEB),
];

/// Length of the data block
pub const BLOCK_LEN: usize = 6;

const TEMPERATURE: BitField = BitField::le(0, 3).signed();
const PRESSURE: BitField = BitField::le(3, 3).signed();

/// Decoded BMP581 measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmp581Reading {
    /// Temperature in °C
    pub temperature_c: f32,
    /// Pressure in Pa
    pub pressure_pa: f32,
}

/// Decode a 6-byte data block
pub fn decode(block: &[u8]) -> DecodeResult<Bmp581Reading> {
    let block = codec::require(block, BLOCK_LEN)?;
    let temperature = TEMPERATURE.extract(block)?;
    let pressure = PRESSURE.extract(block)?;

    Ok(Bmp581Reading {
        temperature_c: codec::scale_pow2(temperature, BMP581_TEMP_FRACTION_BITS),
        pressure_pa: codec::scale_pow2(pressure, BMP581_PRESSURE_FRACTION_BITS),
    })
}

/// Validate the startup status registers
pub fn check_startup(chip_id: u8, status: u8, int_status: u8) -> DecodeResult<()> {
    if chip_id == 0 {
        return Err(DecodeError::NotReady { reason: "chip id is zero" });
    }
    if status & STATUS_NVM_READY == 0 {
        return Err(DecodeError::NotReady { reason: "NVM not ready" });
    }
    if status & STATUS_NVM_ERROR != 0 {
        return Err(DecodeError::NotReady { reason: "NVM error" });
    }
    if int_status != INT_STATUS_POR_DONE {
        return Err(DecodeError::NotReady { reason: "power-on reset not complete" });
    }
    Ok(())
}

fn fault<E: Into<SensorError>>(error: E) -> SensorFault {
    SensorFault::new(SensorId::Bmp581, error)
}

/// BMP581 driver
#[derive(Debug, Clone)]
pub struct Bmp581 {
    address: u8,
}

impl Bmp581 {
    /// Driver for a device at `address`
    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Bmp581 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Sensor for Bmp581 {
    type Reading = Bmp581Reading;
    const ID: SensorId = SensorId::Bmp581;

    fn configure<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<()>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let chip_id = bus.read_register(self.address, reg::CHIP_ID).map_err(fault)?;
        let status = bus.read_register(self.address, reg::STATUS).map_err(fault)?;
        let int_status = bus.read_register(self.address, reg::INT_STATUS).map_err(fault)?;
        check_startup(chip_id, status, int_status).map_err(fault)?;

        for (register, value) in CONFIG_WRITES {
            bus.write_register(self.address, register, value).map_err(fault)?;
        }
        Ok(())
    }

    fn read<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<Bmp581Reading>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let mut block = [0u8; BLOCK_LEN];
        bus.read(self.address, reg::TEMP_DATA_XLSB, &mut block)
            .map_err(fault)?;
        decode(&block).map_err(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_room_conditions() {
        // 25.0 °C, 101325 Pa
        let reading = decode(&[0x00, 0x00, 0x19, 0x40, 0xF3, 0x62]).unwrap();
        assert_eq!(reading.temperature_c, 25.0);
        assert_eq!(reading.pressure_pa, 101_325.0);
    }

    #[test]
    fn negative_temperature() {
        let reading = decode(&[0x00, 0x00, 0xF6, 0x40, 0xF3, 0x62]).unwrap();
        assert_eq!(reading.temperature_c, -10.0);
    }

    #[test]
    fn startup_checks() {
        assert!(check_startup(0x50, 0x02, 0x10).is_ok());
        assert!(matches!(check_startup(0x00, 0x02, 0x10), Err(DecodeError::NotReady { .. })));
        assert!(matches!(check_startup(0x50, 0x00, 0x10), Err(DecodeError::NotReady { .. })));
        assert!(matches!(check_startup(0x50, 0x06, 0x10), Err(DecodeError::NotReady { .. })));
        assert!(matches!(check_startup(0x50, 0x02, 0x00), Err(DecodeError::NotReady { .. })));
    }

    #[test]
    fn short_block() {
        assert_eq!(
            decode(&[0; 5]),
            Err(DecodeError::MalformedTransfer { required: 6, available: 5 })
        );
    }
}
