//! BH1750FVI Ambient Light Sensor
//!
//! Opcode driven: single bytes written without a register select power the
//! device on, reset the data register and start continuous high-resolution
//! measurement. The result is a 16-bit big-endian count; lux = count / 1.2.

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, BitField},
    constants::sensors::BH1750_COUNTS_PER_LUX,
    errors::{DecodeResult, SensorError, SensorFault, SensorResult},
    traits::BusTransport,
};

use super::{Sensor, SensorId};

/// Default I2C address (ADDR pin low)
pub const ADDRESS: u8 = 0x23;

/// Power on opcode
pub const OP_POWER_ON: u8 = 0x01;

/// Reset data register opcode
pub const OP_RESET: u8 = 0x07;

/// Continuous high-resolution mode opcode
pub const OP_CONTINUOUS_HIGH_RES: u8 = 0x10;

/// Configuration opcodes with the settle time after each
const OPCODE_DELAYS_MS: [(u8, u32); 3] = [
    (OP_POWER_ON, 100),
    (OP_RESET, 100),
    (OP_CONTINUOUS_HIGH_RES, 200),
];

/// Length of the measurement block
pub const BLOCK_LEN: usize = 2;

const COUNT: BitField = BitField::be(0, 2);

/// Decoded BH1750FVI measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bh1750Reading {
    /// Illuminance in lux
    pub lux: f32,
}

/// Decode a 2-byte measurement block
pub fn decode(block: &[u8]) -> DecodeResult<Bh1750Reading> {
    let count = COUNT.extract(block)?;
    Ok(Bh1750Reading {
        lux: codec::scale_by(count, BH1750_COUNTS_PER_LUX),
    })
}

fn fault<E: Into<SensorError>>(error: E) -> SensorFault {
    SensorFault::new(SensorId::Bh1750, error)
}

/// BH1750FVI driver
#[derive(Debug, Clone)]
pub struct Bh1750 {
    address: u8,
}

impl Bh1750 {
    /// Driver for a device at `address`
    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Bh1750 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Sensor for Bh1750 {
    type Reading = Bh1750Reading;
    const ID: SensorId = SensorId::Bh1750;

    fn configure<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<()>
    where
        B: BusTransport,
        D: DelayNs,
    {
        for (opcode, settle_ms) in OPCODE_DELAYS_MS {
            bus.write_byte(self.address, opcode).map_err(fault)?;
            delay.delay_ms(settle_ms);
        }
        Ok(())
    }

    fn read<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<Bh1750Reading>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let mut block = [0u8; BLOCK_LEN];
        bus.read(self.address, OP_CONTINUOUS_HIGH_RES, &mut block)
            .map_err(fault)?;
        decode(&block).map_err(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecodeError;

    #[test]
    fn decodes_lux() {
        // 0x0078 = 120 counts
        assert!((decode(&[0x00, 0x78]).unwrap().lux - 100.0).abs() < 1e-3);
        assert_eq!(decode(&[0x00, 0x00]).unwrap().lux, 0.0);
    }

    #[test]
    fn full_scale_is_unsigned() {
        let lux = decode(&[0xFF, 0xFF]).unwrap().lux;
        assert!((lux - 54612.5).abs() < 0.01);
    }

    #[test]
    fn short_block() {
        assert_eq!(
            decode(&[0x12]),
            Err(DecodeError::MalformedTransfer { required: 2, available: 1 })
        );
    }
}
