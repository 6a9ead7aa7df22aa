//! AGS10 TVOC Gas Sensor
//!
//! A single 5-byte read at register 0x00 returns status, a 24-bit TVOC
//! concentration in ppb and a CRC-8 over the first four bytes:
//!
//! ```text
//! byte  0        1         2         3         4
//!     ┌────────┬─────────┬─────────┬─────────┬─────────┐
//!     │ status │ C[23:16]│ C[15:8] │ C[7:0]  │  CRC-8  │
//!     └────────┴─────────┴─────────┴─────────┴─────────┘
//!
//! status bit 0 set → warming up or value not refreshed since last read
//! TVOC = C / 1000   ppm
//! ```

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, BitField},
    constants::sensors::AGS10_COUNTS_PER_PPM,
    crc,
    errors::{DecodeError, DecodeResult, SensorError, SensorFault, SensorResult},
    traits::BusTransport,
};

use super::{Sensor, SensorId};

/// Default I2C address
pub const ADDRESS: u8 = 0x1A;

/// Data register
pub const REG_DATA: u8 = 0x00;

/// Status bit set while the value is stale
pub const STATUS_NOT_UPDATED: u8 = 0x01;

/// Length of the data block including CRC
pub const BLOCK_LEN: usize = 5;

const CONCENTRATION: BitField = BitField::be(1, 3);

/// Decoded AGS10 measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ags10Reading {
    /// Total volatile organic compounds in ppm
    pub tvoc_ppm: f32,
}

/// Decode a 5-byte data block
pub fn decode(block: &[u8]) -> DecodeResult<Ags10Reading> {
    let block = codec::require(block, BLOCK_LEN)?;

    if block[0] & STATUS_NOT_UPDATED != 0 {
        return Err(DecodeError::NotReady {
            reason: "warming up or data not updated",
        });
    }

    let expected = block[4];
    let computed = crc::compute(&block[..4]);
    if computed != expected {
        return Err(DecodeError::ChecksumMismatch { computed, expected });
    }

    let raw = CONCENTRATION.extract(block)?;
    Ok(Ags10Reading {
        tvoc_ppm: codec::scale_by(raw, AGS10_COUNTS_PER_PPM),
    })
}

fn fault<E: Into<SensorError>>(error: E) -> SensorFault {
    SensorFault::new(SensorId::Ags10, error)
}

/// AGS10 driver
#[derive(Debug, Clone)]
pub struct Ags10 {
    address: u8,
}

impl Ags10 {
    /// Driver for a device at `address`
    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Ags10 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Sensor for Ags10 {
    type Reading = Ags10Reading;
    const ID: SensorId = SensorId::Ags10;

    fn read<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<Ags10Reading>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let mut block = [0u8; BLOCK_LEN];
        bus.read(self.address, REG_DATA, &mut block).map_err(fault)?;
        decode(&block).map_err(fault)
    }
}
