//! DHT20 Humidity/Temperature Sensor
//!
//! ## Protocol
//!
//! The DHT20 has no register map. It is driven by a trigger command and
//! answers with a status byte followed by the measurement:
//!
//! ```text
//! 1. read 1 byte           status: bits 3,4 (0x18) must be set (calibrated)
//! 2. write 0xAC 0x33 0x00  trigger measurement
//! 3. wait >= 80 ms
//! 4. read 1 byte           status: bit 7 (0x80) set = still busy
//! 5. read 7 bytes          [status, H, H, H|T, T, T, CRC]
//! ```
//!
//! ## Measurement Block
//!
//! ```text
//! byte  0         1         2         3         4         5         6
//!     ┌─────────┬─────────┬─────────┬────┬────┬─────────┬─────────┬─────────┐
//!     │ status  │ H[19:12]│ H[11:4] │H3:0│T19:│ T[15:8] │ T[7:0]  │  CRC-8  │
//!     └─────────┴─────────┴─────────┴────┴────┴─────────┴─────────┴─────────┘
//!
//! RH   = H / 2^20 * 100          %
//! T    = T / 2^20 * 200 - 50     °C
//! CRC  = crc8(bytes[0..6])
//! ```

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, BitField},
    constants::sensors::{DHT20_HUMIDITY_SPAN_PCT, DHT20_TEMP_OFFSET_C, DHT20_TEMP_SPAN_C},
    crc,
    errors::{DecodeError, DecodeResult, SensorError, SensorFault, SensorResult},
    traits::BusTransport,
};

use super::{Sensor, SensorId};

/// Default I2C address (fixed)
pub const ADDRESS: u8 = 0x38;

/// Trigger-measurement command
pub const CMD_TRIGGER: u8 = 0xAC;

/// Arguments following the trigger command
pub const TRIGGER_ARGS: [u8; 2] = [0x33, 0x00];

/// Status bits that must be set once calibration data is loaded
pub const STATUS_CALIBRATED: u8 = 0x18;

/// Status bit set while a measurement is running
pub const STATUS_BUSY: u8 = 0x80;

/// Wait between trigger and readout
pub const MEASUREMENT_DELAY_MS: u32 = 100;

/// Length of the measurement block including CRC
pub const BLOCK_LEN: usize = 7;

const HUMIDITY: BitField = BitField::be(1, 3).window(4, 20);
const TEMPERATURE: BitField = BitField::be(3, 3).window(0, 20);

/// Decoded DHT20 measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dht20Reading {
    /// Air temperature in °C
    pub temperature_c: f32,
    /// Relative humidity in %RH
    pub humidity_pct: f32,
}

/// Check the calibration bits of a status byte read before triggering
pub fn check_calibration(status: u8) -> DecodeResult<()> {
    if status & STATUS_CALIBRATED != STATUS_CALIBRATED {
        Err(DecodeError::NotReady {
            reason: "calibration bits not set",
        })
    } else {
        Ok(())
    }
}

/// Check the busy bit of a status byte
pub fn check_busy(status: u8) -> DecodeResult<()> {
    if status & STATUS_BUSY != 0 {
        Err(DecodeError::DeviceBusy)
    } else {
        Ok(())
    }
}

/// Decode a 7-byte measurement block
pub fn decode(block: &[u8]) -> DecodeResult<Dht20Reading> {
    let block = codec::require(block, BLOCK_LEN)?;
    check_busy(block[0])?;

    let expected = block[6];
    let computed = crc::compute(&block[..6]);
    if computed != expected {
        return Err(DecodeError::ChecksumMismatch { computed, expected });
    }

    let humidity_raw = HUMIDITY.extract(block)?;
    let temperature_raw = TEMPERATURE.extract(block)?;

    Ok(Dht20Reading {
        humidity_pct: codec::scale_pow2(humidity_raw, 20) * DHT20_HUMIDITY_SPAN_PCT,
        temperature_c: codec::scale_pow2(temperature_raw, 20) * DHT20_TEMP_SPAN_C
            - DHT20_TEMP_OFFSET_C,
    })
}

fn fault<E: Into<SensorError>>(error: E) -> SensorFault {
    SensorFault::new(SensorId::Dht20, error)
}

/// DHT20 driver
#[derive(Debug, Clone)]
pub struct Dht20 {
    address: u8,
}

impl Dht20 {
    /// Driver for a device at `address`
    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Dht20 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Sensor for Dht20 {
    type Reading = Dht20Reading;
    const ID: SensorId = SensorId::Dht20;

    fn read<B, D>(&mut self, bus: &mut B, delay: &mut D) -> SensorResult<Dht20Reading>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let status = bus.read_byte(self.address).map_err(fault)?;
        check_calibration(status).map_err(fault)?;

        bus.write(self.address, CMD_TRIGGER, &TRIGGER_ARGS)
            .map_err(fault)?;
        delay.delay_ms(MEASUREMENT_DELAY_MS);

        let status = bus.read_byte(self.address).map_err(fault)?;
        check_busy(status).map_err(fault)?;

        let mut block = [0u8; BLOCK_LEN];
        bus.read_raw(self.address, &mut block).map_err(fault)?;
        decode(&block).map_err(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_crc(data: [u8; 6]) -> [u8; 7] {
        let mut block = [0u8; 7];
        block[..6].copy_from_slice(&data);
        block[6] = crc::compute(&data);
        block
    }

    #[test]
    fn decodes_reference_block() {
        // H = 0x6B2E7 (41.8677 %RH), T = 0x5C28F (22.0 °C)
        let block = [0x1C, 0x6B, 0x2E, 0x75, 0xC2, 0x8F, 0x19];
        let reading = decode(&block).unwrap();

        assert!((reading.humidity_pct - 41.8677).abs() < 0.01);
        assert!((reading.temperature_c - 22.0).abs() < 0.01);
    }

    #[test]
    fn decodes_half_scale_values() {
        let block = [0x1C, 0x80, 0x00, 0x05, 0x00, 0x00, 0x84];
        let reading = decode(&block).unwrap();

        assert_eq!(reading.humidity_pct, 50.0);
        assert_eq!(reading.temperature_c, 12.5);
    }

    #[test]
    fn corrupted_crc_is_rejected() {
        let block = [0x1C, 0x6B, 0x2E, 0x75, 0xC2, 0x8F, 0x18];
        assert_eq!(
            decode(&block),
            Err(DecodeError::ChecksumMismatch { computed: 0x19, expected: 0x18 })
        );
    }

    #[test]
    fn busy_block_is_rejected() {
        let block = with_crc([0x9C, 0x80, 0x00, 0x05, 0x00, 0x00]);
        assert_eq!(decode(&block), Err(DecodeError::DeviceBusy));
    }

    #[test]
    fn short_block_is_malformed() {
        assert_eq!(
            decode(&[0x1C, 0x80, 0x00]),
            Err(DecodeError::MalformedTransfer { required: 7, available: 3 })
        );
    }

    #[test]
    fn calibration_status() {
        assert!(check_calibration(0x18).is_ok());
        assert!(check_calibration(0x1C).is_ok());
        assert!(matches!(check_calibration(0x08), Err(DecodeError::NotReady { .. })));
    }
}
