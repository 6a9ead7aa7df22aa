//! MAX30102 Pulse Oximetry Sensor
//!
//! ## FIFO
//!
//! The part averages 16 ADC conversions per sample (400 Hz → 25 Hz) and
//! queues the results in a 32-slot circular FIFO. Each slot is 6 bytes,
//! one 18-bit red and one 18-bit IR value, left-padded to 3 bytes:
//!
//! ```text
//! byte   0       1       2       3       4       5
//!      ┌───────┬───────┬───────┬───────┬───────┬───────┐
//!      │xxxxxxR│RRRRRRR│RRRRRRR│xxxxxxI│IIIIIII│IIIIIII│
//!      └───────┴───────┴───────┴───────┴───────┴───────┘
//!        red = bytes[0..3] & 0x3FFFF   ir = bytes[3..6] & 0x3FFFF
//! ```
//!
//! The number of unread samples is the forward ring distance from the read
//! pointer (0x06) to the write pointer (0x04). A non-zero overflow counter
//! (0x05) means samples were lost because the loop fell behind.
//!
//! ## Die Temperature
//!
//! ```text
//! T = (i8) TINT + (TFRAC & 0x0F) * 0.0625   °C
//! ```
//!
//! A conversion is started once at configuration and re-armed after every
//! read, so each cycle sees the value converted during the previous one.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::{
    buffer::{ring_distance, PpgSample, PPG_FIFO_SLOTS},
    codec::{self, BitField},
    constants::sensors::{MAX30102_SAMPLE_BITS, MAX30102_TEMP_FRACTION_STEP_C},
    errors::{DecodeResult, SensorError, SensorFault, SensorResult},
    traits::BusTransport,
};

use super::{Sensor, SensorId};

/// Default I2C address (fixed)
pub const ADDRESS: u8 = 0x57;

/// Register map
pub mod reg {
    /// Interrupt enable 1
    pub const INT_ENABLE_1: u8 = 0x02;
    /// Interrupt enable 2
    pub const INT_ENABLE_2: u8 = 0x03;
    /// FIFO write pointer
    pub const FIFO_WR_PTR: u8 = 0x04;
    /// FIFO overflow counter
    pub const OVF_COUNTER: u8 = 0x05;
    /// FIFO read pointer
    pub const FIFO_RD_PTR: u8 = 0x06;
    /// FIFO data
    pub const FIFO_DATA: u8 = 0x07;
    /// FIFO configuration (averaging, rollover)
    pub const FIFO_CONFIG: u8 = 0x08;
    /// Mode configuration
    pub const MODE_CONFIG: u8 = 0x09;
    /// SpO2 configuration (range, rate, pulse width)
    pub const SPO2_CONFIG: u8 = 0x0A;
    /// Red LED pulse amplitude
    pub const LED1_PA: u8 = 0x0C;
    /// IR LED pulse amplitude
    pub const LED2_PA: u8 = 0x0D;
    /// Die temperature integer part
    pub const TEMP_INT: u8 = 0x1F;
    /// Die temperature fraction
    pub const TEMP_FRAC: u8 = 0x20;
    /// Die temperature conversion control
    pub const TEMP_CONFIG: u8 = 0x21;
}

/// Start a die temperature conversion
pub const TEMP_START: u8 = 0x01;

/// Configuration written at startup, in order
pub const CONFIG_WRITES: [(u8, u8); 12] = [
    (reg::MODE_CONFIG, 0x03),   // SpO2 mode: red + IR
    (reg::SPO2_CONFIG, 0x0F),   // 400 Hz, 411 µs pulse, 18-bit
    (reg::LED1_PA, 0x0F),       // ~3 mA
    (reg::LED2_PA, 0x0F),
    (reg::TEMP_CONFIG, 0x00),
    (reg::INT_ENABLE_1, 0x00),
    (reg::INT_ENABLE_2, 0x00),
    (reg::FIFO_WR_PTR, 0x00),
    (reg::OVF_COUNTER, 0x00),
    (reg::FIFO_RD_PTR, 0x00),
    (reg::FIFO_CONFIG, 0x90),   // average 16
    (reg::TEMP_CONFIG, TEMP_START),
];

/// Bytes per FIFO slot
pub const SAMPLE_LEN: usize = 6;

/// Maximum samples one drain can return
pub const FIFO_DEPTH: usize = PPG_FIFO_SLOTS as usize;

const POINTER_MASK: u8 = PPG_FIFO_SLOTS - 1;

const RED: BitField = BitField::be(0, 3).window(0, MAX30102_SAMPLE_BITS);
const IR: BitField = BitField::be(3, 3).window(0, MAX30102_SAMPLE_BITS);

/// Samples drained from the FIFO in one acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct Max30102Reading {
    /// New samples, oldest first (0..=32)
    pub samples: Vec<PpgSample, FIFO_DEPTH>,
    /// Die temperature in °C
    pub temperature_c: f32,
    /// FIFO overflow counter at read time
    pub overflow: u8,
}

/// Unread samples between the read and write pointers
pub fn pending_samples(write_ptr: u8, read_ptr: u8) -> u8 {
    ring_distance(read_ptr & POINTER_MASK, write_ptr & POINTER_MASK, PPG_FIFO_SLOTS)
}

/// Decode one 6-byte FIFO slot
pub fn decode_sample(slot: &[u8]) -> DecodeResult<PpgSample> {
    let slot = codec::require(slot, SAMPLE_LEN)?;
    Ok(PpgSample::new(
        RED.extract_raw(slot)?,
        IR.extract_raw(slot)?,
    ))
}

/// Decode the two die temperature registers
pub fn decode_temperature(integer: u8, fraction: u8) -> f32 {
    let whole = codec::sign_extend(integer as u32, 8) as f32;
    whole + (fraction & 0x0F) as f32 * MAX30102_TEMP_FRACTION_STEP_C
}

fn fault<E: Into<SensorError>>(error: E) -> SensorFault {
    SensorFault::new(SensorId::Max30102, error)
}

/// MAX30102 driver
#[derive(Debug, Clone)]
pub struct Max30102 {
    address: u8,
}

impl Max30102 {
    /// Driver for a device at `address`
    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Max30102 {
    fn default() -> Self {
        Self::new(ADDRESS)
    }
}

impl Sensor for Max30102 {
    type Reading = Max30102Reading;
    const ID: SensorId = SensorId::Max30102;

    fn configure<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<()>
    where
        B: BusTransport,
        D: DelayNs,
    {
        for (register, value) in CONFIG_WRITES {
            bus.write_register(self.address, register, value).map_err(fault)?;
        }
        Ok(())
    }

    fn read<B, D>(&mut self, bus: &mut B, _delay: &mut D) -> SensorResult<Max30102Reading>
    where
        B: BusTransport,
        D: DelayNs,
    {
        let write_ptr = bus.read_register(self.address, reg::FIFO_WR_PTR).map_err(fault)?;
        let overflow = bus.read_register(self.address, reg::OVF_COUNTER).map_err(fault)?;
        let read_ptr = bus.read_register(self.address, reg::FIFO_RD_PTR).map_err(fault)?;

        if overflow != 0 {
            log_warn!("MAX30102 FIFO overflowed, {} samples lost", overflow);
        }

        let pending = pending_samples(write_ptr, read_ptr);
        if pending == 0 {
            log_debug!("MAX30102 FIFO empty (ptr {})", write_ptr);
        }

        let mut samples = Vec::new();
        let mut slot = [0u8; SAMPLE_LEN];
        for _ in 0..pending {
            bus.read(self.address, reg::FIFO_DATA, &mut slot).map_err(fault)?;
            let sample = decode_sample(&slot).map_err(fault)?;
            // pending <= 31, the vector holds 32
            let _ = samples.push(sample);
        }

        let integer = bus.read_register(self.address, reg::TEMP_INT).map_err(fault)?;
        let fraction = bus.read_register(self.address, reg::TEMP_FRAC).map_err(fault)?;
        bus.write_register(self.address, reg::TEMP_CONFIG, TEMP_START)
            .map_err(fault)?;

        Ok(Max30102Reading {
            samples,
            temperature_c: decode_temperature(integer, fraction),
            overflow,
        })
    }
}
