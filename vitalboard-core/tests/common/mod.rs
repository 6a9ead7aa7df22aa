//! Common test utilities for integration tests
//!
//! This module provides:
//! - A scripted I2C bus ([`MockBus`]) with per-device register maps,
//!   queued FIFO reads and failure injection
//! - A delay that returns immediately
//! - Reference payloads for every sensor on the board
//! - Synthetic PPG generators (see [`generators`])

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};

use embedded_hal::delay::DelayNs;
use vitalboard_core::{
    crc,
    errors::BusError,
    sensors::{ags10, bh1750, bmp581, dht20, max30102, mpu6500},
    BusTransport, PpgSample,
};

pub mod generators;

/// Scripted bus: register reads answer from a map, writes are logged
#[derive(Debug, Default)]
pub struct MockBus {
    /// Static register contents, keyed by (address, register)
    registers: HashMap<(u8, u8), Vec<u8>>,
    /// One-shot responses consumed before `registers`
    queued: HashMap<(u8, u8), VecDeque<Vec<u8>>>,
    /// Raw (register-less) responses keyed by (address, length)
    raw: HashMap<(u8, usize), Vec<u8>>,
    /// Addresses that do not acknowledge
    failing: HashSet<u8>,
    /// Every write as (address, bytes including register)
    pub writes: Vec<(u8, Vec<u8>)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus populated with healthy data for all six sensors
    pub fn reference_board() -> Self {
        let mut bus = Self::new();

        // DHT20: calibrated, idle, 50 %RH / 12.5 °C
        bus.set_raw(dht20::ADDRESS, &[0x1C]);
        bus.set_raw(dht20::ADDRESS, &fixtures::DHT20_BLOCK);

        // AGS10: 1.234 ppm
        bus.set_register(ags10::ADDRESS, ags10::REG_DATA, &fixtures::AGS10_BLOCK);

        // BH1750: 120 counts
        bus.set_register(bh1750::ADDRESS, bh1750::OP_CONTINUOUS_HIGH_RES, &[0x00, 0x78]);

        // BMP581: healthy status, 25 °C / 101325 Pa
        bus.set_register(bmp581::ADDRESS, bmp581::reg::CHIP_ID, &[0x50]);
        bus.set_register(bmp581::ADDRESS, bmp581::reg::STATUS, &[0x02]);
        bus.set_register(bmp581::ADDRESS, bmp581::reg::INT_STATUS, &[0x10]);
        bus.set_register(bmp581::ADDRESS, bmp581::reg::TEMP_DATA_XLSB, &fixtures::BMP581_BLOCK);

        // MPU6500: flat and still
        bus.set_register(mpu6500::ADDRESS, mpu6500::reg::ACCEL_XOUT_H, &fixtures::mpu6500_block());

        // MAX30102: empty FIFO, 25.5 °C die
        bus.set_fifo_pointers(0, 0);
        bus.set_register(max30102::ADDRESS, max30102::reg::OVF_COUNTER, &[0]);
        bus.set_register(max30102::ADDRESS, max30102::reg::TEMP_INT, &[25]);
        bus.set_register(max30102::ADDRESS, max30102::reg::TEMP_FRAC, &[8]);

        bus
    }

    pub fn set_register(&mut self, address: u8, register: u8, bytes: &[u8]) {
        self.registers.insert((address, register), bytes.to_vec());
    }

    pub fn queue_read(&mut self, address: u8, register: u8, bytes: &[u8]) {
        self.queued
            .entry((address, register))
            .or_default()
            .push_back(bytes.to_vec());
    }

    pub fn set_raw(&mut self, address: u8, bytes: &[u8]) {
        self.raw.insert((address, bytes.len()), bytes.to_vec());
    }

    pub fn fail(&mut self, address: u8) {
        self.failing.insert(address);
    }

    pub fn recover(&mut self, address: u8) {
        self.failing.remove(&address);
    }

    pub fn set_fifo_pointers(&mut self, write_ptr: u8, read_ptr: u8) {
        self.set_register(max30102::ADDRESS, max30102::reg::FIFO_WR_PTR, &[write_ptr]);
        self.set_register(max30102::ADDRESS, max30102::reg::FIFO_RD_PTR, &[read_ptr]);
    }

    /// Queue `samples` in the PPG FIFO starting at slot `read_ptr`
    pub fn load_fifo_at(&mut self, read_ptr: u8, samples: &[PpgSample]) {
        assert!(samples.len() < 32);
        let write_ptr = (read_ptr as usize + samples.len()) % 32;
        self.set_fifo_pointers(write_ptr as u8, read_ptr);
        for sample in samples {
            self.queue_read(
                max30102::ADDRESS,
                max30102::reg::FIFO_DATA,
                &generators::fifo_slot(*sample),
            );
        }
    }

    pub fn load_fifo(&mut self, samples: &[PpgSample]) {
        self.load_fifo_at(0, samples);
    }

    /// Queued FIFO slots not yet read
    pub fn fifo_remaining(&self) -> usize {
        self.queued
            .get(&(max30102::ADDRESS, max30102::reg::FIFO_DATA))
            .map_or(0, VecDeque::len)
    }

    /// Single-register writes sent to `address`, as (register, value)
    pub fn register_writes(&self, address: u8) -> Vec<(u8, u8)> {
        self.writes
            .iter()
            .filter(|(a, bytes)| *a == address && bytes.len() == 2)
            .map(|(_, bytes)| (bytes[0], bytes[1]))
            .collect()
    }

    /// Bare opcode writes sent to `address`
    pub fn opcode_writes(&self, address: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, bytes)| *a == address && bytes.len() == 1)
            .map(|(_, bytes)| bytes[0])
            .collect()
    }

    fn check(&self, address: u8) -> Result<(), BusError> {
        if self.failing.contains(&address) {
            Err(BusError::NoAcknowledge)
        } else {
            Ok(())
        }
    }
}

fn fill(buf: &mut [u8], bytes: &[u8]) {
    for (dst, src) in buf.iter_mut().zip(bytes.iter().chain(std::iter::repeat(&0))) {
        *dst = *src;
    }
}

impl BusTransport for MockBus {
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.check(address)?;
        if let Some(bytes) = self
            .queued
            .get_mut(&(address, register))
            .and_then(VecDeque::pop_front)
        {
            fill(buf, &bytes);
            return Ok(());
        }
        let bytes = self
            .registers
            .get(&(address, register))
            .ok_or(BusError::NoAcknowledge)?;
        fill(buf, bytes);
        Ok(())
    }

    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.check(address)?;
        let mut frame = vec![register];
        frame.extend_from_slice(bytes);
        self.writes.push((address, frame));
        Ok(())
    }

    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.check(address)?;
        let bytes = self
            .raw
            .get(&(address, buf.len()))
            .ok_or(BusError::NoAcknowledge)?;
        fill(buf, bytes);
        Ok(())
    }

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), BusError> {
        self.check(address)?;
        self.writes.push((address, vec![byte]));
        Ok(())
    }
}

/// Delay that returns immediately and totals what was asked for
#[derive(Debug, Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Reference payloads
pub mod fixtures {
    use super::*;

    /// 50 %RH, 12.5 °C
    pub const DHT20_BLOCK: [u8; 7] = [0x1C, 0x80, 0x00, 0x05, 0x00, 0x00, 0x84];

    /// 1.234 ppm
    pub const AGS10_BLOCK: [u8; 5] = [0x00, 0x00, 0x04, 0xD2, 0x32];

    /// 25 °C, 101325 Pa
    pub const BMP581_BLOCK: [u8; 6] = [0x00, 0x00, 0x19, 0x40, 0xF3, 0x62];

    /// accel (0, 0, 1 g), temperature raw 21, gyro zero
    pub fn mpu6500_block() -> [u8; 14] {
        let mut block = [0u8; 14];
        block[4..6].copy_from_slice(&4096i16.to_be_bytes());
        block[6..8].copy_from_slice(&21i16.to_be_bytes());
        block
    }

    /// Measurement block with a correct CRC appended
    pub fn dht20_block(data: [u8; 6]) -> [u8; 7] {
        let mut block = [0u8; 7];
        block[..6].copy_from_slice(&data);
        block[6] = crc::compute(&data);
        block
    }
}
