//! Bus Transport Abstraction
//!
//! Sensor drivers never touch a platform I2C handle directly. They receive a
//! `&mut impl BusTransport` for the duration of one call, so the same driver
//! runs against a Linux character device, an MCU peripheral or a scripted
//! mock in tests.
//!
//! ## Register Access Model
//!
//! All six devices on the board use the common "pointer register" scheme:
//!
//! ```text
//! read:   START addr+W  reg  RESTART addr+R  d0 d1 ... dn  STOP
//! write:  START addr+W  reg  d0 d1 ... dn                  STOP
//! ```
//!
//! Two devices also need raw transfers without a register byte: the
//! humidity sensor answers status and measurement on a bare read, and the
//! light sensor takes single-byte opcodes.
//!
//! ## Adapting embedded-hal
//!
//! [`HalBus`] wraps any `embedded_hal::i2c::I2c` and maps its error kinds to
//! [`BusError`]:
//!
//! ```rust,ignore
//! use linux_embedded_hal::I2cdev;
//! use vitalboard_core::traits::HalBus;
//!
//! let mut bus = HalBus::new(I2cdev::new("/dev/i2c-1")?);
//! ```

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::errors::BusError;

/// Blocking request/response access to an I2C bus
///
/// Calls have no internal timeout: a hung device blocks the caller.
pub trait BusTransport {
    /// Read `buf.len()` bytes starting at `register`
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `bytes` starting at `register`
    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError>;

    /// Read `buf.len()` bytes without addressing a register
    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write one byte without addressing a register
    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), BusError>;

    /// Read one byte without addressing a register
    fn read_byte(&mut self, address: u8) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.read_raw(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a single register
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.read(address, register, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single register
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
        self.write(address, register, &[value])
    }
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read(address, register, buf)
    }

    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError> {
        (**self).write(address, register, bytes)
    }

    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read_raw(address, buf)
    }

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), BusError> {
        (**self).write_byte(address, byte)
    }
}

/// Longest register write any driver issues (register byte + payload)
const MAX_WRITE_LEN: usize = 8;

/// [`BusTransport`] over an `embedded-hal` 1.0 I2C implementation
#[derive(Debug)]
pub struct HalBus<I> {
    i2c: I,
}

impl<I: I2c> HalBus<I> {
    /// Wrap an I2C peripheral
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Release the wrapped peripheral
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> BusTransport for HalBus<I> {
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c
            .write_read(address, &[register], buf)
            .map_err(|e| map_error(e.kind()))
    }

    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), BusError> {
        let mut frame: heapless::Vec<u8, MAX_WRITE_LEN> = heapless::Vec::new();
        frame.push(register).map_err(|_| BusError::Other)?;
        frame
            .extend_from_slice(bytes)
            .map_err(|_| BusError::Other)?;

        self.i2c
            .write(address, &frame)
            .map_err(|e| map_error(e.kind()))
    }

    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c
            .read(address, buf)
            .map_err(|e| map_error(e.kind()))
    }

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), BusError> {
        self.i2c
            .write(address, &[byte])
            .map_err(|e| map_error(e.kind()))
    }
}

fn map_error(kind: ErrorKind) -> BusError {
    match kind {
        ErrorKind::NoAcknowledge(_) => BusError::NoAcknowledge,
        ErrorKind::ArbitrationLoss => BusError::ArbitrationLoss,
        _ => BusError::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug)]
    struct NackError;

    impl embedded_hal::i2c::Error for NackError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// Records the last write and answers reads with a counter
    #[derive(Default)]
    struct RecordingI2c {
        last_write: Vec<u8>,
        fail: bool,
    }

    impl ErrorType for RecordingI2c {
        type Error = NackError;
    }

    impl I2c for RecordingI2c {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(NackError);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.last_write = bytes.to_vec(),
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = i as u8 + 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn register_write_prefixes_register() {
        let mut bus = HalBus::new(RecordingI2c::default());
        bus.write(0x57, 0x0A, &[0x0F]).unwrap();
        assert_eq!(bus.release().last_write, vec![0x0A, 0x0F]);
    }

    #[test]
    fn register_read_fills_buffer() {
        let mut bus = HalBus::new(RecordingI2c::default());
        let mut buf = [0u8; 3];
        bus.read(0x57, 0x07, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(bus.release().last_write, vec![0x07]);
    }

    #[test]
    fn hal_errors_are_mapped() {
        let mut bus = HalBus::new(RecordingI2c { fail: true, ..Default::default() });
        assert_eq!(bus.read_byte(0x38), Err(BusError::NoAcknowledge));
    }
}
