//! CRC-8 Transfer Validation
//!
//! The humidity/temperature sensor and the gas sensor both append an 8-bit
//! CRC to their measurement block. They use the same parameters:
//!
//! ```text
//! polynomial  0x31   (x^8 + x^5 + x^4 + 1)
//! init        0xFF
//! reflect     no
//! final xor   0x00
//! check       crc8([0xBE, 0xEF]) == 0x92
//! ```
//!
//! The register loop is short enough that a lookup table would cost more
//! flash than it saves cycles for 4-6 byte payloads.

/// Generator polynomial shared by both sensor protocols
pub const CRC8_POLYNOMIAL: u8 = 0x31;

/// Initial accumulator value
pub const CRC8_INIT: u8 = 0xFF;

/// Compute the CRC-8 of `bytes`
pub fn compute(bytes: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for &byte in bytes {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Check `bytes` against a transmitted checksum
pub fn validate(bytes: &[u8], expected: u8) -> bool {
    compute(bytes) == expected
}
