//! Byte-Block Codec for Register Payloads
//!
//! Every sensor on the board answers a register read with a short block of
//! bytes. The physical value is hidden inside that block as a bit field:
//!
//! ```text
//! DHT20 humidity (20 bits, big-endian, nibble aligned):
//!
//!   byte:   1          2          3
//!         ┌──────────┬──────────┬──────────┐
//!         │ HHHHHHHH │ HHHHHHHH │ HHHH TTTT│
//!         └──────────┴──────────┴──────────┘
//!           assemble 24 bits, shift right 4, mask 20 bits
//! ```
//!
//! A [`BitField`] describes where a field lives (byte offset, byte count,
//! byte order), how to cut it out of the assembled word (shift, bit width)
//! and whether it is two's complement. Extraction is a pure function and
//! fails with [`DecodeError::MalformedTransfer`] when the block is shorter
//! than the layout needs.
//!
//! ## Two's Complement
//!
//! A field of `bits` width holding an unsigned value `u` is negative when
//! `u >= 2^(bits-1)`; the signed value is `u - 2^bits`. For a 16-bit field:
//!
//! ```text
//! 0x0001 →      1
//! 0x7FFF →  32767
//! 0x8000 → -32768
//! 0xFFFF →     -1
//! ```

use crate::errors::{DecodeError, DecodeResult};

/// Byte order of a multi-byte field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
}

/// Location and interpretation of one field inside a register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Index of the first byte of the field
    pub offset: usize,
    /// Number of bytes assembled (1..=4)
    pub len: usize,
    /// Order in which the bytes are assembled
    pub order: ByteOrder,
    /// Right shift applied to the assembled word
    pub shift: u32,
    /// Width of the field after shifting
    pub bits: u32,
    /// Interpret as two's complement
    pub signed: bool,
}

impl BitField {
    /// Unsigned big-endian field spanning whole bytes
    pub const fn be(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len,
            order: ByteOrder::Big,
            shift: 0,
            bits: (len as u32) * 8,
            signed: false,
        }
    }

    /// Unsigned little-endian field spanning whole bytes
    pub const fn le(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len,
            order: ByteOrder::Little,
            shift: 0,
            bits: (len as u32) * 8,
            signed: false,
        }
    }

    /// Mark the field as two's complement
    pub const fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Keep only `bits` bits after shifting right by `shift`
    pub const fn window(mut self, shift: u32, bits: u32) -> Self {
        self.shift = shift;
        self.bits = bits;
        self
    }

    /// Number of bytes a block must hold for this field
    pub const fn required_len(&self) -> usize {
        self.offset + self.len
    }

    /// Cut the field out of `bytes`
    pub fn extract(&self, bytes: &[u8]) -> DecodeResult<i32> {
        let raw = self.extract_raw(bytes)?;
        Ok(if self.signed {
            sign_extend(raw, self.bits)
        } else {
            raw as i32
        })
    }

    /// Cut the field out of `bytes` without sign interpretation
    pub fn extract_raw(&self, bytes: &[u8]) -> DecodeResult<u32> {
        let block = require(bytes, self.required_len())?;
        let field = &block[self.offset..self.offset + self.len];

        let word = match self.order {
            ByteOrder::Big => assemble_be(field),
            ByteOrder::Little => assemble_le(field),
        };

        Ok((word >> self.shift) & mask(self.bits))
    }
}

/// Fail unless `bytes` holds at least `required` bytes
pub fn require(bytes: &[u8], required: usize) -> DecodeResult<&[u8]> {
    if bytes.len() < required {
        Err(DecodeError::MalformedTransfer {
            required,
            available: bytes.len(),
        })
    } else {
        Ok(bytes)
    }
}

/// Assemble bytes most-significant first
pub fn assemble_be(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Assemble bytes least-significant first
pub fn assemble_le(bytes: &[u8]) -> u32 {
    bytes.iter().rev().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Two's complement interpretation of the low `bits` bits of `raw`
pub fn sign_extend(raw: u32, bits: u32) -> i32 {
    debug_assert!(bits > 0 && bits <= 32);
    let raw = raw & mask(bits);
    let half = 1i64 << (bits - 1);
    let range = 1i64 << bits;

    let value = raw as i64;
    if value >= half {
        (value - range) as i32
    } else {
        value as i32
    }
}

/// Divide by `2^k`
pub fn scale_pow2(raw: i32, k: u32) -> f32 {
    (raw as f64 / (1u64 << k) as f64) as f32
}

/// Divide by a decimal resolution constant
pub fn scale_by(raw: i32, divisor: f32) -> f32 {
    raw as f32 / divisor
}

const fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}
