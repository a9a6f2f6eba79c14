//! Bit-level write and read primitives over byte buffers.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.
//! [BitWriter] appends, [BitReader] consumes from a monotonically advancing cursor.

use crate::errors::ReadError;

/// Append-only bit sequence used while encoding.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn write_bit(&mut self, bit: bool) {
        let bit_index = self.bit_len % 8;
        if bit_index == 0 {
            self.bytes.push(0);
        }

        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << (7 - bit_index);
            }
        }

        self.bit_len += 1;
    }

    /// Writes the low `n` bits of `value`, most significant first. `n` is at most 64.
    pub fn write_bits(&mut self, value: u64, n: usize) {
        debug_assert!(n <= 64, "cannot write more than 64 bits at once");

        for shift in (0..n).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }

    /// Returns the bytes written, zero-padded to the next byte boundary.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Cursor-addressed bit sequence used while decoding.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Current cursor position in bits.
    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    /// Bits left between the cursor and the end of the data.
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_pos
    }

    pub fn read_bit(&mut self) -> Result<bool, ReadError> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads `n` bits starting at the cursor as an unsigned value (max 64 bits). MSB-first.
    pub fn read_bits(&mut self, n: usize) -> Result<u64, ReadError> {
        if n > 64 {
            return Err(ReadError::TooManyBitsRead);
        }

        if n > self.remaining() {
            return Err(ReadError::TruncatedInput {
                bit_pos: self.bit_pos,
                needed: n,
                available: self.remaining(),
            });
        }

        let mut value = 0u64;

        for _ in 0..n {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
            value = (value << 1) | bit as u64;
            self.bit_pos += 1;
        }

        Ok(value)
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Masks `value` down to its low `bits` bits.
pub fn low_bits(value: u64, bits: usize) -> u64 {
    if bits >= 64 {
        value
    } else {
        value & ((1u64 << bits) - 1)
    }
}

/// Number of bits needed to index `count` distinct values: ⌈log₂(count)⌉.
pub fn index_width(count: usize) -> usize {
    if count <= 1 {
        0
    } else {
        (usize::BITS - (count - 1).leading_zeros()) as usize
    }
}

/// Renders bytes as one 8-character `'0'/'1'` string per byte.
pub fn bytes_to_bit_strings(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(|byte| format!("{byte:08b}")).collect()
}
