use crate::{bit_writer::BitWrite, error::SerdeErr};

/// A BitWrite implementation over a fixed-size, pre-sized destination buffer.
/// Writes that do not fit fail with `SerdeErr::WritePastCapacity` and leave
/// the cursor untouched. Bits fill each byte starting from the least
/// significant bit.
#[derive(Debug, Clone)]
pub struct Serializer {
    buffer: Vec<u8>,
    byte_pos: usize,
    bit_pos: u8,
}

impl Serializer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn byte_pos(&self) -> usize {
        self.byte_pos
    }

    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    pub fn bits_left(&self) -> u64 {
        self.buffer.len() as u64 * 8 - self.filled_bits()
    }

    /// Whole bytes left after the current (possibly partial) byte.
    pub fn bytes_left(&self) -> usize {
        self.buffer.len() - self.filled_bytes()
    }

    /// Advances the cursor by `count` zero bytes.
    pub fn skip_bytes(&mut self, count: usize) -> Result<(), SerdeErr> {
        self.check_capacity(count as u64 * 8)?;
        self.byte_pos += count;
        Ok(())
    }

    /// The filled part of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.filled_bytes()]
    }

    /// Consumes the serializer, returning only the filled bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let filled = self.filled_bytes();
        self.buffer.truncate(filled);
        self.buffer
    }

    fn put_bit(&mut self, bit: bool) {
        if bit {
            self.buffer[self.byte_pos] |= 1 << self.bit_pos;
        } else {
            self.buffer[self.byte_pos] &= !(1 << self.bit_pos);
        }
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }
}

impl BitWrite for Serializer {
    fn write_bits(&mut self, value: u32, bits: u8) -> Result<(), SerdeErr> {
        if bits == 0 || bits > 32 {
            return Err(SerdeErr::InvalidBitCount { bits });
        }
        self.check_capacity(u64::from(bits))?;

        let mut temp = value;
        for _ in 0..bits {
            self.put_bit(temp & 1 != 0);
            temp >>= 1;
        }
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        self.check_capacity(bytes.len() as u64 * 8)?;

        if self.bit_pos == 0 {
            let end = self.byte_pos + bytes.len();
            self.buffer[self.byte_pos..end].copy_from_slice(bytes);
            self.byte_pos = end;
        } else {
            for byte in bytes {
                let mut temp = *byte;
                for _ in 0..8 {
                    self.put_bit(temp & 1 != 0);
                    temp >>= 1;
                }
            }
        }
        Ok(())
    }

    fn check_capacity(&self, bits: u64) -> Result<(), SerdeErr> {
        let remaining_bits = self.bits_left();
        if bits > remaining_bits {
            return Err(SerdeErr::WritePastCapacity {
                requested_bits: bits,
                remaining_bits,
                capacity_bytes: self.buffer.len(),
            });
        }
        Ok(())
    }

    fn filled_bits(&self) -> u64 {
        self.byte_pos as u64 * 8 + u64::from(self.bit_pos)
    }

    fn is_counter(&self) -> bool {
        false
    }
}
