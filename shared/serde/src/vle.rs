//! Three-tier variable length encoding for unsigned integers.
//!
//! Layout on the wire (bytes in order):
//!
//! | value range          | bytes | layout                                                       |
//! |----------------------|-------|--------------------------------------------------------------|
//! | `0..0x80`            | 1     | `v`                                                          |
//! | `0x80..0x4000`       | 2     | `(v & 0x7f) \| 0x80`, `v >> 7`                               |
//! | `0x4000..0x4000_0000`| 4     | `(v & 0x7f) \| 0x80`, `((v >> 7) & 0x7f) \| 0x80`, u16 LE `v >> 14` |
//!
//! The high bit of each of the first two bytes is the continuation flag.

use crate::{bit_reader::Deserializer, bit_writer::BitWrite, error::SerdeErr, serde::Serde};

/// Largest value the encoding can carry (30 bits).
pub const VLE_MAX_VALUE: u32 = (1 << 30) - 1;

const CONTINUATION: u8 = 0x80;
const LOW_MASK: u32 = 0x7f;

/// Encoded size of `value` in bytes.
pub fn vle_size_bytes(value: u32) -> usize {
    if value < 0x80 {
        1
    } else if value < 0x4000 {
        2
    } else {
        4
    }
}

pub(crate) fn write_vle(writer: &mut (impl BitWrite + ?Sized), value: u32) -> Result<(), SerdeErr> {
    if value > VLE_MAX_VALUE {
        return Err(SerdeErr::VleOverflow { value });
    }
    writer.check_capacity(vle_size_bytes(value) as u64 * 8)?;

    if value < 0x80 {
        writer.write_u8(value as u8)
    } else if value < 0x4000 {
        writer.write_u8((value & LOW_MASK) as u8 | CONTINUATION)?;
        writer.write_u8((value >> 7) as u8)
    } else {
        writer.write_u8((value & LOW_MASK) as u8 | CONTINUATION)?;
        writer.write_u8(((value >> 7) & LOW_MASK) as u8 | CONTINUATION)?;
        writer.write_u16((value >> 14) as u16)
    }
}

pub(crate) fn read_vle(reader: &mut Deserializer) -> Result<u32, SerdeErr> {
    let low = reader.read_u8()?;
    if low & CONTINUATION == 0 {
        return Ok(u32::from(low));
    }
    let mid = reader.read_u8()?;
    let value = u32::from(low & 0x7f) | (u32::from(mid & 0x7f) << 7);
    if mid & CONTINUATION == 0 {
        return Ok(value);
    }
    let high = reader.read_u16()?;
    Ok(value | (u32::from(high) << 14))
}

/// Serde wrapper for a VLE encoded `u32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vle(pub u32);

impl Serde for Vle {
    fn ser(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        write_vle(writer, self.0)
    }

    fn de(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        read_vle(reader).map(Vle)
    }

    fn bit_length(&self) -> u32 {
        vle_size_bytes(self.0) as u32 * 8
    }
}
