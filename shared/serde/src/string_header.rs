use crate::{error::SerdeErr, vle::vle_size_bytes};

/// Width of the byte-length header in front of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringHeader {
    U8,
    U16,
    U32,
    /// Variable length header: 1, 2 or 4 bytes depending on the length
    Vle,
}

impl StringHeader {
    /// Header size in bytes for a string of `byte_len` encoded bytes.
    pub fn size_bytes(&self, byte_len: usize) -> Result<usize, SerdeErr> {
        let fits = match self {
            StringHeader::U8 => byte_len <= usize::from(u8::MAX),
            StringHeader::U16 => byte_len <= usize::from(u16::MAX),
            StringHeader::U32 => u32::try_from(byte_len).is_ok(),
            StringHeader::Vle => byte_len <= crate::vle::VLE_MAX_VALUE as usize,
        };
        if !fits {
            return Err(SerdeErr::StringTooLong {
                byte_len,
                header_bytes: self.max_size_bytes(),
            });
        }
        Ok(match self {
            StringHeader::U8 => 1,
            StringHeader::U16 => 2,
            StringHeader::U32 => 4,
            StringHeader::Vle => vle_size_bytes(byte_len as u32),
        })
    }

    fn max_size_bytes(&self) -> u8 {
        match self {
            StringHeader::U8 => 1,
            StringHeader::U16 => 2,
            StringHeader::U32 | StringHeader::Vle => 4,
        }
    }
}
