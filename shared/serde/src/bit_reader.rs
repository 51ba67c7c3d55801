use crate::{
    error::SerdeErr,
    quantized::{self, PITCH_RANGE, YAW_RANGE},
    string_header::StringHeader,
    utf8,
    vle::read_vle,
};

/// Sequential reader over one message's bytes.
///
/// The cursor is `(byte_pos, bit_pos)`. Fixed-width reads take a direct byte
/// path when `bit_pos == 0` and assemble bit by bit otherwise. A failed read
/// leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct Deserializer<'b> {
    buffer: &'b [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'b> Deserializer<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Starts reading at byte `offset`, clamped to the buffer length.
    pub fn with_offset(buffer: &'b [u8], offset: usize) -> Self {
        Self {
            buffer,
            byte_pos: offset.min(buffer.len()),
            bit_pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn byte_pos(&self) -> usize {
        self.byte_pos
    }

    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    pub fn bits_left(&self) -> u64 {
        (self.buffer.len() - self.byte_pos) as u64 * 8 - u64::from(self.bit_pos)
    }

    /// Whole bytes left, a partially read byte counts as consumed.
    pub fn bytes_left(&self) -> usize {
        (self.bits_left() / 8) as usize
    }

    /// Bytes consumed so far, a partially read byte counts as consumed.
    pub fn read_bytes_count(&self) -> usize {
        self.byte_pos + usize::from(self.bit_pos > 0)
    }

    fn check_remaining(&self, bits: u64) -> Result<(), SerdeErr> {
        let remaining_bits = self.bits_left();
        if bits > remaining_bits {
            return Err(SerdeErr::ReadPastEnd {
                requested_bits: bits,
                remaining_bits,
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let bit = (self.buffer[self.byte_pos] >> self.bit_pos) & 1 != 0;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        bit
    }

    /// Reads `bits` bits, least significant first, into the low bits of the result.
    pub fn read_bits(&mut self, bits: u8) -> Result<u32, SerdeErr> {
        if bits == 0 || bits > 32 {
            return Err(SerdeErr::InvalidBitCount { bits });
        }
        self.check_remaining(u64::from(bits))?;

        let mut value: u32 = 0;
        for i in 0..bits {
            if self.take_bit() {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        Ok(self.read_bits(1)? == 1)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        self.check_remaining(N as u64 * 8)?;
        let mut out = [0u8; N];
        if self.bit_pos == 0 {
            out.copy_from_slice(&self.buffer[self.byte_pos..self.byte_pos + N]);
            self.byte_pos += N;
        } else {
            for byte in out.iter_mut() {
                for i in 0..8 {
                    if self.take_bit() {
                        *byte |= 1 << i;
                    }
                }
            }
        }
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, SerdeErr> {
        Ok(i8::from_le_bytes(self.read_array::<1>()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, SerdeErr> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, SerdeErr> {
        Ok(i16::from_le_bytes(self.read_array::<2>()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerdeErr> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Two's complement reinterpretation of a `u32` read.
    pub fn read_i32(&mut self) -> Result<i32, SerdeErr> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, SerdeErr> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, SerdeErr> {
        Ok(f64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Any nonzero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, SerdeErr> {
        Ok(self.read_u8()? > 0)
    }

    pub fn read_vle(&mut self) -> Result<u32, SerdeErr> {
        let start = (self.byte_pos, self.bit_pos);
        read_vle(self).inspect_err(|_| {
            (self.byte_pos, self.bit_pos) = start;
        })
    }

    /// Copies `count` bytes out of the buffer.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        self.check_remaining(count as u64 * 8)?;
        if self.bit_pos == 0 {
            let bytes = self.buffer[self.byte_pos..self.byte_pos + count].to_vec();
            self.byte_pos += count;
            return Ok(bytes);
        }
        let mut bytes = Vec::with_capacity(count);
        for _ in 0..count {
            bytes.push(self.read_u8()?);
        }
        Ok(bytes)
    }

    /// Borrows `count` bytes. Needs a byte-aligned cursor.
    pub fn read_slice(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        if self.bit_pos != 0 {
            return Err(SerdeErr::Unaligned {
                bit_pos: self.bit_pos,
            });
        }
        self.check_remaining(count as u64 * 8)?;
        let slice = &self.buffer[self.byte_pos..self.byte_pos + count];
        self.byte_pos += count;
        Ok(slice)
    }

    /// Splits the next `count` bytes off into an independent reader.
    pub fn sub_reader(&mut self, count: usize) -> Result<Deserializer<'b>, SerdeErr> {
        Ok(Deserializer::new(self.read_slice(count)?))
    }

    /// Everything from the cursor to the end of the buffer.
    pub fn read_remaining(&mut self) -> Result<&'b [u8], SerdeErr> {
        let count = self.bytes_left();
        self.read_slice(count)
    }

    pub fn skip_bytes(&mut self, count: usize) -> Result<(), SerdeErr> {
        self.check_remaining(count as u64 * 8)?;
        self.byte_pos += count;
        Ok(())
    }

    fn read_length(&mut self, header: StringHeader) -> Result<usize, SerdeErr> {
        Ok(match header {
            StringHeader::U8 => usize::from(self.read_u8()?),
            StringHeader::U16 => usize::from(self.read_u16()?),
            StringHeader::U32 => self.read_u32()? as usize,
            StringHeader::Vle => self.read_vle()? as usize,
        })
    }

    /// Reads `byte_len` bytes as a UTF-8 string (1 to 6 byte forms accepted).
    pub fn read_utf8(&mut self, byte_len: usize) -> Result<String, SerdeErr> {
        let start = (self.byte_pos, self.bit_pos);
        let bytes = self.read_bytes(byte_len)?;
        utf8::decode(&bytes).inspect_err(|_| {
            (self.byte_pos, self.bit_pos) = start;
        })
    }

    /// Reads a UTF-8 string behind a byte-length header.
    pub fn read_string(&mut self, header: StringHeader) -> Result<String, SerdeErr> {
        let start = (self.byte_pos, self.bit_pos);
        let result = self
            .read_length(header)
            .and_then(|byte_len| self.read_utf8(byte_len));
        if result.is_err() {
            (self.byte_pos, self.bit_pos) = start;
        }
        result
    }

    pub fn read_string_u8(&mut self) -> Result<String, SerdeErr> {
        self.read_string(StringHeader::U8)
    }

    pub fn read_string_u16(&mut self) -> Result<String, SerdeErr> {
        self.read_string(StringHeader::U16)
    }

    pub fn read_string_u32(&mut self) -> Result<String, SerdeErr> {
        self.read_string(StringHeader::U32)
    }

    pub fn read_string_vle(&mut self) -> Result<String, SerdeErr> {
        self.read_string(StringHeader::Vle)
    }

    /// Reads a string with one byte per character behind a length header.
    pub fn read_string_latin1(&mut self, header: StringHeader) -> Result<String, SerdeErr> {
        let start = (self.byte_pos, self.bit_pos);
        let result = self
            .read_length(header)
            .and_then(|byte_len| self.read_bytes(byte_len));
        match result {
            Ok(bytes) => Ok(bytes.into_iter().map(char::from).collect()),
            Err(err) => {
                (self.byte_pos, self.bit_pos) = start;
                Err(err)
            }
        }
    }

    /// Reads single-byte characters up to (not including) `delimiter` or the end.
    /// The delimiter itself is consumed.
    pub fn read_string_until(&mut self, delimiter: u8) -> Result<String, SerdeErr> {
        let mut output = String::new();
        while self.bits_left() >= 8 {
            let byte = self.read_u8()?;
            if byte == delimiter {
                break;
            }
            output.push(char::from(byte));
        }
        Ok(output)
    }

    pub fn read_quantized_float(&mut self, min: f32, max: f32, bits: u8) -> Result<f32, SerdeErr> {
        let pattern = self.read_bits(bits)?;
        Ok(quantized::dequantize(min, max, bits, pattern))
    }

    pub fn read_unsigned_fixed_point(
        &mut self,
        integer_bits: u8,
        fraction_bits: u8,
    ) -> Result<f32, SerdeErr> {
        let pattern = self.read_bits(integer_bits + fraction_bits)?;
        Ok(quantized::from_unsigned_fixed_point(fraction_bits, pattern))
    }

    pub fn read_signed_fixed_point(
        &mut self,
        integer_bits: u8,
        fraction_bits: u8,
    ) -> Result<f32, SerdeErr> {
        let pattern = self.read_bits(integer_bits + fraction_bits)?;
        Ok(quantized::from_signed_fixed_point(
            integer_bits,
            fraction_bits,
            pattern,
        ))
    }

    pub fn read_arithmetic_encoded(&mut self, bits: u8, maxes: &[u32]) -> Result<Vec<u32>, SerdeErr> {
        let packed = self.read_bits(bits)?;
        quantized::arithmetic_decode(packed, maxes)
    }

    /// Reads a unit 2D direction stored as a quantized polar angle.
    pub fn read_normalized_vector2(&mut self, bits: u8) -> Result<(f32, f32), SerdeErr> {
        let angle = self.read_quantized_float(YAW_RANGE.0, YAW_RANGE.1, bits)?;
        Ok((angle.cos(), angle.sin()))
    }

    /// Reads a unit 3D direction stored as quantized yaw and pitch, +Y is up.
    pub fn read_normalized_vector3(
        &mut self,
        yaw_bits: u8,
        pitch_bits: u8,
    ) -> Result<(f32, f32, f32), SerdeErr> {
        self.check_remaining(u64::from(yaw_bits) + u64::from(pitch_bits))?;
        let azimuth = self.read_quantized_float(YAW_RANGE.0, YAW_RANGE.1, yaw_bits)?;
        let inclination = self.read_quantized_float(PITCH_RANGE.0, PITCH_RANGE.1, pitch_bits)?;
        Ok(quantized::from_spherical(azimuth, inclination))
    }

    /// Reads a 3D vector as fixed point length plus quantized direction.
    /// The direction is absent from the stream when the length bits are zero.
    pub fn read_vector3(
        &mut self,
        yaw_bits: u8,
        pitch_bits: u8,
        integer_bits: u8,
        fraction_bits: u8,
    ) -> Result<(f32, f32, f32), SerdeErr> {
        let pattern = self.read_bits(integer_bits + fraction_bits)?;
        if pattern == 0 {
            return Ok((0.0, 0.0, 0.0));
        }
        let length = quantized::from_unsigned_fixed_point(fraction_bits, pattern);
        let (x, y, z) = self.read_normalized_vector3(yaw_bits, pitch_bits)?;
        Ok((x * length, y * length, z * length))
    }
}
