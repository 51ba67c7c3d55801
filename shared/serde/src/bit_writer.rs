use crate::{
    error::SerdeErr,
    quantized,
    string_header::StringHeader,
    utf8,
    vle::write_vle,
};

/// Destination of the wire format.
///
/// Implementors provide bit runs and whole bytes, every typed write is built on
/// those two. Multi-part writes check the room they need up front so that a
/// failed write leaves the cursor where it was.
pub trait BitWrite {
    /// Writes the low `bits` bits of `value`, least significant bit first.
    fn write_bits(&mut self, value: u32, bits: u8) -> Result<(), SerdeErr>;
    /// Writes whole bytes.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerdeErr>;
    /// Fails when fewer than `bits` bits of room remain.
    fn check_capacity(&self, bits: u64) -> Result<(), SerdeErr>;
    /// Bits written so far.
    fn filled_bits(&self) -> u64;
    fn is_counter(&self) -> bool;

    /// Bytes written so far, a partially written byte counts as filled.
    fn filled_bytes(&self) -> usize {
        self.filled_bits().div_ceil(8) as usize
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), SerdeErr> {
        self.write_bits(u32::from(bit), 1)
    }

    fn write_bool(&mut self, value: bool) -> Result<(), SerdeErr> {
        self.write_u8(u8::from(value))
    }

    fn write_u8(&mut self, value: u8) -> Result<(), SerdeErr> {
        self.write_bytes(&[value])
    }

    fn write_i8(&mut self, value: i8) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_u16(&mut self, value: u16) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_f32(&mut self, value: f32) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_f64(&mut self, value: f64) -> Result<(), SerdeErr> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_vle(&mut self, value: u32) -> Result<(), SerdeErr> {
        write_vle(self, value)
    }

    /// Writes a UTF-8 string behind a byte-length header.
    fn write_string(&mut self, value: &str, header: StringHeader) -> Result<(), SerdeErr> {
        let bytes = value.as_bytes();
        let header_bytes = header.size_bytes(bytes.len())?;
        self.check_capacity((header_bytes + bytes.len()) as u64 * 8)?;
        write_length(self, bytes.len(), header)?;
        self.write_bytes(bytes)
    }

    fn write_string_u8(&mut self, value: &str) -> Result<(), SerdeErr> {
        self.write_string(value, StringHeader::U8)
    }

    fn write_string_u16(&mut self, value: &str) -> Result<(), SerdeErr> {
        self.write_string(value, StringHeader::U16)
    }

    fn write_string_u32(&mut self, value: &str) -> Result<(), SerdeErr> {
        self.write_string(value, StringHeader::U32)
    }

    fn write_string_vle(&mut self, value: &str) -> Result<(), SerdeErr> {
        self.write_string(value, StringHeader::Vle)
    }

    /// Writes a string with one byte per character.
    fn write_string_latin1(&mut self, value: &str, header: StringHeader) -> Result<(), SerdeErr> {
        let mut bytes = Vec::with_capacity(value.len());
        for c in value.chars() {
            let byte = u8::try_from(u32::from(c)).map_err(|_| SerdeErr::NotLatin1 {
                code_point: u32::from(c),
            })?;
            bytes.push(byte);
        }
        let header_bytes = header.size_bytes(bytes.len())?;
        self.check_capacity((header_bytes + bytes.len()) as u64 * 8)?;
        write_length(self, bytes.len(), header)?;
        self.write_bytes(&bytes)
    }

    /// Writes one code point in the 1 to 6 byte legacy form.
    fn write_code_point(&mut self, code_point: u32) -> Result<(), SerdeErr> {
        let mut bytes = Vec::with_capacity(6);
        utf8::encode_code_point(code_point, &mut bytes);
        self.write_bytes(&bytes)
    }

    /// Writes `value` quantized to `bits` bits spread evenly over `[min, max]`.
    /// Returns the written bit pattern.
    fn write_quantized_float(
        &mut self,
        min: f32,
        max: f32,
        bits: u8,
        value: f32,
    ) -> Result<u32, SerdeErr> {
        let pattern = quantized::quantize(min, max, bits, value)?;
        self.write_bits(pattern, bits)?;
        Ok(pattern)
    }

    fn write_unsigned_fixed_point(
        &mut self,
        integer_bits: u8,
        fraction_bits: u8,
        value: f32,
    ) -> Result<u32, SerdeErr> {
        let pattern = quantized::unsigned_fixed_point(integer_bits, fraction_bits, value)?;
        self.write_bits(pattern, integer_bits + fraction_bits)?;
        Ok(pattern)
    }

    fn write_signed_fixed_point(
        &mut self,
        integer_bits: u8,
        fraction_bits: u8,
        value: f32,
    ) -> Result<u32, SerdeErr> {
        let pattern = quantized::signed_fixed_point(integer_bits, fraction_bits, value)?;
        self.write_bits(pattern, integer_bits + fraction_bits)?;
        Ok(pattern)
    }

    /// Packs `(value, max)` pairs into one `bits` wide integer, first pair most significant.
    fn write_arithmetic_encoded(&mut self, bits: u8, values: &[(u32, u32)]) -> Result<(), SerdeErr> {
        let packed = quantized::arithmetic_encode(values)?;
        self.write_bits(packed, bits)
    }

    /// Writes a unit direction as quantized yaw and pitch, +Y is up.
    fn write_normalized_vector3(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        yaw_bits: u8,
        pitch_bits: u8,
    ) -> Result<(), SerdeErr> {
        self.check_capacity(u64::from(yaw_bits) + u64::from(pitch_bits))?;
        let (azimuth, inclination) = quantized::to_spherical(x, y, z);
        self.write_quantized_float(-std::f32::consts::PI, std::f32::consts::PI, yaw_bits, azimuth)?;
        self.write_quantized_float(
            -std::f32::consts::FRAC_PI_2,
            std::f32::consts::FRAC_PI_2,
            pitch_bits,
            inclination,
        )?;
        Ok(())
    }
}

fn write_length(
    writer: &mut (impl BitWrite + ?Sized),
    len: usize,
    header: StringHeader,
) -> Result<(), SerdeErr> {
    // size_bytes() has already checked that len fits the header
    match header {
        StringHeader::U8 => writer.write_u8(len as u8),
        StringHeader::U16 => writer.write_u16(len as u16),
        StringHeader::U32 => writer.write_u32(len as u32),
        StringHeader::Vle => writer.write_vle(len as u32),
    }
}

/// Counts the bits a sequence of writes would take without storing them.
///
/// Used to size a `Serializer` before the real write.
#[derive(Debug, Default, Clone)]
pub struct BitCounter {
    bits: u64,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> u64 {
        self.bits
    }

    pub fn bytes_needed(&self) -> usize {
        self.bits.div_ceil(8) as usize
    }
}

impl BitWrite for BitCounter {
    fn write_bits(&mut self, _value: u32, bits: u8) -> Result<(), SerdeErr> {
        if bits == 0 || bits > 32 {
            return Err(SerdeErr::InvalidBitCount { bits });
        }
        self.bits += u64::from(bits);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        self.bits += bytes.len() as u64 * 8;
        Ok(())
    }

    fn check_capacity(&self, _bits: u64) -> Result<(), SerdeErr> {
        Ok(())
    }

    fn filled_bits(&self) -> u64 {
        self.bits
    }

    fn is_counter(&self) -> bool {
        true
    }
}
