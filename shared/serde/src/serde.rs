use crate::{bit_reader::Deserializer, bit_writer::BitWrite, error::SerdeErr};

/// A value with a self-contained wire form.
pub trait Serde: Sized {
    /// Writes the value.
    fn ser(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr>;

    /// Reads a value written by `ser`.
    fn de(reader: &mut Deserializer) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write.
    fn bit_length(&self) -> u32;
}

/// Types whose wire form always has the same length.
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}

macro_rules! impl_fixed_width {
    ($type:ty, $write:ident, $read:ident) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
                writer.$write(*self)
            }

            fn de(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
                reader.$read()
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $type {
            fn const_bit_length() -> u32 {
                std::mem::size_of::<$type>() as u32 * 8
            }
        }
    };
}

impl_fixed_width!(u8, write_u8, read_u8);
impl_fixed_width!(i8, write_i8, read_i8);
impl_fixed_width!(u16, write_u16, read_u16);
impl_fixed_width!(i16, write_i16, read_i16);
impl_fixed_width!(u32, write_u32, read_u32);
impl_fixed_width!(i32, write_i32, read_i32);
impl_fixed_width!(f32, write_f32, read_f32);
impl_fixed_width!(f64, write_f64, read_f64);

// bool travels as a whole byte
impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_bool(*self)
    }

    fn de(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        reader.read_bool()
    }

    fn bit_length(&self) -> u32 {
        8
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        8
    }
}
