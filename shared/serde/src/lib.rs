//! # Tundra Serde
//! Bit-level reader and writer for the Tundra wire protocol.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
pub mod quantized;
mod serde;
mod serializer;
mod string_header;
pub mod utf8;
mod vle;

pub use bit_reader::Deserializer;
pub use bit_writer::{BitCounter, BitWrite};
pub use error::SerdeErr;
pub use serde::{ConstBitLength, Serde};
pub use serializer::Serializer;
pub use string_header::StringHeader;
pub use utf8::utf8_byte_size;
pub use vle::{vle_size_bytes, Vle, VLE_MAX_VALUE};
