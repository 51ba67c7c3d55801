use thiserror::Error;

/// Errors that can occur while reading or writing the wire format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// A read needed more bits than the buffer still holds
    #[error("Read past end of buffer: requested {requested_bits} bits but only {remaining_bits} bits remain")]
    ReadPastEnd {
        requested_bits: u64,
        remaining_bits: u64,
    },

    /// A write needed more room than the fixed-size destination has left
    #[error("Write past capacity: requested {requested_bits} bits but only {remaining_bits} bits of {capacity_bytes} byte buffer remain")]
    WritePastCapacity {
        requested_bits: u64,
        remaining_bits: u64,
        capacity_bytes: usize,
    },

    /// Bit runs must be between 1 and 32 bits wide
    #[error("Invalid bit count {bits}, bit runs must be between 1 and 32 bits")]
    InvalidBitCount {
        bits: u8,
    },

    /// Value does not fit the three-tier variable length encoding
    #[error("Value {value} is too large for VLE encoding, maximum is 1073741823")]
    VleOverflow {
        value: u32,
    },

    /// Encoded string length does not fit in the selected length header
    #[error("String of {byte_len} bytes does not fit a {header_bytes} byte length header")]
    StringTooLong {
        byte_len: usize,
        header_bytes: u8,
    },

    /// A multi-byte UTF-8 sequence ran past the string's byte length
    #[error("Truncated UTF-8 sequence at byte {position} of string")]
    InvalidUtf8 {
        position: usize,
    },

    /// Character does not fit into one byte of a latin-1 string
    #[error("Character U+{code_point:04X} cannot be written as a single byte string character")]
    NotLatin1 {
        code_point: u32,
    },

    /// Nested readers and borrowed slices need a byte-aligned cursor
    #[error("Cannot borrow bytes from an unaligned cursor (bit offset {bit_pos})")]
    Unaligned {
        bit_pos: u8,
    },

    /// Quantization parameters are out of range
    #[error("Invalid quantization: {reason}")]
    InvalidQuantization {
        reason: &'static str,
    },
}
