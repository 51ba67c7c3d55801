//! UTF-8 helpers compatible with the legacy encoder.
//!
//! The legacy encoder emits the original (pre RFC 3629) 1 to 6 byte forms and
//! encodes UTF-16 surrogate halves separately. Decoding accepts all of it.
//! Encoding always produces standard UTF-8, which is a subset.

use crate::error::SerdeErr;

const REPLACEMENT: char = '\u{FFFD}';

/// Number of bytes the legacy encoder uses for a code point.
pub fn code_point_byte_size(code_point: u32) -> usize {
    if code_point < 0x80 {
        1
    } else if code_point < 0x800 {
        2
    } else if code_point < 0x1_0000 {
        3
    } else if code_point < 0x20_0000 {
        4
    } else if code_point < 0x400_0000 {
        5
    } else {
        6
    }
}

/// Encoded byte length of a string, which is what the length headers carry.
pub fn utf8_byte_size(value: &str) -> usize {
    value.len()
}

/// Appends the 1 to 6 byte encoding of `code_point`.
pub fn encode_code_point(code_point: u32, out: &mut Vec<u8>) {
    let continuation = |shift: u32| 0x80 | ((code_point >> shift) & 0x3f) as u8;
    match code_point_byte_size(code_point) {
        1 => out.push(code_point as u8),
        2 => {
            out.push(0xc0 | ((code_point >> 6) & 0x1f) as u8);
            out.push(continuation(0));
        }
        3 => {
            out.push(0xe0 | ((code_point >> 12) & 0x0f) as u8);
            out.push(continuation(6));
            out.push(continuation(0));
        }
        4 => {
            out.push(0xf0 | ((code_point >> 18) & 0x07) as u8);
            out.push(continuation(12));
            out.push(continuation(6));
            out.push(continuation(0));
        }
        5 => {
            out.push(0xf8 | ((code_point >> 24) & 0x03) as u8);
            out.push(continuation(18));
            out.push(continuation(12));
            out.push(continuation(6));
            out.push(continuation(0));
        }
        _ => {
            out.push(0xfc | ((code_point >> 30) & 0x01) as u8);
            out.push(continuation(24));
            out.push(continuation(18));
            out.push(continuation(12));
            out.push(continuation(6));
            out.push(continuation(0));
        }
    }
}

/// Decodes one code point starting at `bytes[position]`.
/// Returns the code point and the number of bytes consumed.
fn decode_code_point(bytes: &[u8], position: usize) -> Result<(u32, usize), SerdeErr> {
    let lead = bytes[position];
    let (len, lead_mask): (usize, u8) = if lead < 0x80 {
        return Ok((u32::from(lead), 1));
    } else if lead < 0xe0 {
        (2, 0x1f)
    } else if lead < 0xf0 {
        (3, 0x0f)
    } else if lead < 0xf8 {
        (4, 0x07)
    } else if lead < 0xfc {
        (5, 0x03)
    } else {
        (6, 0x01)
    };

    if position + len > bytes.len() {
        return Err(SerdeErr::InvalidUtf8 { position });
    }

    let mut code_point = u32::from(lead & lead_mask);
    for byte in &bytes[position + 1..position + len] {
        code_point = (code_point << 6) | u32::from(byte & 0x3f);
    }
    Ok((code_point, len))
}

/// Decodes a legacy encoded byte string.
///
/// Surrogate pairs are joined, lone surrogates and code points above U+10FFFF
/// become U+FFFD.
pub fn decode(bytes: &[u8]) -> Result<String, SerdeErr> {
    let mut output = String::with_capacity(bytes.len());
    let mut position = 0;
    let mut pending_high: Option<u32> = None;

    while position < bytes.len() {
        let (code_point, len) = decode_code_point(bytes, position)?;
        position += len;

        if let Some(high) = pending_high.take() {
            if (0xdc00..=0xdfff).contains(&code_point) {
                let joined = 0x1_0000 + ((high - 0xd800) << 10) + (code_point - 0xdc00);
                output.push(char::from_u32(joined).unwrap_or(REPLACEMENT));
                continue;
            }
            output.push(REPLACEMENT);
        }

        if (0xd800..=0xdbff).contains(&code_point) {
            pending_high = Some(code_point);
            continue;
        }

        match char::from_u32(code_point) {
            Some(c) => output.push(c),
            None => {
                log::debug!("replacing code point {:#x} outside the unicode range", code_point);
                output.push(REPLACEMENT);
            }
        }
    }

    if pending_high.is_some() {
        output.push(REPLACEMENT);
    }

    Ok(output)
}
