use crate::internal::error::{Error, Result};

/// High bit of every header byte: set while more bytes of the same field follow.
pub const CONTINUATION_BIT: u8 = 0x80;

/// Longest varint that can still carry a `u64` (ceil(64 / 7)).
pub const MAX_VARINT_LEN: usize = 10;

/// Encodes an unsigned 64-bit integer as base-128 digits, least-significant first,
/// with the continuation bit set on every byte but the last.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(varint_len(value));
    let mut value = value;

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= CONTINUATION_BIT;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
    buf
}

/// Number of bytes `encode_varint(value)` produces.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        (bits + 6) / 7
    }
}

/// Decodes an unsigned 64-bit integer from a variable-length encoded byte slice.
/// Returns the decoded value and the number of bytes read.
///
/// A slice that ends before a byte with a clear high bit yields `Error::Incomplete`.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (i, byte) in data.iter().enumerate() {
        let digit = (byte & 0x7F) as u64;
        if shift > 63 || (shift > 0 && digit >> (64 - shift) != 0) {
            return Err(Error::Malformed("Varint value too large".to_string()));
        }
        value |= digit << shift;
        if byte & CONTINUATION_BIT == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    Err(Error::Incomplete("Unterminated varint".to_string()))
}

/// Finds the length of the continuation-bit field starting at `data[0]`.
///
/// Returns the byte count up to and including the first byte with a clear high bit,
/// or `None` when every byte present has the bit set.
pub fn field_len(data: &[u8]) -> Option<usize> {
    data.iter()
        .position(|byte| byte & CONTINUATION_BIT == 0)
        .map(|pos| pos + 1)
}
