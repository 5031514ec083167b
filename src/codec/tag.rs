// Tag field codec.
//
// Byte 0: bit 7 continuation, bit 6 frame type, bit 5 data type, bits 4-0 the low
// five bits of the tag value. Each following byte carries seven more bits, low
// digits first, with the same continuation rule as a plain varint.

use bitflags::bitflags;

use crate::codec::types::{DataType, FrameType, Tag};
use crate::codec::varint::{CONTINUATION_BIT, MAX_VARINT_LEN};
use crate::internal::error::{Error, Result};

/// Bits of the tag value stored in the first tag byte.
pub const FIRST_BYTE_VALUE_BITS: u32 = 5;
/// Mask of the tag value bits in the first tag byte.
pub const FIRST_BYTE_VALUE_MASK: u8 = 0x1F;

bitflags! {
    /// Classification bits of the first tag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagFlags: u8 {
        const CONTINUATION = CONTINUATION_BIT;
        const PRIVATE = 0x40;
        const STRUCT = 0x20;
    }
}

impl TagFlags {
    /// Classification bits for a frame/data type pair.
    pub fn classify(frame_type: FrameType, data_type: DataType) -> Self {
        let mut flags = TagFlags::empty();
        if frame_type == FrameType::Private {
            flags |= TagFlags::PRIVATE;
        }
        if data_type == DataType::Struct {
            flags |= TagFlags::STRUCT;
        }
        flags
    }

    pub fn frame_type(self) -> FrameType {
        if self.contains(TagFlags::PRIVATE) {
            FrameType::Private
        } else {
            FrameType::Standard
        }
    }

    pub fn data_type(self) -> DataType {
        if self.contains(TagFlags::STRUCT) {
            DataType::Struct
        } else {
            DataType::Primitive
        }
    }
}

/// Encodes a tag field into bytes.
pub fn encode_tag(frame_type: FrameType, data_type: DataType, tag_value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(tag_len(tag_value));

    let mut first = TagFlags::classify(frame_type, data_type).bits() | (tag_value as u8 & FIRST_BYTE_VALUE_MASK);
    let mut rest = tag_value >> FIRST_BYTE_VALUE_BITS;
    if rest != 0 {
        first |= CONTINUATION_BIT;
    }
    buf.push(first);

    while rest != 0 {
        let mut byte = (rest & 0x7F) as u8;
        rest >>= 7;
        if rest != 0 {
            byte |= CONTINUATION_BIT;
        }
        buf.push(byte);
    }
    buf
}

/// Number of bytes `encode_tag` produces for `tag_value`.
pub fn tag_len(tag_value: u64) -> usize {
    let rest_bits = 64 - (tag_value >> FIRST_BYTE_VALUE_BITS).leading_zeros() as usize;
    1 + (rest_bits + 6) / 7
}

/// Decodes a tag field from the start of `data`.
/// Returns the tag and the number of bytes read.
///
/// The classification bits are masked out of a copy of the first byte; `data` is
/// never modified.
pub fn decode_tag(data: &[u8]) -> Result<(Tag, usize)> {
    let first = match data.first() {
        Some(byte) => *byte,
        None => return Err(Error::Incomplete("Empty tag field".to_string())),
    };
    let flags = TagFlags::from_bits_truncate(first);
    let mut value = (first & FIRST_BYTE_VALUE_MASK) as u64;

    if first & CONTINUATION_BIT == 0 {
        return Ok((Tag::new(flags.frame_type(), flags.data_type(), value), 1));
    }

    let mut shift = FIRST_BYTE_VALUE_BITS;
    for (i, byte) in data.iter().enumerate().skip(1) {
        if i >= MAX_VARINT_LEN {
            return Err(Error::Malformed(format!("Tag field longer than {} bytes", MAX_VARINT_LEN)));
        }
        let digit = (byte & 0x7F) as u64;
        // shift never exceeds 61 here, so at least three bits remain
        if shift + 7 > 64 && digit >> (64 - shift) != 0 {
            return Err(Error::Malformed("Tag value too large".to_string()));
        }
        value |= digit << shift;
        if byte & CONTINUATION_BIT == 0 {
            return Ok((Tag::new(flags.frame_type(), flags.data_type(), value), i + 1));
        }
        shift += 7;
    }

    Err(Error::Incomplete("Unterminated tag field".to_string()))
}
