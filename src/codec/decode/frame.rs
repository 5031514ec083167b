use bytes::Bytes;

use crate::codec::{tag::decode_tag, types::{Frame, Tag}, varint::decode_varint, Decode};
use crate::internal::error::{Error, Result};

/// Tag and length fields of a frame, without its value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FrameHeader {
    pub tag: Tag,
    /// Bytes taken by the tag and length fields together.
    pub header_len: usize,
    /// Declared byte length of the value field.
    pub value_len: usize,
}

impl FrameHeader {
    /// Total span of the frame: header plus value.
    pub fn frame_len(&self) -> usize {
        self.header_len + self.value_len
    }
}

/// Decodes the tag and length fields at the start of `data`.
///
/// Returns `Error::Incomplete` when either field is unterminated. The value bytes
/// are not required to be present.
pub fn decode_header(data: &[u8]) -> Result<FrameHeader> {
    let (tag, tag_bytes) = decode_tag(data)?;
    let (length, length_bytes) = decode_varint(&data[tag_bytes..])?;
    let value_len = usize::try_from(length)
        .map_err(|_| Error::Malformed(format!("Declared length {} does not fit in memory", length)))?;

    Ok(FrameHeader {
        tag,
        header_len: tag_bytes + length_bytes,
        value_len,
    })
}

/// Decodes one frame from the start of `data` without copying its value.
/// Returns the frame and the number of bytes read.
pub fn decode_frame_bytes(data: &Bytes) -> Result<(Frame, usize)> {
    let header = decode_header(data)?;
    let end = header
        .header_len
        .checked_add(header.value_len)
        .ok_or_else(|| Error::Malformed("Frame span overflows".to_string()))?;
    if data.len() < end {
        return Err(Error::Incomplete(format!(
            "Incomplete data for Value. Expected {} bytes, got {}",
            header.value_len,
            data.len() - header.header_len
        )));
    }

    let frame = Frame::new(
        header.tag.frame_type,
        header.tag.data_type,
        header.tag.value,
        data.slice(header.header_len..end),
    );
    Ok((frame, end))
}

/// Implements the `Decode` trait for `Frame`.
///
/// Only the outer frame is decoded; a struct value is kept as raw bytes.
impl Decode for Frame {
    fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let header = decode_header(data)?;
        let available = data.len() - header.header_len;
        if available < header.value_len {
            return Err(Error::Incomplete(format!(
                "Incomplete data for Value. Expected {} bytes, got {}",
                header.value_len, available
            )));
        }
        let end = header.frame_len();
        let value = Bytes::copy_from_slice(&data[header.header_len..end]);

        Ok((
            Frame::new(header.tag.frame_type, header.tag.data_type, header.tag.value, value),
            end,
        ))
    }
}
