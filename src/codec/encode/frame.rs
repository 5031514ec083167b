use bytes::{BufMut, BytesMut};

use crate::codec::{tag, types::Frame, varint, Encode};
use crate::internal::error::Result;

/// Implements the `Encode` trait for `Frame`.
///
/// Writes Tag (continuation-bit, classification bits in byte 0), Length
/// (varint of `value.len()`), then the raw value bytes. A struct frame's value
/// is expected to already hold its encoded children.
impl Encode for Frame {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        write_frame(self, buf);
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        header_len(self.tag, self.value.len()) + self.value.len()
    }
}

/// Appends the wire form of `frame` to `buf`. Writing to a `BytesMut` cannot fail.
pub fn write_frame(frame: &Frame, buf: &mut BytesMut) {
    buf.reserve(frame.encoded_len());

    // 1. Tag
    buf.put_slice(&tag::encode_tag(frame.frame_type, frame.data_type, frame.tag));

    // 2. Length, always recomputed from the value
    buf.put_slice(&varint::encode_varint(frame.value.len() as u64));

    // 3. Value
    buf.put_slice(&frame.value);
}

/// Size of the tag and length fields for a frame.
pub fn header_len(tag_value: u64, value_len: usize) -> usize {
    tag::tag_len(tag_value) + varint::varint_len(value_len as u64)
}
