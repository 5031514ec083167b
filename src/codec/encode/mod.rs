// Encode module for the TLV wire format

pub mod frame;

use bytes::BytesMut;

use crate::codec::types::{DataType, Frame, FrameType};
use crate::codec::Encode;
use crate::internal::error::Result;

pub use frame::{header_len, write_frame};

/// Encodes a frame into a freshly allocated buffer.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>> {
    let mut buf = BytesMut::with_capacity(frame.encoded_len());
    frame.encode(&mut buf)?;
    Ok(buf.to_vec())
}

/// Encodes a Tag and Value into the TLV format (Tag + Length + Value).
pub fn encode_tlv(frame_type: FrameType, data_type: DataType, tag: u64, value: &[u8]) -> Result<Vec<u8>> {
    encode_frame(&Frame::new(frame_type, data_type, tag, bytes::Bytes::copy_from_slice(value)))
}

/// Concatenates the encodings of `frames`, producing a struct value.
pub fn encode_sequence<'a, I>(frames: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Frame>,
{
    let mut buf = BytesMut::new();
    for frame in frames {
        frame.encode(&mut buf)?;
    }
    Ok(buf.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_encode_tlv() {
        // Example: Tag 1, Value "hello"
        let encoded = encode_tlv(FrameType::Standard, DataType::Primitive, 1, b"hello").unwrap();
        assert_eq!(encoded, vec![0x01, 0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f]);
    }

    #[test]
    fn test_encode_sequence() {
        let children = vec![
            Frame::primitive(0, Bytes::from_static(&[0x0A])),
            Frame::primitive(1, Bytes::from_static(&[0xFE, 0xD4])),
        ];
        let value = encode_sequence(&children).unwrap();
        assert_eq!(value, vec![0x00, 0x01, 0x0A, 0x01, 0x02, 0xFE, 0xD4]);

        let root = Frame::new(FrameType::Standard, DataType::Struct, 0, Bytes::from(value));
        let encoded = encode_frame(&root).unwrap();
        assert_eq!(&encoded[..2], &[0x20, 0x07]);
        assert_eq!(encoded.len(), 9);
    }
}
