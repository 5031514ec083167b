// Codec module for the continuation-bit TLV wire format

pub mod encode;
pub mod decode;
pub mod tag;
pub mod varint;
pub mod types;

use bytes::BytesMut;

use crate::internal::error::Result;

/// Serializes a value in wire form.
pub trait Encode {
    /// Appends the encoded bytes to `buf`.
    fn encode(&self, buf: &mut BytesMut) -> Result<()>;

    /// Number of bytes `encode` appends.
    fn encoded_len(&self) -> usize;
}

/// Deserializes a value from the front of a byte slice.
pub trait Decode: Sized {
    /// Decodes one value from the start of `data`.
    /// Returns the value and the number of bytes read; trailing bytes are left alone.
    fn decode(data: &[u8]) -> Result<(Self, usize)>;
}
