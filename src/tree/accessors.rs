// Typed get/put accessors for TlvNode.
//
// Integers are big-endian and fixed width. A getter first resolves the child
// (Error::NotFound), then checks the value shape (Error::TypeMismatch).

use bytes::Bytes;
use byteorder::{BigEndian, ByteOrder};

use crate::codec::types::{DataType, Frame, FrameType};
use crate::internal::error::{Error, Result};
use crate::tree::TlvNode;

impl TlvNode {
    /// Resolves a primitive child and checks its width.
    fn primitive_value(&self, tag: u64, expected: &'static str, width: Option<usize>) -> Result<&Bytes> {
        let child = self.get(tag).ok_or(Error::NotFound(tag))?;
        if child.is_struct() {
            return Err(Error::TypeMismatch {
                tag,
                expected: expected.to_string(),
                actual: "struct".to_string(),
            });
        }
        let value = child.value();
        match width {
            Some(width) if value.len() != width => Err(Error::TypeMismatch {
                tag,
                expected: expected.to_string(),
                actual: format!("{} bytes", value.len()),
            }),
            _ => Ok(value),
        }
    }

    /// Reads a one-byte boolean; any value with the low bit set is `true`.
    pub fn get_bool(&self, tag: u64) -> Result<bool> {
        let value = self.primitive_value(tag, "bool (1 byte)", Some(1))?;
        Ok(value[0] & 0x01 != 0)
    }

    pub fn get_i8(&self, tag: u64) -> Result<i8> {
        let value = self.primitive_value(tag, "i8 (1 byte)", Some(1))?;
        Ok(value[0] as i8)
    }

    pub fn get_u8(&self, tag: u64) -> Result<u8> {
        let value = self.primitive_value(tag, "u8 (1 byte)", Some(1))?;
        Ok(value[0])
    }

    pub fn get_i16(&self, tag: u64) -> Result<i16> {
        let value = self.primitive_value(tag, "i16 (2 bytes)", Some(2))?;
        Ok(BigEndian::read_i16(value))
    }

    pub fn get_u16(&self, tag: u64) -> Result<u16> {
        let value = self.primitive_value(tag, "u16 (2 bytes)", Some(2))?;
        Ok(BigEndian::read_u16(value))
    }

    pub fn get_i32(&self, tag: u64) -> Result<i32> {
        let value = self.primitive_value(tag, "i32 (4 bytes)", Some(4))?;
        Ok(BigEndian::read_i32(value))
    }

    pub fn get_u32(&self, tag: u64) -> Result<u32> {
        let value = self.primitive_value(tag, "u32 (4 bytes)", Some(4))?;
        Ok(BigEndian::read_u32(value))
    }

    pub fn get_i64(&self, tag: u64) -> Result<i64> {
        let value = self.primitive_value(tag, "i64 (8 bytes)", Some(8))?;
        Ok(BigEndian::read_i64(value))
    }

    pub fn get_u64(&self, tag: u64) -> Result<u64> {
        let value = self.primitive_value(tag, "u64 (8 bytes)", Some(8))?;
        Ok(BigEndian::read_u64(value))
    }

    /// Borrows a UTF-8 string value of any length.
    pub fn get_str(&self, tag: u64) -> Result<&str> {
        let value = self.primitive_value(tag, "string", None)?;
        std::str::from_utf8(value).map_err(|e| Error::InvalidString(format!("tag {}: {}", tag, e)))
    }

    pub fn get_string(&self, tag: u64) -> Result<String> {
        self.get_str(tag).map(str::to_owned)
    }

    /// Raw value of a primitive child.
    pub fn get_bytes(&self, tag: u64) -> Result<Bytes> {
        self.primitive_value(tag, "bytes", None).cloned()
    }

    /// Attaches `child` as a standard struct child under `tag`.
    ///
    /// Like every setter, this does not touch this node's value; call `build`.
    pub fn put(&mut self, tag: u64, mut child: TlvNode) -> &mut Self {
        child.frame.tag = tag;
        child.frame.frame_type = FrameType::Standard;
        child.frame.data_type = DataType::Struct;
        self.attach(child)
    }

    /// Attaches an already constructed node, keeping its tag and classification.
    pub fn put_node(&mut self, child: TlvNode) -> &mut Self {
        self.attach(child)
    }

    pub fn put_bool(&mut self, tag: u64, value: bool) -> &mut Self {
        self.put_primitive(tag, Bytes::copy_from_slice(&[value as u8]))
    }

    pub fn put_i8(&mut self, tag: u64, value: i8) -> &mut Self {
        self.put_primitive(tag, Bytes::copy_from_slice(&[value as u8]))
    }

    pub fn put_u8(&mut self, tag: u64, value: u8) -> &mut Self {
        self.put_primitive(tag, Bytes::copy_from_slice(&[value]))
    }

    pub fn put_i16(&mut self, tag: u64, value: i16) -> &mut Self {
        let mut buf = [0u8; 2];
        BigEndian::write_i16(&mut buf, value);
        self.put_primitive(tag, Bytes::copy_from_slice(&buf))
    }

    pub fn put_u16(&mut self, tag: u64, value: u16) -> &mut Self {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.put_primitive(tag, Bytes::copy_from_slice(&buf))
    }

    pub fn put_i32(&mut self, tag: u64, value: i32) -> &mut Self {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, value);
        self.put_primitive(tag, Bytes::copy_from_slice(&buf))
    }

    pub fn put_u32(&mut self, tag: u64, value: u32) -> &mut Self {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, value);
        self.put_primitive(tag, Bytes::copy_from_slice(&buf))
    }

    pub fn put_i64(&mut self, tag: u64, value: i64) -> &mut Self {
        let mut buf = [0u8; 8];
        BigEndian::write_i64(&mut buf, value);
        self.put_primitive(tag, Bytes::copy_from_slice(&buf))
    }

    pub fn put_u64(&mut self, tag: u64, value: u64) -> &mut Self {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, value);
        self.put_primitive(tag, Bytes::copy_from_slice(&buf))
    }

    pub fn put_string(&mut self, tag: u64, value: &str) -> &mut Self {
        self.put_primitive(tag, Bytes::copy_from_slice(value.as_bytes()))
    }

    pub fn put_bytes(&mut self, tag: u64, value: impl Into<Bytes>) -> &mut Self {
        self.put_primitive(tag, value.into())
    }

    fn put_primitive(&mut self, tag: u64, value: Bytes) -> &mut Self {
        self.attach(TlvNode::from_frame(Frame::primitive(tag, value)))
    }

    /// Children only make sense under a struct, so attaching promotes this node.
    fn attach(&mut self, child: TlvNode) -> &mut Self {
        self.frame.data_type = DataType::Struct;
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessor_fidelity() {
        let mut root = TlvNode::new(0);
        root.put_i32(2, 655354);

        assert_eq!(root.get_i32(2).unwrap(), 655354);
        assert!(matches!(root.get_i16(2), Err(Error::TypeMismatch { tag: 2, .. })));
        assert!(root.get(99).is_none());
        assert!(matches!(root.get_i32(99), Err(Error::NotFound(99))));
    }

    #[test]
    fn test_integer_round_trips() {
        let mut root = TlvNode::new(0);
        root.put_i8(0, 10)
            .put_i16(1, -300)
            .put_i32(2, i32::MIN)
            .put_i64(3, 65535400)
            .put_u8(4, 0xFF)
            .put_u16(5, 0xBEEF)
            .put_u32(6, u32::MAX)
            .put_u64(7, u64::MAX - 1);

        assert_eq!(root.get_i8(0).unwrap(), 10);
        assert_eq!(root.get_i16(1).unwrap(), -300);
        assert_eq!(root.get_i32(2).unwrap(), i32::MIN);
        assert_eq!(root.get_i64(3).unwrap(), 65535400);
        assert_eq!(root.get_u8(4).unwrap(), 0xFF);
        assert_eq!(root.get_u16(5).unwrap(), 0xBEEF);
        assert_eq!(root.get_u32(6).unwrap(), u32::MAX);
        assert_eq!(root.get_u64(7).unwrap(), u64::MAX - 1);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut root = TlvNode::new(0);
        root.put_i16(1, -300).put_u32(2, 0x01020304);
        assert_eq!(root.get(1).unwrap().value().as_ref(), &[0xFE, 0xD4]);
        assert_eq!(root.get(2).unwrap().value().as_ref(), &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_bool_low_bit() {
        let mut root = TlvNode::new(0);
        root.put_bool(0, true)
            .put_bool(1, false)
            .put_bytes(2, Bytes::from_static(&[0x03]))
            .put_bytes(3, Bytes::from_static(&[0x02]));
        assert!(root.get_bool(0).unwrap());
        assert!(!root.get_bool(1).unwrap());
        assert!(root.get_bool(2).unwrap());
        assert!(!root.get_bool(3).unwrap());
    }

    #[test]
    fn test_strings() {
        let mut root = TlvNode::new(0);
        root.put_string(4, "hello world")
            .put_string(5, "")
            .put_bytes(6, Bytes::from_static(&[0xFF, 0xFE]));
        assert_eq!(root.get_str(4).unwrap(), "hello world");
        assert_eq!(root.get_string(5).unwrap(), "");
        assert!(matches!(root.get_string(6), Err(Error::InvalidString(_))));
        assert_eq!(root.get_bytes(6).unwrap().as_ref(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_struct_child_is_type_mismatch() {
        let mut root = TlvNode::new(0);
        root.put(1, TlvNode::new(0));
        let err = root.get_u8(1).unwrap_err();
        assert_eq!(err.to_string(), "Type Mismatch: tag 1 expected u8 (1 byte), found struct");
        assert!(root.get(1).unwrap().is_struct());
    }

    #[test]
    fn test_put_resets_child_to_standard_struct() {
        let mut root = TlvNode::new(0);
        root.put(1, TlvNode::primitive(9, Bytes::from_static(b"x")).with_frame_type(FrameType::Private));
        let child = root.get(1).unwrap();
        assert_eq!(child.frame_type(), FrameType::Standard);
        assert!(child.is_struct());
        assert!(root.get(9).is_none());
    }

    #[test]
    fn test_put_promotes_primitive_parent() {
        let mut node = TlvNode::primitive(3, Bytes::from_static(b"x"));
        node.put_u8(0, 1);
        assert!(node.is_struct());
    }
}
