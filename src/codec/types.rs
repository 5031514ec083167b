use bytes::Bytes;

/// Namespace classification carried in bit 6 of the first tag byte.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum FrameType {
    #[default]
    Standard,
    Private,
}

/// Whether a frame's value is a terminal payload or a run of child frames (bit 5).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum DataType {
    #[default]
    Primitive,
    Struct,
}

/// Decoded tag field: both classification bits plus the tag value.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Tag {
    pub frame_type: FrameType,
    pub data_type: DataType,
    pub value: u64,
}

impl Tag {
    /// Creates a new tag.
    pub fn new(frame_type: FrameType, data_type: DataType, value: u64) -> Self {
        Tag { frame_type, data_type, value }
    }
}

/// A single TLV unit.
///
/// The length is never stored: it is always `value.len()` and is re-encoded
/// whenever the frame is serialized. For `DataType::Struct` the value holds the
/// concatenated encodings of the child frames.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Frame {
    pub frame_type: FrameType,
    pub data_type: DataType,
    pub tag: u64,
    pub value: Bytes,
}

impl Frame {
    /// Creates a new frame.
    pub fn new(frame_type: FrameType, data_type: DataType, tag: u64, value: Bytes) -> Self {
        Frame { frame_type, data_type, tag, value }
    }

    /// Creates a standard-namespace primitive frame.
    pub fn primitive(tag: u64, value: impl Into<Bytes>) -> Self {
        Frame::new(FrameType::Standard, DataType::Primitive, tag, value.into())
    }

    /// Creates a standard-namespace struct frame with an empty value.
    pub fn structure(tag: u64) -> Self {
        Frame::new(FrameType::Standard, DataType::Struct, tag, Bytes::new())
    }

    /// Byte length of the value field.
    pub fn length(&self) -> usize {
        self.value.len()
    }

    pub fn is_struct(&self) -> bool {
        self.data_type == DataType::Struct
    }

    /// The tag field of this frame.
    pub fn tag_field(&self) -> Tag {
        Tag::new(self.frame_type, self.data_type, self.tag)
    }
}
