//! In-memory TLV trees.
//!
//! A [`TlvNode`] owns one [`Frame`] and its ordered children. Trees come from
//! two places: [`TlvNode::from_bytes`] parses a complete frame, and the typed
//! `put_*` setters attach leaves to a programmatically built node, after which
//! [`TlvNode::build`] serializes every struct value bottom-up.

pub mod accessors;
pub mod build;
pub mod parse;

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::codec::encode::write_frame;
use crate::codec::types::{DataType, Frame, FrameType};
use crate::codec::{Decode, Encode};
use crate::config::DecoderConfig;
use crate::internal::error::Result;

/// A frame plus its decoded children.
///
/// Siblings keep insertion or parse order and may repeat a tag; lookups return
/// the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvNode {
    frame: Frame,
    children: Vec<TlvNode>,
}

impl TlvNode {
    /// Creates an empty struct node, the usual root of a programmatically built tree.
    pub fn new(tag: u64) -> Self {
        TlvNode::from_frame(Frame::structure(tag))
    }

    /// Creates a primitive leaf.
    pub fn primitive(tag: u64, value: impl Into<Bytes>) -> Self {
        TlvNode::from_frame(Frame::primitive(tag, value))
    }

    /// Wraps a frame without children.
    pub fn from_frame(frame: Frame) -> Self {
        TlvNode { frame, children: Vec::new() }
    }

    /// Moves the node into another namespace.
    pub fn with_frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame.frame_type = frame_type;
        self
    }

    /// Parses exactly one frame occupying all of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        TlvNode::from_bytes_with_config(data, &DecoderConfig::default())
    }

    pub fn from_bytes_with_config(data: &[u8], config: &DecoderConfig) -> Result<Self> {
        parse::parse_exact(Bytes::copy_from_slice(data), config)
    }

    /// Parses a run of sibling frames that exactly fills `data`.
    pub fn parse_sequence(data: &[u8]) -> Result<Vec<TlvNode>> {
        parse::parse_sequence(Bytes::copy_from_slice(data), &DecoderConfig::default())
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn tag(&self) -> u64 {
        self.frame.tag
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame.frame_type
    }

    pub fn data_type(&self) -> DataType {
        self.frame.data_type
    }

    pub fn is_struct(&self) -> bool {
        self.frame.is_struct()
    }

    /// Raw value bytes. For a struct node this is only current after `build`.
    pub fn value(&self) -> &Bytes {
        &self.frame.value
    }

    pub fn children(&self) -> &[TlvNode] {
        &self.children
    }

    /// First direct child with `tag`, or `None`.
    pub fn get(&self, tag: u64) -> Option<&TlvNode> {
        self.children.iter().find(|child| child.frame.tag == tag)
    }

    pub fn get_mut(&mut self, tag: u64) -> Option<&mut TlvNode> {
        self.children.iter_mut().find(|child| child.frame.tag == tag)
    }

    /// Every direct child with `tag`, in order.
    pub fn get_all(&self, tag: u64) -> impl Iterator<Item = &TlvNode> {
        self.children.iter().filter(move |child| child.frame.tag == tag)
    }

    /// Serializes this node's frame as it currently stands.
    ///
    /// Call [`TlvNode::build`] first if children were attached since the last build.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.frame.encoded_len());
        write_frame(&self.frame, &mut buf);
        buf.freeze()
    }
}

impl Encode for TlvNode {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        self.frame.encode(buf)
    }

    fn encoded_len(&self) -> usize {
        self.frame.encoded_len()
    }
}

/// Implements the `Decode` trait for `TlvNode`.
///
/// Decodes the first frame of `data`, including all nested children; bytes
/// after that frame are left for the caller.
impl Decode for TlvNode {
    fn decode(data: &[u8]) -> Result<(Self, usize)> {
        parse::parse_prefix(&Bytes::copy_from_slice(data), &DecoderConfig::default())
    }
}

impl fmt::Display for TlvNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl TlvNode {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let namespace = match self.frame.frame_type {
            FrameType::Standard => "",
            FrameType::Private => "private ",
        };
        match self.frame.data_type {
            DataType::Struct => {
                writeln!(f, "{:indent$}{}struct tag={} len={}", "", namespace, self.frame.tag, self.frame.length(), indent = depth * 2)?;
                for child in &self.children {
                    child.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
            DataType::Primitive => writeln!(
                f,
                "{:indent$}{}tag={} len={} value={}",
                "",
                namespace,
                self.frame.tag,
                self.frame.length(),
                hex::encode(&self.frame.value),
                indent = depth * 2
            ),
        }
    }
}
