// Parsing complete buffers into TLV trees.
//
// Struct values are walked with an explicit stack of open structs instead of
// recursion, so nesting depth is bounded by `DecoderConfig::max_nesting_depth`
// rather than by the thread's stack.

use bytes::Bytes;
use log::trace;

use crate::codec::decode::frame::{decode_frame_bytes, decode_header};
use crate::codec::types::Frame;
use crate::config::DecoderConfig;
use crate::internal::error::{Error, Result};
use crate::tree::TlvNode;

/// A struct whose value is still being split into children.
#[derive(Debug)]
struct OpenStruct {
    node: TlvNode,
    offset: usize, // Bytes of node.frame.value already consumed by children
}

impl OpenStruct {
    fn new(frame: Frame) -> Self {
        OpenStruct { node: TlvNode::from_frame(frame), offset: 0 }
    }
}

/// Decodes the frame at the start of `data`, rejecting a declared value length
/// above `config.max_frame_length` before looking at the value bytes.
fn decode_bounded(data: &Bytes, config: &DecoderConfig) -> Result<(Frame, usize)> {
    let header = decode_header(data)?;
    if header.value_len > config.max_frame_length {
        return Err(Error::FrameTooLarge {
            length: header.value_len as u64,
            max: config.max_frame_length,
        });
    }
    decode_frame_bytes(data)
}

/// Parses one frame that must span all of `data`.
pub fn parse_exact(data: Bytes, config: &DecoderConfig) -> Result<TlvNode> {
    let (node, consumed) = parse_prefix(&data, config)?;
    if consumed != data.len() {
        return Err(Error::Malformed(format!(
            "Extra data remaining after decoding: {} bytes",
            data.len() - consumed
        )));
    }
    Ok(node)
}

/// Parses a run of sibling frames that must span all of `data`.
pub fn parse_sequence(data: Bytes, config: &DecoderConfig) -> Result<Vec<TlvNode>> {
    let mut nodes = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (node, consumed) = parse_prefix(&data.slice(offset..), config)?;
        nodes.push(node);
        offset += consumed;
    }
    Ok(nodes)
}

/// Parses the first frame of `data` and everything nested in it.
/// Returns the node and the number of bytes the frame occupies.
///
/// The buffer is treated as complete: a field or span running past its end is
/// reported as `Error::Malformed`.
pub fn parse_prefix(data: &Bytes, config: &DecoderConfig) -> Result<(TlvNode, usize)> {
    let (frame, consumed) = decode_bounded(data, config).map_err(Error::into_malformed)?;
    if !frame.is_struct() {
        return Ok((TlvNode::from_frame(frame), consumed));
    }
    if config.max_nesting_depth == 0 {
        return Err(Error::NestingTooDeep(config.max_nesting_depth));
    }

    let mut stack = vec![OpenStruct::new(frame)];

    while let Some(top) = stack.last_mut() {
        if top.offset == top.node.frame.value.len() {
            // Every byte of this struct's value has been claimed by a child
            let finished = match stack.pop() {
                Some(open) => open.node,
                None => break,
            };
            match stack.last_mut() {
                Some(parent) => parent.node.children.push(finished),
                None => {
                    trace!("parsed frame tag={} span={}", finished.frame.tag, consumed);
                    return Ok((finished, consumed));
                }
            }
            continue;
        }

        let parent_tag = top.node.frame.tag;
        let remaining = top.node.frame.value.slice(top.offset..);
        let (child, child_len) = decode_bounded(&remaining, config).map_err(|err| match err {
            Error::Incomplete(msg) => Error::Malformed(format!(
                "Children of struct tag {} do not consume its value exactly: {}",
                parent_tag, msg
            )),
            other => other,
        })?;
        top.offset += child_len;

        if child.is_struct() {
            if stack.len() >= config.max_nesting_depth {
                return Err(Error::NestingTooDeep(config.max_nesting_depth));
            }
            stack.push(OpenStruct::new(child));
        } else {
            top.node.children.push(TlvNode::from_frame(child));
        }
    }

    Err(Error::Malformed("Decoding failed: No root frame decoded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::{encode_frame, encode_tlv};
    use crate::codec::types::{DataType, FrameType};

    fn struct_frame(tag: u64, value: &[u8]) -> Vec<u8> {
        encode_tlv(FrameType::Standard, DataType::Struct, tag, value).unwrap()
    }

    #[test]
    fn test_parse_primitive_root() {
        let data = encode_frame(&Frame::primitive(3, Bytes::from_static(b"abc"))).unwrap();
        let node = parse_exact(Bytes::from(data), &DecoderConfig::default()).unwrap();
        assert!(!node.is_struct());
        assert_eq!(node.value().as_ref(), b"abc");
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_parse_nested_structs() {
        let leaf = encode_tlv(FrameType::Standard, DataType::Primitive, 9, &[0x2A]).unwrap();
        let inner = struct_frame(2, &leaf);
        let mut outer_value = inner.clone();
        outer_value.extend_from_slice(&leaf);
        let outer = struct_frame(1, &outer_value);

        let node = parse_exact(Bytes::from(outer), &DecoderConfig::default()).unwrap();
        assert_eq!(node.children().len(), 2);
        let inner_node = node.get(2).unwrap();
        assert!(inner_node.is_struct());
        assert_eq!(inner_node.value().as_ref(), leaf.as_slice());
        assert_eq!(inner_node.get(9).unwrap().value().as_ref(), &[0x2A]);
        assert_eq!(node.get(9).unwrap().value().as_ref(), &[0x2A]);
    }

    #[test]
    fn test_parse_empty_struct() {
        let node = parse_exact(Bytes::from_static(&[0x21, 0x00]), &DecoderConfig::default()).unwrap();
        assert!(node.is_struct());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_unconsumed_remainder_is_malformed() {
        // A complete child followed by one stray byte inside the struct value
        let mut value = encode_tlv(FrameType::Standard, DataType::Primitive, 0, &[0x01]).unwrap();
        value.push(0x05);
        let data = struct_frame(0, &value);
        let result = parse_exact(Bytes::from(data), &DecoderConfig::default());
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_child_overrunning_parent_is_malformed() {
        // Child declares 4 value bytes but the parent only holds 2 after its header
        let data = struct_frame(0, &[0x01, 0x04, 0xAA, 0xBB]);
        let result = parse_exact(Bytes::from(data), &DecoderConfig::default());
        assert!(matches!(result, Err(Error::Malformed(_))));
        assert!(result.unwrap_err().to_string().contains("struct tag 0"));
    }

    #[test]
    fn test_trailing_bytes_rejected_at_top_level() {
        let mut data = encode_tlv(FrameType::Standard, DataType::Primitive, 1, &[0x01]).unwrap();
        data.push(0x00);
        let result = parse_exact(Bytes::from(data), &DecoderConfig::default());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Malformed Frame: Extra data remaining after decoding: 1 bytes"
        );
    }

    #[test]
    fn test_truncated_root_is_malformed() {
        let data = encode_tlv(FrameType::Standard, DataType::Primitive, 1, b"hello").unwrap();
        let result = parse_exact(Bytes::copy_from_slice(&data[..4]), &DecoderConfig::default());
        assert!(matches!(result, Err(Error::Malformed(_))));
        let result = parse_exact(Bytes::from_static(&[0x81]), &DecoderConfig::default());
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let mut data = encode_tlv(FrameType::Standard, DataType::Primitive, 0, &[]).unwrap();
        for tag in 0..5 {
            data = struct_frame(tag, &data);
        }
        let limited = DecoderConfig::default().with_max_nesting_depth(4);
        assert!(matches!(parse_exact(Bytes::from(data.clone()), &limited), Err(Error::NestingTooDeep(4))));

        let enough = DecoderConfig::default().with_max_nesting_depth(5);
        let node = parse_exact(Bytes::from(data), &enough).unwrap();
        assert_eq!(node.tag(), 4);
    }

    #[test]
    fn test_frame_length_limit() {
        let limited = DecoderConfig::default().with_max_frame_length(16);

        let data = encode_tlv(FrameType::Standard, DataType::Primitive, 1, &[0xAB; 100]).unwrap();
        let result = parse_exact(Bytes::from(data.clone()), &limited);
        assert!(matches!(result, Err(Error::FrameTooLarge { length: 100, max: 16 })));
        // Rejected from the header alone, even when the value is cut short
        let result = parse_exact(Bytes::copy_from_slice(&data[..4]), &limited);
        assert!(matches!(result, Err(Error::FrameTooLarge { length: 100, max: 16 })));

        // The limit applies to the root struct as well
        let child = encode_tlv(FrameType::Standard, DataType::Primitive, 2, &[0xCD; 12]).unwrap();
        let data = struct_frame(0, &child);
        assert!(parse_exact(Bytes::from(data.clone()), &DecoderConfig::default().with_max_frame_length(14)).is_ok());
        let result = parse_exact(Bytes::from(data), &DecoderConfig::default().with_max_frame_length(13));
        assert!(matches!(result, Err(Error::FrameTooLarge { length: 14, max: 13 })));

        let node = parse_exact(
            Bytes::from(encode_tlv(FrameType::Standard, DataType::Primitive, 1, &[0xAB; 16]).unwrap()),
            &limited,
        )
        .unwrap();
        assert_eq!(node.value().len(), 16);
    }

    #[test]
    fn test_deep_nesting_without_recursion() {
        let depth = 2_000;
        let mut data = Vec::new();
        for _ in 0..depth {
            data = struct_frame(1, &data);
        }
        let config = DecoderConfig::default().with_max_nesting_depth(depth);
        let mut node = &parse_exact(Bytes::from(data), &config).unwrap();
        let mut levels = 1;
        while let Some(child) = node.get(1) {
            node = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn test_parse_sequence() {
        let mut data = encode_tlv(FrameType::Standard, DataType::Primitive, 1, &[0x01]).unwrap();
        data.extend(struct_frame(2, &[]));
        data.extend(encode_tlv(FrameType::Private, DataType::Primitive, 3, b"x").unwrap());

        let nodes = parse_sequence(Bytes::from(data), &DecoderConfig::default()).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2].frame_type(), FrameType::Private);

        let result = parse_sequence(Bytes::from_static(&[0x01, 0x01, 0x01, 0x02]), &DecoderConfig::default());
        assert!(matches!(result, Err(Error::Malformed(_))));
    }
}
