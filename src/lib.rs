//! Tag-Length-Value codec for framing nested, typed fields on a byte stream.
//!
//! Tags and lengths use a base-128 continuation-bit encoding. The first tag
//! byte also carries a frame-type bit and a data-type bit, so every frame says
//! whether its value is a primitive payload or a run of child frames.
//!
//! ```
//! use tlvstream::{StreamDecoder, TlvNode};
//!
//! let mut root = TlvNode::new(0);
//! root.put_i32(2, 655354).put_string(4, "hello").build();
//! let bytes = root.to_bytes();
//!
//! let mut decoder = StreamDecoder::new(Vec::new());
//! decoder.feed(&bytes[..3]).unwrap();
//! decoder.feed(&bytes[3..]).unwrap();
//! assert_eq!(decoder.sink()[0].get_i32(2).unwrap(), 655354);
//! ```

pub mod codec;
pub mod config;
pub mod internal;
pub mod tree;

pub use codec::decode::{FnSink, FrameSink, StreamDecoder};
pub use codec::types::{DataType, Frame, FrameType, Tag};
pub use codec::{Decode, Encode};
pub use config::DecoderConfig;
pub use internal::error::{Error, Result};
pub use tree::TlvNode;
