// Decode module for the TLV wire format
//
// `frame` decodes headers and single frames from complete buffers;
// `stream_decoder` reassembles frames from fragmented input.

pub mod frame;
pub mod sink;
pub mod stream_decoder;

pub use frame::{decode_frame_bytes, decode_header, FrameHeader};
pub use sink::{FnSink, FrameSink};
pub use stream_decoder::{DecodeState, StreamDecoder};
