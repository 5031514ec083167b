// Incremental frame decoder for byte streams

use bytes::BytesMut;
use log::{debug, trace, warn};

use crate::codec::decode::sink::FrameSink;
use crate::codec::varint::{self, MAX_VARINT_LEN};
use crate::config::DecoderConfig;
use crate::internal::error::{Error, Result};
use crate::tree::parse::parse_exact;

/// Phase of the frame currently being assembled.
///
/// Positions are offsets into the accumulator, whose first byte is always the
/// first byte of the pending frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Looking for the tag byte with a clear continuation bit.
    SeekingTagEnd,
    /// Tag occupies `[0, tag_len)`; looking for the end of the length field.
    SeekingLengthEnd { tag_len: usize },
    /// Header occupies `[0, header_len)`; waiting for `value_len` more bytes.
    AccumulatingValue { header_len: usize, value_len: usize },
}

/// Outcome of one state handler.
#[derive(Debug, PartialEq)]
enum Step {
    Advanced,
    FrameEmitted,
    NeedMore,
}

/// Reassembles top-level TLV frames from arbitrarily split input.
///
/// Bytes are appended to an internal accumulator; each completed frame is
/// parsed into a [`TlvNode`](crate::tree::TlvNode) and handed to the sink, and
/// its bytes are dropped from the accumulator. Split points inside a tag, a
/// length or a value make no difference to the frames produced.
///
/// One decoder serves one logical stream and is not meant to be shared.
#[derive(Debug)]
pub struct StreamDecoder<S> {
    buf: BytesMut,
    cursor: usize, // First accumulator byte not yet scanned
    state: DecodeState,
    config: DecoderConfig,
    sink: S,
    frames_decoded: u64,
}

impl<S: FrameSink> StreamDecoder<S> {
    /// Creates a decoder with the default limits.
    pub fn new(sink: S) -> Self {
        StreamDecoder::with_config(sink, DecoderConfig::default())
    }

    pub fn with_config(sink: S, config: DecoderConfig) -> Self {
        StreamDecoder {
            buf: BytesMut::new(),
            cursor: 0,
            state: DecodeState::SeekingTagEnd,
            config,
            sink,
            frames_decoded: 0,
        }
    }

    /// Appends `data` and emits every frame that is now complete.
    /// Returns the number of frames handed to the sink by this call.
    ///
    /// Incomplete input is never an error. On `Error::Malformed` from a struct
    /// whose children do not fit, that frame is dropped and bytes after it stay
    /// buffered for the next call. A header that can never be valid (an over-long
    /// tag or length field, or a length above `max_frame_length`) leaves no way
    /// to find the next frame, so the accumulator is cleared.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize> {
        self.buf.extend_from_slice(data);
        let mut emitted = 0;

        loop {
            let step = match self.state {
                DecodeState::SeekingTagEnd => self.handle_seeking_tag_end(),
                DecodeState::SeekingLengthEnd { tag_len } => self.handle_seeking_length_end(tag_len),
                DecodeState::AccumulatingValue { header_len, value_len } => {
                    self.handle_accumulating_value(header_len, value_len)
                }
            };

            match step? {
                Step::Advanced => {}
                Step::FrameEmitted => emitted += 1,
                Step::NeedMore => return Ok(emitted),
            }
        }
    }

    /// Handles the SeekingTagEnd state.
    fn handle_seeking_tag_end(&mut self) -> Result<Step> {
        match varint::field_len(&self.buf[self.cursor..]) {
            Some(len) => {
                let tag_len = self.cursor + len;
                if tag_len > MAX_VARINT_LEN {
                    return Err(self.discard_stream(format!("Tag field longer than {} bytes", MAX_VARINT_LEN)));
                }
                self.cursor = tag_len;
                self.state = DecodeState::SeekingLengthEnd { tag_len };
                trace!("stream state transition: SeekingTagEnd -> SeekingLengthEnd (tag_len = {})", tag_len);
                Ok(Step::Advanced)
            }
            None => {
                self.cursor = self.buf.len();
                if self.cursor >= MAX_VARINT_LEN {
                    return Err(self.discard_stream(format!("Tag field longer than {} bytes", MAX_VARINT_LEN)));
                }
                Ok(Step::NeedMore)
            }
        }
    }

    /// Handles the SeekingLengthEnd state.
    fn handle_seeking_length_end(&mut self, tag_len: usize) -> Result<Step> {
        match varint::field_len(&self.buf[self.cursor..]) {
            Some(len) => {
                let header_len = self.cursor + len;
                if header_len - tag_len > MAX_VARINT_LEN {
                    return Err(self.discard_stream(format!("Length field longer than {} bytes", MAX_VARINT_LEN)));
                }
                let length = match varint::decode_varint(&self.buf[tag_len..header_len]) {
                    Ok((length, _)) => length,
                    Err(err) => return Err(self.discard_stream(err.to_string())),
                };
                let value_len = match usize::try_from(length) {
                    Ok(value_len) if value_len <= self.config.max_frame_length => value_len,
                    _ => {
                        warn!("rejecting frame: declared length {} exceeds {}", length, self.config.max_frame_length);
                        self.clear();
                        return Err(Error::FrameTooLarge { length, max: self.config.max_frame_length });
                    }
                };

                self.cursor = header_len;
                self.state = DecodeState::AccumulatingValue { header_len, value_len };
                trace!(
                    "stream state transition: SeekingLengthEnd -> AccumulatingValue (header_len = {}, value_len = {})",
                    header_len,
                    value_len
                );
                Ok(Step::Advanced)
            }
            None => {
                self.cursor = self.buf.len();
                if self.cursor - tag_len >= MAX_VARINT_LEN {
                    return Err(self.discard_stream(format!("Length field longer than {} bytes", MAX_VARINT_LEN)));
                }
                Ok(Step::NeedMore)
            }
        }
    }

    /// Handles the AccumulatingValue state.
    fn handle_accumulating_value(&mut self, header_len: usize, value_len: usize) -> Result<Step> {
        let frame_len = header_len + value_len;
        if self.buf.len() < frame_len {
            self.cursor = self.buf.len();
            return Ok(Step::NeedMore);
        }

        // Drop the frame's bytes; whatever follows becomes the new accumulator.
        // Nothing past the frame end was scanned, so the rebased cursor is 0.
        let frame_bytes = self.buf.split_to(frame_len).freeze();
        self.cursor = 0;
        self.state = DecodeState::SeekingTagEnd;
        trace!("stream state transition: AccumulatingValue -> SeekingTagEnd");

        let node = parse_exact(frame_bytes, &self.config).map_err(|err| {
            warn!("dropping malformed frame of {} bytes: {}", frame_len, err);
            err
        })?;
        self.frames_decoded += 1;
        debug!(
            "decoded frame #{}: tag={} len={} consumed={} buffered={}",
            self.frames_decoded,
            node.tag(),
            value_len,
            frame_len,
            self.buf.len()
        );

        self.sink.on_frame(node)?;
        Ok(Step::FrameEmitted)
    }

    /// Clears all buffered bytes and builds the error for an unrecoverable header.
    fn discard_stream(&mut self, reason: String) -> Error {
        warn!("discarding {} buffered bytes: {}", self.buf.len(), reason);
        self.clear();
        Error::Malformed(reason)
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
        self.state = DecodeState::SeekingTagEnd;
    }

    /// Drops any partial frame and starts over.
    pub fn reset(&mut self) {
        self.clear();
    }

    /// Current phase of the pending frame.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Bytes held for frames not yet complete.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// True when no partial frame is pending.
    pub fn is_idle(&self) -> bool {
        self.buf.is_empty() && self.state == DecodeState::SeekingTagEnd
    }

    /// Frames delivered to the sink so far.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Ends the stream, returning the sink.
    ///
    /// Complete frames still buffered behind an earlier malformed one are
    /// delivered first. Fails with `Error::Incomplete` if a partial frame remains.
    pub fn finish(mut self) -> Result<S> {
        self.feed(&[])?;
        if !self.is_idle() {
            return Err(Error::Incomplete(format!(
                "Stream ended inside a frame ({:?}, {} bytes buffered)",
                self.state,
                self.buf.len()
            )));
        }
        Ok(self.sink)
    }
}
