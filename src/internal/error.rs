use thiserror::Error;
use std::io;

/// Unified error type for the tlvstream library.
#[derive(Error, Debug)]
pub enum Error {
    /// A varint, tag or value span is not terminated within the given buffer.
    ///
    /// Only complete-buffer helpers report this; the stream decoder waits for more bytes instead.
    #[error("Incomplete Data: {0}")]
    Incomplete(String),

    /// The bytes do not form a well-structured frame.
    #[error("Malformed Frame: {0}")]
    Malformed(String),

    /// No direct child carries the requested tag.
    #[error("Field Not Found: tag {0}")]
    NotFound(u64),

    /// The child exists but its value does not have the requested shape.
    #[error("Type Mismatch: tag {tag} expected {expected}, found {actual}")]
    TypeMismatch {
        tag: u64,
        expected: String,
        actual: String,
    },

    /// A string getter met bytes that are not valid UTF-8.
    #[error("Invalid String: {0}")]
    InvalidString(String),

    /// A frame declares a value longer than the decoder accepts.
    #[error("Frame Too Large: declared {length} bytes, limit is {max}")]
    FrameTooLarge { length: u64, max: usize },

    /// Struct frames are nested deeper than the decoder accepts.
    #[error("Nesting Too Deep: limit is {0}")]
    NestingTooDeep(usize),

    /// The completion sink refused a decoded frame.
    #[error("Sink Error: {0}")]
    Sink(String),
}

/// A specialized `Result` type for tlvstream operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Sink(format!("IO Error while handling frame: {}", err))
    }
}

impl Error {
    /// Turns an `Incomplete` error into `Malformed`.
    ///
    /// Used where the buffer is known to be complete, so a short span means the
    /// declared structure is wrong rather than still arriving.
    pub(crate) fn into_malformed(self) -> Self {
        match self {
            Error::Incomplete(msg) => Error::Malformed(msg),
            other => other,
        }
    }
}
