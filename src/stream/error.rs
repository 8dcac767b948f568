use std::io;

use crate::buffer::BufferError;
use crate::rt::RuntimeError;
use crate::timeout::TimeoutError;

/// Body transfer error.
#[derive(Debug)]
pub enum StreamError {
    /// The operation would transfer past the declared content length.
    ContentLengthExceeded {
        /// Declared content length.
        limit: u64,
        /// Total bytes the operation would have transferred.
        attempted: u64,
    },
    /// Peer closed the socket before the declared content length was transferred.
    UnexpectedEof,
    /// The operation timer expired, the socket is closed.
    TimedOut,
    /// The stream or its socket is closed.
    Closed,
    /// Body is not valid UTF-8.
    InvalidText,
    /// Prepend buffer access failed.
    Buffer(BufferError),
    /// Timer could not be started.
    Timer(TimeoutError),
    /// No runtime to run the operation on.
    Runtime(RuntimeError),
    /// Socket or destination error.
    Io(io::Error),
}

impl StreamError {
    pub(crate) fn exceeded(limit: u64, attempted: u64) -> Self {
        Self::ContentLengthExceeded { limit, attempted }
    }
}

impl From<BufferError> for StreamError {
    #[inline]
    fn from(value: BufferError) -> Self {
        Self::Buffer(value)
    }
}

impl From<TimeoutError> for StreamError {
    #[inline]
    fn from(value: TimeoutError) -> Self {
        Self::Timer(value)
    }
}

impl From<RuntimeError> for StreamError {
    #[inline]
    fn from(value: RuntimeError) -> Self {
        Self::Runtime(value)
    }
}

impl From<io::Error> for StreamError {
    #[inline]
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(err) => Some(err),
            Self::Timer(err) => Some(err),
            Self::Runtime(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentLengthExceeded { limit, attempted } => write!(
                f,
                "content length exceeded, declared {limit} bytes, attempted {attempted}"
            ),
            Self::UnexpectedEof => f.write_str("connection closed before the body was complete"),
            Self::TimedOut => f.write_str("body transfer timed out"),
            Self::Closed => f.write_str("stream is closed"),
            Self::InvalidText => f.write_str("body is not valid utf-8"),
            Self::Buffer(err) => err.fmt(f),
            Self::Timer(err) => err.fmt(f),
            Self::Runtime(err) => err.fmt(f),
            Self::Io(err) => err.fmt(f),
        }
    }
}
