use std::io;

use crate::conn::Phase;
use crate::h1::ProtoError;
use crate::headers::HeaderError;
use crate::http::UriError;
use crate::rt::RuntimeError;
use crate::stream::StreamError;
use crate::timeout::TimeoutError;

/// Transport error.
pub struct Error {
    kind: Box<ErrorKind>,
}

/// The kind of transport [`Error`].
#[derive(Debug)]
pub enum ErrorKind {
    // usage
    /// Forward-only request body without a declared `Content-Length`.
    MissingContentLength,
    /// Operation is not allowed in the current connection phase.
    InvalidState(Phase),
    /// Request target is empty or contains non-visible characters.
    InvalidTarget,
    /// Invalid endpoint.
    Uri(UriError),
    /// Invalid header.
    Header(HeaderError),

    // protocol
    /// HTTP protocol violation.
    Proto(ProtoError),
    /// Body transfer failure.
    Stream(StreamError),

    // transport
    /// Socket error.
    Io(io::Error),
    /// Host name resolved to no address.
    Resolve,
    /// Peer closed the connection before the response head was complete.
    ConnectionClosed,

    // environment
    /// Timer could not be started.
    Timer(TimeoutError),
    /// No runtime to run the operation on.
    Runtime(RuntimeError),
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> ErrorKind {
        *self.kind
    }

    /// Returns `true` if the error is a programming mistake of the caller.
    pub fn is_usage(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingContentLength
                | ErrorKind::InvalidState(_)
                | ErrorKind::InvalidTarget
                | ErrorKind::Uri(_)
                | ErrorKind::Header(_)
        )
    }

    /// Returns `true` if the peer violated the protocol, or sent an unsupported message.
    pub fn is_protocol(&self) -> bool {
        match self.kind() {
            ErrorKind::Proto(_) => true,
            ErrorKind::Stream(err) => matches!(err, StreamError::ContentLengthExceeded { .. }),
            _ => false,
        }
    }

    /// Returns `true` if the socket failed.
    pub fn is_transport(&self) -> bool {
        match self.kind() {
            ErrorKind::Io(_) | ErrorKind::Resolve | ErrorKind::ConnectionClosed => true,
            ErrorKind::Stream(err) => matches!(
                err,
                StreamError::Io(_) | StreamError::UnexpectedEof | StreamError::Closed
            ),
            _ => false,
        }
    }
}

macro_rules! from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Error {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::new(ErrorKind::$variant(value))
            }
        }
    )*};
}

from! {
    ProtoError => Proto,
    StreamError => Stream,
    io::Error => Io,
    TimeoutError => Timer,
    RuntimeError => Runtime,
    UriError => Uri,
    HeaderError => Header,
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Uri(err) => Some(err),
            ErrorKind::Header(err) => Some(err),
            ErrorKind::Proto(err) => Some(err),
            ErrorKind::Stream(err) => Some(err),
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Timer(err) => Some(err),
            ErrorKind::Runtime(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            ErrorKind::MissingContentLength => {
                f.write_str("forward-only request body requires a content length")
            }
            ErrorKind::InvalidState(phase) => write!(f, "operation not allowed while {phase}"),
            ErrorKind::InvalidTarget => f.write_str("invalid request target"),
            ErrorKind::Uri(err) => write!(f, "invalid uri: {err}"),
            ErrorKind::Header(err) => write!(f, "invalid header: {err}"),
            ErrorKind::Proto(err) => err.fmt(f),
            ErrorKind::Stream(err) => err.fmt(f),
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::Resolve => f.write_str("host name resolved to no address"),
            ErrorKind::ConnectionClosed => {
                f.write_str("connection closed before the response head was complete")
            }
            ErrorKind::Timer(err) => err.fmt(f),
            ErrorKind::Runtime(err) => err.fmt(f),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Error").field(&self.kind).finish()
    }
}
