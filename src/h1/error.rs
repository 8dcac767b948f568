use std::fmt;

/// HTTP protocol violation.
///
/// These are never recovered from, the exchange is torn down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtoError {
    /// `Transfer-Encoding: chunked` response, which is not implemented.
    ChunkedUnsupported,
    /// `Set-Cookie` response header, which is not implemented.
    SetCookieUnsupported,
    /// Status line is not `<version> <code> <reason>`.
    InvalidStatusLine,
    /// Status line version other than HTTP/1.0 or HTTP/1.1.
    UnsupportedVersion,
    /// Header line is not `Name: Value`.
    InvalidHeader,
    /// Invalid or conflicting `Content-Length` value.
    InvalidContentLength,
    /// Header block grew past [`MAX_HEAD_SIZE`].
    ///
    /// [`MAX_HEAD_SIZE`]: super::MAX_HEAD_SIZE
    HeadersTooLarge,
    /// Header block contains non-ASCII bytes.
    NonAscii,
}

impl std::error::Error for ProtoError {}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkedUnsupported => f.write_str("chunked transfer encoding is not implemented"),
            Self::SetCookieUnsupported => f.write_str("set-cookie header is not implemented"),
            Self::InvalidStatusLine => f.write_str("invalid status line"),
            Self::UnsupportedVersion => f.write_str("unsupported version"),
            Self::InvalidHeader => f.write_str("invalid header"),
            Self::InvalidContentLength => f.write_str("invalid content length"),
            Self::HeadersTooLarge => f.write_str("header block too large"),
            Self::NonAscii => f.write_str("header block contains non-ascii bytes"),
        }
    }
}
