//! HTTP/1.1 response head parser.
//!
//! Response bytes arrive in arbitrary chunks. [`HeadBuffer`] accumulates them and scans for the
//! `\r\n\r\n` terminator directly in the bytes, resuming where the previous scan stopped, so a
//! terminator split across reads is still found. Only the complete header block is decoded, and it
//! must be ASCII.
use bytes::BytesMut;

use super::ProtoError;
use crate::common::ParseResult;
use crate::headers::standard::{CONTENT_LENGTH, SET_COOKIE, TRANSFER_ENCODING};
use crate::headers::{HeaderField, HeaderMap};
use crate::http::Version;

/// Maximum size of a response header block, including the terminator.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

const TERMINATOR: &[u8; 4] = b"\r\n\r\n";

// ===== Head Buffer =====

/// Accumulates response bytes until the header terminator is found.
#[derive(Debug, Default)]
pub struct HeadBuffer {
    bytes: BytesMut,
    /// bytes before this offset are known not to start a terminator
    scanned: usize,
}

/// A complete header block split from the bytes that follow it.
#[derive(Debug)]
pub struct Head {
    /// Header block without the terminator.
    pub head: BytesMut,
    /// Header block length on the wire, including the terminator.
    pub wire_len: usize,
    /// Bytes that arrived after the terminator, these belong to the body.
    pub rest: BytesMut,
}

impl HeadBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(capacity),
            scanned: 0,
        }
    }

    /// Returns the buffer to read into.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut BytesMut {
        &mut self.bytes
    }

    /// Scan for the header terminator.
    ///
    /// Returns [`ParseResult::Pending`] if more bytes are required.
    pub fn split_head(&mut self) -> ParseResult<Head, ProtoError> {
        match find_terminator(&self.bytes, self.scanned) {
            Some(at) => {
                let wire_len = at + TERMINATOR.len();
                if wire_len > MAX_HEAD_SIZE {
                    return ParseResult::Err(ProtoError::HeadersTooLarge);
                }

                let mut head = self.bytes.split_to(wire_len);
                head.truncate(at);
                let rest = self.bytes.split();
                self.scanned = 0;

                ParseResult::Ok(Head {
                    head,
                    wire_len,
                    rest,
                })
            }
            None => {
                if self.bytes.len() >= MAX_HEAD_SIZE {
                    return ParseResult::Err(ProtoError::HeadersTooLarge);
                }
                // the last 3 bytes may be the start of a split terminator
                self.scanned = self.bytes.len().saturating_sub(TERMINATOR.len() - 1);
                ParseResult::Pending
            }
        }
    }
}

/// Returns the offset of the first `\r\n\r\n` at or after `from`.
pub fn find_terminator(bytes: &[u8], from: usize) -> Option<usize> {
    let window = bytes.get(from..)?;
    window
        .windows(TERMINATOR.len())
        .position(|w| w == TERMINATOR)
        .map(|at| from + at)
}

// ===== Response Head =====

/// Parsed response status line and headers.
#[derive(Debug)]
pub struct ResponseHead {
    pub version: Version,
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
}

impl ResponseHead {
    /// Parse a header block, without the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError`] if the block is malformed, or contains a `Set-Cookie` header.
    pub fn parse(head: &[u8]) -> Result<ResponseHead, ProtoError> {
        if !head.is_ascii() {
            return Err(ProtoError::NonAscii);
        }
        let Ok(head) = std::str::from_utf8(head) else {
            return Err(ProtoError::NonAscii);
        };

        let mut lines = head.split("\r\n");

        let (version, status, reason) = parse_status_line(lines.next().unwrap_or_default())?;

        let mut headers = HeaderMap::with_capacity(16);
        for line in lines {
            headers.push_field(parse_header_line(line)?);
        }

        Ok(ResponseHead {
            version,
            status,
            reason,
            headers,
        })
    }

    /// Returns the body length to read, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::ChunkedUnsupported`] for chunked responses, and
    /// [`ProtoError::InvalidContentLength`] for invalid or conflicting lengths.
    pub fn body_len(&self) -> Result<Option<u64>, ProtoError> {
        let chunked = self.headers.get_all(TRANSFER_ENCODING).any(|value| {
            value
                .split(',')
                .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
        });
        if chunked {
            return Err(ProtoError::ChunkedUnsupported);
        }

        let mut len = None;
        for value in self.headers.get_all(CONTENT_LENGTH) {
            let value = parse_content_length(value)?;
            match len {
                Some(prev) if prev != value => return Err(ProtoError::InvalidContentLength),
                _ => len = Some(value),
            }
        }

        Ok(len.filter(|len| *len > 0))
    }
}

fn parse_status_line(line: &str) -> Result<(Version, u16, String), ProtoError> {
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().unwrap_or_default();
    let code = parts.next().ok_or(ProtoError::InvalidStatusLine)?;
    let reason = parts.next().unwrap_or_default();

    if !version.starts_with("HTTP/") {
        return Err(ProtoError::InvalidStatusLine);
    }
    let version = Version::from_bytes(version.as_bytes()).ok_or(ProtoError::UnsupportedVersion)?;

    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtoError::InvalidStatusLine);
    }
    let status = code.parse().map_err(|_| ProtoError::InvalidStatusLine)?;

    Ok((version, status, reason.trim().to_owned()))
}

fn parse_header_line(line: &str) -> Result<HeaderField, ProtoError> {
    // split on the first colon only, the value may contain more
    let (name, value) = line.split_once(':').ok_or(ProtoError::InvalidHeader)?;
    let name = name.trim();

    if name.eq_ignore_ascii_case(SET_COOKIE) {
        return Err(ProtoError::SetCookieUnsupported);
    }

    HeaderField::new(name, value.trim()).map_err(|_| ProtoError::InvalidHeader)
}

fn parse_content_length(value: &str) -> Result<u64, ProtoError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtoError::InvalidContentLength);
    }
    value.parse().map_err(|_| ProtoError::InvalidContentLength)
}
