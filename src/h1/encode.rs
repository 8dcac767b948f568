//! Request header block serialization.
use bytes::BytesMut;

use crate::headers::standard::{CONTENT_LENGTH, HOST};
use crate::http::Request;

/// Write the request header block into `buf`.
///
/// The block is the request line, the `Host` header, then every request header in insertion
/// order, terminated by an empty line. A `Host` header on the request replaces `host`.
///
/// When `content_len` is given, it is written as `Content-Length`, in place of an existing
/// `Content-Length` header, or after the last header otherwise.
pub fn write_request_head(
    request: &Request,
    host: &str,
    content_len: Option<u64>,
    buf: &mut BytesMut,
) {
    buf.reserve(128);

    buf.extend_from_slice(request.method().as_str().as_bytes());
    buf.extend_from_slice(b" ");
    buf.extend_from_slice(request.target().as_bytes());
    buf.extend_from_slice(b" ");
    buf.extend_from_slice(request.version().as_str().as_bytes());
    buf.extend_from_slice(b"\r\n");

    let host = request.headers().get(HOST).unwrap_or(host);
    write_field(buf, HOST, host);

    let mut itoa = itoa::Buffer::new();
    let mut len_written = false;

    for (name, value) in request.headers() {
        if name.eq_ignore_ascii_case(HOST) {
            continue;
        }
        match content_len {
            Some(len) if name.eq_ignore_ascii_case(CONTENT_LENGTH) => {
                if !len_written {
                    write_field(buf, name, itoa.format(len));
                    len_written = true;
                }
            }
            _ => write_field(buf, name, value),
        }
    }

    if let Some(len) = content_len {
        if !len_written {
            write_field(buf, CONTENT_LENGTH, itoa.format(len));
        }
    }

    buf.extend_from_slice(b"\r\n");
}

fn write_field(buf: &mut BytesMut, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}
