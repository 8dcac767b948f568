use bytes::BytesMut;

use super::encode::write_request_head;
use super::parser::{HeadBuffer, find_terminator};
use super::{ProtoError, ResponseHead};
use crate::common::ParseResult;
use crate::http::{Request, Version};

macro_rules! ready {
    ($e:expr) => {
        match $e {
            ParseResult::Ok(ok) => ok,
            ParseResult::Err(err) => panic!("unexpected `ParseResult::Err`: {err:?}"),
            ParseResult::Pending => panic!("unexpected `ParseResult::Pending`"),
        }
    };
}

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nX-Multi: a:b:c\r\n\r\nhello";

/// Feed `chunks` one by one, as separate socket reads.
fn feed(chunks: &[&[u8]]) -> (ResponseHead, BytesMut, usize) {
    let mut buffer = HeadBuffer::default();
    let (last, init) = chunks.split_last().unwrap();

    for chunk in init {
        buffer.bytes_mut().extend_from_slice(chunk);
        assert!(matches!(buffer.split_head(), ParseResult::Pending));
    }

    buffer.bytes_mut().extend_from_slice(last);
    let head = ready!(buffer.split_head());
    let response = ResponseHead::parse(&head.head).unwrap();
    (response, head.rest, head.wire_len)
}

#[test]
fn test_find_terminator() {
    assert_eq!(find_terminator(b"a\r\n\r\nb", 0), Some(1));
    assert_eq!(find_terminator(b"a\r\n\r\nb", 2), None);
    assert_eq!(find_terminator(b"\r\n\r", 0), None);
    assert_eq!(find_terminator(b"", 0), None);
    assert_eq!(find_terminator(b"ab", 10), None);
}

#[test]
fn test_single_read() {
    let (head, rest, wire_len) = feed(&[RESPONSE]);

    assert_eq!(head.version, Version::HTTP_11);
    assert_eq!(head.status, 200);
    assert_eq!(head.reason, "OK");
    assert_eq!(head.headers.len(), 2);
    assert_eq!(head.headers.get("content-length"), Some("5"));
    assert_eq!(head.headers.get("x-multi"), Some("a:b:c"));
    assert_eq!(head.body_len().unwrap(), Some(5));
    assert_eq!(rest.as_ref(), b"hello");
    assert_eq!(wire_len, RESPONSE.len() - 5);
}

#[test]
fn test_split_terminator() {
    let at = find_terminator(RESPONSE, 0).unwrap();

    // terminator split 1/3, 2/2 and 3/1 across two reads
    for split in 1..4 {
        let (first, second) = RESPONSE.split_at(at + split);
        let (head, rest, _) = feed(&[first, second]);
        assert_eq!(head.status, 200, "split {split}");
        assert_eq!(head.headers.get("content-length"), Some("5"), "split {split}");
        assert_eq!(rest.as_ref(), b"hello", "split {split}");
    }

    // byte by byte
    let chunks: Vec<&[u8]> = RESPONSE[..at + 4].chunks(1).collect();
    let (head, rest, _) = feed(&chunks);
    assert_eq!(head.headers.get("x-multi"), Some("a:b:c"));
    assert!(rest.is_empty());
}

#[test]
fn test_parse_head() {
    macro_rules! test {
        (#[error] $input:literal => $err:ident) => {
            let err = ResponseHead::parse($input).unwrap_err();
            assert_eq!(err, ProtoError::$err, "{:?}", std::str::from_utf8($input));
        };
        ($input:literal => $status:literal, $reason:literal, [$(($n:literal, $v:literal)),*]) => {
            let head = ResponseHead::parse($input).unwrap();
            assert_eq!(head.status, $status);
            assert_eq!(head.reason, $reason);
            let fields: Vec<(&str, &str)> = head.headers.iter().collect();
            let expected: Vec<(&str, &str)> = vec![$(($n, $v)),*];
            assert_eq!(fields, expected);
        };
    }

    test!(b"HTTP/1.1 204 No Content" => 204, "No Content", []);
    test!(b"HTTP/1.0 404" => 404, "", []);
    test!(b"HTTP/1.1 200 OK\r\nServer:  demo  \r\nDate:Mon" => 200, "OK", [("Server", "demo"), ("Date", "Mon")]);
    test!(b"HTTP/1.1 301 Moved\r\nLocation: http://a.test:80/x" => 301, "Moved", [("Location", "http://a.test:80/x")]);
    test!(b"HTTP/1.1 200 OK\r\nX-Empty:" => 200, "OK", [("X-Empty", "")]);

    test!(#[error] b"" => InvalidStatusLine);
    test!(#[error] b"HTTP/1.1" => InvalidStatusLine);
    test!(#[error] b"ICY 200 OK" => InvalidStatusLine);
    test!(#[error] b"HTTP/1.1 20 OK" => InvalidStatusLine);
    test!(#[error] b"HTTP/1.1 2xx OK" => InvalidStatusLine);
    test!(#[error] b"HTTP/2.0 200 OK" => UnsupportedVersion);
    test!(#[error] b"HTTP/1.1 200 OK\r\nno colon" => InvalidHeader);
    test!(#[error] b"HTTP/1.1 200 OK\r\n: value" => InvalidHeader);
    test!(#[error] b"HTTP/1.1 200 OK\r\nSet-Cookie: id=1" => SetCookieUnsupported);
    test!(#[error] b"HTTP/1.1 200 OK\r\nset-cookie : id=1" => SetCookieUnsupported);
    test!(#[error] b"HTTP/1.1 200 OK\r\nX-Name: caf\xc3\xa9" => NonAscii);
}

#[test]
fn test_body_len() {
    macro_rules! test {
        ($input:literal => $len:expr) => {
            let head = ResponseHead::parse($input).unwrap();
            assert_eq!(head.body_len(), $len, "{:?}", std::str::from_utf8($input));
        };
    }

    test!(b"HTTP/1.1 200 OK" => Ok(None));
    test!(b"HTTP/1.1 200 OK\r\nContent-Length: 0" => Ok(None));
    test!(b"HTTP/1.1 200 OK\r\nContent-Length: 42" => Ok(Some(42)));
    test!(b"HTTP/1.1 200 OK\r\nContent-Length: 7\r\ncontent-length: 7" => Ok(Some(7)));
    test!(b"HTTP/1.1 200 OK\r\nContent-Length: 7\r\ncontent-length: 8" => Err(ProtoError::InvalidContentLength));
    test!(b"HTTP/1.1 200 OK\r\nContent-Length: -1" => Err(ProtoError::InvalidContentLength));
    test!(b"HTTP/1.1 200 OK\r\nContent-Length: ten" => Err(ProtoError::InvalidContentLength));
    test!(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked" => Err(ProtoError::ChunkedUnsupported));
    test!(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: CHUNKED\r\nContent-Length: 5" => Err(ProtoError::ChunkedUnsupported));
    test!(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: gzip, chunked" => Err(ProtoError::ChunkedUnsupported));
    test!(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: identity\r\nContent-Length: 3" => Ok(Some(3)));
}

#[test]
fn test_head_too_large() {
    let mut buffer = HeadBuffer::default();
    buffer.bytes_mut().extend_from_slice(b"HTTP/1.1 200 OK\r\n");
    buffer.bytes_mut().resize(super::MAX_HEAD_SIZE, b'a');

    match buffer.split_head() {
        ParseResult::Err(ProtoError::HeadersTooLarge) => { }
        other => panic!("expected `HeadersTooLarge`, got {other:?}"),
    }
}

#[test]
fn test_write_request_head() {
    let request = Request::get("/thing");
    let mut buf = BytesMut::new();
    write_request_head(&request, "example.test", None, &mut buf);
    assert_eq!(buf.as_ref(), b"GET /thing HTTP/1.1\r\nHost: example.test\r\n\r\n");

    let request = Request::post("/docs")
        .with_header("Content-Type", "application/json")
        .unwrap()
        .with_header("Content-Length", "999")
        .unwrap()
        .with_header("Accept", "*/*")
        .unwrap();
    let mut buf = BytesMut::new();
    write_request_head(&request, "example.test:9200", Some(2), &mut buf);
    assert_eq!(
        buf.as_ref(),
        &b"POST /docs HTTP/1.1\r\n\
        Host: example.test:9200\r\n\
        Content-Type: application/json\r\n\
        Content-Length: 2\r\n\
        Accept: */*\r\n\r\n"[..]
    );

    let request = Request::put("/x")
        .with_header("host", "override.test")
        .unwrap();
    let mut buf = BytesMut::new();
    write_request_head(&request, "example.test", Some(10), &mut buf);
    assert_eq!(
        buf.as_ref(),
        &b"PUT /x HTTP/1.1\r\nHost: override.test\r\nContent-Length: 10\r\n\r\n"[..]
    );
}

#[test]
fn test_header_round_trip() {
    let pairs = [
        ("Content-Type", "application/json"),
        ("X-Request-Id", "abc-123"),
        ("Accept", "*/*"),
        ("X-Colons", "a: b: c"),
        ("x-lower", "  padded  "),
        ("X-Request-Id", "second"),
    ];

    let mut request = Request::get("/");
    for (name, value) in pairs {
        request.headers_mut().append(name, value).unwrap();
    }

    let mut buf = BytesMut::new();
    write_request_head(&request, "example.test", None, &mut buf);

    // reuse the header lines under a status line, dropping the request line and `Host`
    let text = std::str::from_utf8(&buf).unwrap();
    let lines: Vec<&str> = text.trim_end().split("\r\n").skip(2).collect();
    let response = format!("HTTP/1.1 200 OK\r\n{}", lines.join("\r\n"));

    let head = ResponseHead::parse(response.as_bytes()).unwrap();
    let parsed: Vec<(&str, &str)> = head.headers.iter().collect();
    let expected: Vec<(&str, &str)> = pairs.iter().map(|(n, v)| (*n, v.trim())).collect();
    assert_eq!(parsed, expected);
}
