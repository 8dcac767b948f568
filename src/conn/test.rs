use bytes::Bytes;
use std::time::Duration;

use super::context::{ReceiveHeaderContext, SendHeaderContext};
use super::{Connection, ConnectionEvent, DirectionStats, Options, Phase, validate};
use crate::common::ParseResult;
use crate::error::ErrorKind;
use crate::http::{Request, RequestBody, Uri};

fn uri() -> Uri {
    Uri::parse("http://127.0.0.1:9/").unwrap()
}

#[test]
fn percent_complete() {
    let mut stats = DirectionStats::default();
    assert_eq!(stats.percent(), 0.0);

    // totals unknown
    stats.add_headers(40);
    assert_eq!(stats.percent(), 0.0);

    stats.settle_headers(38, 2);
    stats.expect(38, 12);
    assert_eq!(stats.percent(), 80.0);

    let mut last = stats.percent();
    for _ in 0..10 {
        stats.add_content(1);
        assert!(stats.percent() >= last);
        last = stats.percent();
    }
    assert_eq!(stats.total(), 50);
    assert_eq!(stats.percent(), 100.0);

    let mut empty = DirectionStats::default();
    empty.expect(0, 0);
    assert_eq!(empty.percent(), 0.0);
}

#[test]
fn options() {
    let options = Options::default();
    assert_eq!(options.send_timeout(), Duration::from_secs(30));
    assert_eq!(options.receive_timeout(), Duration::from_secs(30));
    assert_eq!(options.send_buffer_size(), 8192);
    assert_eq!(options.receive_buffer_size(), 8192);

    let options = Options::new(100, 200, 0, 16);
    assert_eq!(options.send_timeout(), Duration::from_millis(100));
    assert_eq!(options.receive_timeout(), Duration::from_millis(200));
    assert_eq!(options.send_buffer_size(), 1);
    assert_eq!(options.receive_buffer_size(), 16);
}

#[test]
fn validate_request() {
    let ok = Request::get("/thing?id=1");
    assert!(validate(&ok, None).is_ok());

    let err = validate(&Request::get("/with space"), None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidTarget));
    assert!(err.is_usage());

    let err = validate(&Request::get(""), None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidTarget));

    let stream = RequestBody::stream(&b"data"[..]);
    let err = validate(&Request::post("/"), Some(&stream)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MissingContentLength));

    let declared = Request::post("/").with_content_length(4);
    assert!(validate(&declared, Some(&stream)).is_ok());

    let seekable = RequestBody::from("data");
    assert!(validate(&Request::post("/"), Some(&seekable)).is_ok());
}

#[test]
fn header_chunks() {
    let mut ctx = SendHeaderContext::new(Bytes::from_static(b"abcdefg"), 3, Duration::from_secs(1));
    let chunks: Vec<Bytes> = std::iter::from_fn(|| ctx.next_chunk()).collect();
    assert_eq!(chunks, [&b"abc"[..], b"def", b"g"]);
}

#[test]
fn receive_context_feed() {
    let mut ctx = ReceiveHeaderContext::new(8, Duration::from_secs(1));
    let input = b"HTTP/1.1 204 No Content\r\n\r\nxy";

    let mut result = None;
    for chunk in input.chunks(8) {
        ctx.scratch[..chunk.len()].copy_from_slice(chunk);
        match ctx.feed(chunk.len()) {
            ParseResult::Pending => continue,
            ParseResult::Ok(head) => {
                result = Some(head);
                break;
            }
            ParseResult::Err(err) => panic!("{err}"),
        }
    }

    let head = result.unwrap();
    assert_eq!(head.head.as_ref(), b"HTTP/1.1 204 No Content");
    assert_eq!(head.wire_len, input.len() - 2);
    assert_eq!(head.rest.as_ref(), b"xy");
}

#[tokio::test]
async fn wrong_phase() {
    let connection = Connection::new(uri(), Options::default());
    assert_eq!(connection.phase(), Phase::Disconnected);
    assert!(!connection.is_connected());

    let err = connection.send_request(Request::get("/"), None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidState(Phase::Disconnected)));
    assert_eq!(connection.phase(), Phase::Disconnected);
}

#[tokio::test]
async fn close_disconnected() {
    let connection = Connection::new(uri(), Options::default());
    let mut events = connection.events().unwrap();
    assert!(connection.events().is_none(), "single consumer");

    connection.close_async().unwrap();
    assert!(matches!(events.next().await, Some(ConnectionEvent::Disconnected)));
    assert_eq!(connection.phase(), Phase::Closed);

    let err = connection.close_async().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidState(Phase::Closed)));
    let err = connection.connect_async().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidState(Phase::Closed)));
}

#[test]
fn outside_runtime() {
    let connection = Connection::new(uri(), Options::default());
    let err = connection.connect_async().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Runtime(_)));
    assert_eq!(connection.phase(), Phase::Disconnected);
}

#[tokio::test]
async fn busy_flag() {
    let connection = Connection::new(uri(), Options::default());
    assert!(!connection.is_busy());
    connection.clone().set_busy(true);
    assert!(connection.is_busy());
}
