use super::{HeaderError, HeaderField, HeaderMap};

const fn is_send_sync<T: Send + Sync>() { }
const _: () = {
    is_send_sync::<HeaderMap>();
    is_send_sync::<HeaderField>();
};

#[test]
fn header_map() {
    let mut map = HeaderMap::new();

    map.append("Content-Type", "text/plain").unwrap();
    map.append("Accept", "*/*").unwrap();
    map.append("X-Trace", "a").unwrap();
    map.append("x-trace", "b").unwrap();

    assert_eq!(map.len(), 4);
    assert!(map.contains("content-type"));
    assert!(map.contains("CONTENT-TYPE"));
    assert!(!map.contains("content-length"));

    assert_eq!(map.get("accept"), Some("*/*"));
    assert_eq!(map.get("X-TRACE"), Some("a"));
    assert_eq!(map.get_all("x-trace").collect::<Vec<_>>(), ["a", "b"]);

    let order: Vec<_> = map.iter().map(|(name, _)| name).collect();
    assert_eq!(order, ["Content-Type", "Accept", "X-Trace", "x-trace"]);
}

#[test]
fn header_map_insert() {
    let mut map = HeaderMap::new();

    map.append("A", "1").unwrap();
    map.append("B", "2").unwrap();
    map.append("a", "3").unwrap();
    map.append("C", "4").unwrap();

    assert_eq!(map.insert("a", "5").unwrap().as_deref(), Some("1"));
    assert_eq!(map.insert("D", "6").unwrap(), None);

    let fields: Vec<_> = map.iter().collect();
    assert_eq!(fields, [("A", "5"), ("B", "2"), ("C", "4"), ("D", "6")]);
}

#[test]
fn header_map_remove() {
    let mut map = HeaderMap::new();

    map.append("Via", "1").unwrap();
    map.append("Host", "example.test").unwrap();
    map.append("via", "2").unwrap();

    assert_eq!(map.remove("VIA").as_deref(), Some("1"));
    assert_eq!(map.remove("via"), None);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("host"), Some("example.test"));
}

#[test]
fn header_validation() {
    let mut map = HeaderMap::new();

    assert_eq!(map.append("", "x"), Err(HeaderError::Empty));
    assert_eq!(map.append("Bad Name", "x"), Err(HeaderError::InvalidName));
    assert_eq!(map.append("Bad:Name", "x"), Err(HeaderError::InvalidName));
    assert_eq!(map.append("X-Inject", "a\r\nEvil: 1"), Err(HeaderError::InvalidValue));
    assert_eq!(map.append("X-Utf8", "caf\u{e9}"), Err(HeaderError::InvalidValue));
    assert_eq!(map.insert("X-Inject", "\n"), Err(HeaderError::InvalidValue));

    assert!(map.is_empty());

    map.append("X-Tab", "a\tb").unwrap();
    map.append("X-Empty", "").unwrap();
    assert_eq!(map.len(), 2);
}
