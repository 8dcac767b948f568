use super::{Method, Request, RequestBody, Uri, UriError, Version};

#[test]
fn test_parse_uri() {
    macro_rules! test {
        (#[error] $input:literal => $err:ident) => {
            assert_eq!(Uri::parse($input).unwrap_err(), UriError::$err, "{}", $input);
        };
        ($input:literal => $host:literal, $port:literal, $path:literal, $host_header:literal) => {
            let uri = Uri::parse($input).unwrap();
            assert_eq!(uri.host(), $host, "host of {}", $input);
            assert_eq!(uri.port(), $port, "port of {}", $input);
            assert_eq!(uri.path(), $path, "path of {}", $input);
            assert_eq!(uri.host_header(), $host_header, "host header of {}", $input);
        };
    }

    test!("http://example.test" => "example.test", 80, "/", "example.test");
    test!("http://example.test/" => "example.test", 80, "/", "example.test");
    test!("http://Example.Test:8080/thing" => "example.test", 8080, "/thing", "example.test:8080");
    test!("HTTP://example.test/a/b?c=d" => "example.test", 80, "/a/b?c=d", "example.test");
    test!("http://example.test?q=1" => "example.test", 80, "/?q=1", "example.test");
    test!("http://example.test/index#top" => "example.test", 80, "/index", "example.test");
    test!("http://127.0.0.1:9200/_search" => "127.0.0.1", 9200, "/_search", "127.0.0.1:9200");
    test!("http://[::1]:3000/" => "::1", 3000, "/", "[::1]:3000");
    test!("http://[::1]/" => "::1", 80, "/", "[::1]");
    test!("  http://example.test:80/x  " => "example.test", 80, "/x", "example.test");

    test!(#[error] "" => Empty);
    test!(#[error] "example.test/thing" => MissingScheme);
    test!(#[error] "https://example.test" => UnsupportedScheme);
    test!(#[error] "ftp://example.test" => UnsupportedScheme);
    test!(#[error] "http:///thing" => InvalidAuthority);
    test!(#[error] "http://user@example.test" => InvalidAuthority);
    test!(#[error] "http://exa mple.test" => InvalidAuthority);
    test!(#[error] "http://[::1" => InvalidAuthority);
    test!(#[error] "http://[nope]:80" => InvalidAuthority);
    test!(#[error] "http://example.test:0" => InvalidPort);
    test!(#[error] "http://example.test:99999" => InvalidPort);
    test!(#[error] "http://example.test:http" => InvalidPort);
    test!(#[error] "http://example.test/a b" => InvalidPath);
}

#[test]
fn test_method_version() {
    assert_eq!(Method::from_bytes(b"GET"), Some(Method::GET));
    assert_eq!("PATCH".parse::<Method>().unwrap(), Method::PATCH);
    assert!("get".parse::<Method>().is_err());
    assert_eq!(Method::DELETE.as_str(), "DELETE");

    assert_eq!(Version::from_bytes(b"HTTP/1.1"), Some(Version::HTTP_11));
    assert_eq!(Version::from_bytes(b"HTTP/1.0"), Some(Version::HTTP_10));
    assert_eq!(Version::from_bytes(b"HTTP/2.0"), None);
    assert_eq!(Version::default().to_string(), "HTTP/1.1");
}

#[test]
fn test_request_content_length() {
    let request = Request::post("/docs");
    assert_eq!(request.content_length(), None);

    let request = Request::post("/docs")
        .with_header("Content-Length", " 12 ")
        .unwrap();
    assert_eq!(request.content_length(), Some(12));

    let request = request.with_content_length(3);
    assert_eq!(request.content_length(), Some(3));
    assert_eq!(request.method(), Method::POST);
    assert_eq!(request.target(), "/docs");
}

#[tokio::test]
async fn test_request_body_measure() {
    use tokio::io::AsyncReadExt;

    let mut body = RequestBody::from("hello world");
    assert!(body.is_seekable());

    let mut head = [0u8; 6];
    body.read_exact(&mut head).await.unwrap();

    // measuring rewinds to the start
    assert_eq!(body.measure().await.unwrap(), Some(11));

    let mut all = String::new();
    body.read_to_string(&mut all).await.unwrap();
    assert_eq!(all, "hello world");

    let mut body = RequestBody::stream(&b"abc"[..]);
    assert!(!body.is_seekable());
    assert_eq!(body.measure().await.unwrap(), None);
}
