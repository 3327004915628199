use lantern::http::date;
use lantern::http::parser::{ParseError, parse_cookies, parse_range, parse_request, split_lines};
use lantern::http::request::{ByteRange, Method};

#[test]
fn test_parse_simple_get_request() {
    let req = "GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.query.is_empty());
    assert!(!parsed.is_incomplete);
}

#[test]
fn test_parse_query_string_decoding() {
    let req = "GET /p?a=1&b=two%20words HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.path, "/p");
    assert_eq!(parsed.query.len(), 2);
    assert_eq!(parsed.query.get("a"), Some("1"));
    assert_eq!(parsed.query.get("b"), Some("two words"));
}

#[test]
fn test_parse_query_plus_and_missing_value() {
    let req = "GET /search?q=rust+lang&flag&empty= HTTP/1.1\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.query.get("q"), Some("rust lang"));
    assert_eq!(parsed.query.get("flag"), Some(""));
    assert_eq!(parsed.query.get("empty"), Some(""));
}

#[test]
fn test_parse_query_trailing_separators_and_fragment() {
    let req = "GET /p?a=1&b=2&&?#section HTTP/1.1\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.query.len(), 2);
    assert_eq!(parsed.query.get("a"), Some("1"));
    assert_eq!(parsed.query.get("b"), Some("2"));
}

#[test]
fn test_parse_query_duplicate_last_wins() {
    let parsed = parse_request("GET /p?x=1&x=2 HTTP/1.1\r\n\r\n", None).unwrap();
    assert_eq!(parsed.query.get("x"), Some("2"));
    assert_eq!(parsed.query.len(), 1);
}

#[test]
fn test_parse_path_is_decoded_and_query_not_double_decoded() {
    let req = "GET /my%20docs/file.txt?v=100%2525 HTTP/1.1\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.path, "/my docs/file.txt");
    assert_eq!(parsed.query.get("v"), Some("100%25"));
}

#[test]
fn test_parse_post_body_variables() {
    let req = "POST /form HTTP/1.1\r\nHost: localhost\r\nContent-Length: 16\r\n\r\nname=chris&age=5";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/form");
    assert!(!parsed.is_incomplete);
    assert_eq!(parsed.body_vars.get("name"), Some("chris"));
    assert_eq!(parsed.body_vars.get("age"), Some("5"));
}

#[test]
fn test_parse_post_keeps_url_query() {
    let req = "POST /form?from=home HTTP/1.1\r\nContent-Length: 3\r\n\r\na=1";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.query.get("from"), Some("home"));
    assert_eq!(parsed.body_vars.get("a"), Some("1"));
}

#[test]
fn test_parse_split_post_is_incomplete_then_reassembled() {
    let first = "POST /form HTTP/1.1\r\nHost: localhost\r\nContent-Length: 16\r\n\r\n";
    let partial = parse_request(first, None).unwrap();

    assert!(partial.is_incomplete);
    assert!(partial.body_vars.is_empty());
    assert_eq!(partial.raw, first);

    let second = "name=chris&age=5";
    let full = parse_request(second, Some(&partial.raw)).unwrap();

    assert!(!full.is_incomplete);
    assert_eq!(full.path, "/form");
    assert_eq!(full.body_vars.get("name"), Some("chris"));
    assert_eq!(full.body_vars.get("age"), Some("5"));
    assert_eq!(full.raw, format!("{first}{second}"));
}

#[test]
fn test_parse_post_without_content_length_is_complete() {
    let req = "POST /ping HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert!(!parsed.is_incomplete);
    assert!(parsed.body_vars.is_empty());
}

#[test]
fn test_parse_get_with_content_length_is_never_incomplete() {
    let req = "GET / HTTP/1.1\r\nContent-Length: 10\r\n\r\n";
    assert!(!parse_request(req, None).unwrap().is_incomplete);
}

#[test]
fn test_parse_prior_ignored_when_new_text_has_request_line() {
    let parsed = parse_request("GET /b HTTP/1.1\r\n\r\n", Some("garbage")).unwrap();
    assert_eq!(parsed.path, "/b");
}

#[test]
fn test_parse_request_line_after_leading_noise() {
    let req = "\r\nGET /late HTTP/1.1\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();
    assert_eq!(parsed.path, "/late");
}

#[test]
fn test_parse_malformed_request() {
    let result = parse_request("PUT / HTTP/1.1\r\n\r\n", None);
    assert_eq!(result.unwrap_err(), ParseError::Malformed);

    let result = parse_request("hello", Some("still nothing"));
    assert_eq!(result.unwrap_err(), ParseError::Malformed);
}

#[test]
fn test_parse_cookies() {
    let req = "GET / HTTP/1.1\r\nCookie: a=1; b=2\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert_eq!(parsed.cookies.len(), 2);
    assert_eq!(parsed.cookie("a"), Some("1"));
    assert_eq!(parsed.cookie("b"), Some("2"));

    let flag = parse_cookies("flag");
    assert_eq!(flag.get("flag").map(String::as_str), Some(""));
}

#[test]
fn test_parse_first_cookie_header_wins() {
    let req = "GET / HTTP/1.1\r\nCookie: SSID=abc\r\nCookie: SSID=zzz\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();
    assert_eq!(parsed.session_id(), Some("abc"));
}

#[test]
fn test_parse_range_header() {
    let req = "GET /video.mp4 HTTP/1.1\r\nRange: bytes=0-10\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();
    assert_eq!(parsed.range, Some(ByteRange::new(0, 10)));

    assert_eq!(parse_range("bytes=100-"), Some(ByteRange::open(100)));
    assert_eq!(parse_range("bytes=-500"), None);
    assert_eq!(parse_range("items=0-1"), None);
}

#[test]
fn test_parse_if_modified_since() {
    let stamp = "Sun, 06 Nov 1994 08:49:37 GMT";
    let req = format!("GET /a.css HTTP/1.1\r\nIf-Modified-Since: {stamp}\r\n\r\n");
    let parsed = parse_request(&req, None).unwrap();

    assert_eq!(parsed.if_modified_since, date::parse(stamp));
    assert!(parsed.if_modified_since.is_some());
}

#[test]
fn test_parse_websocket_upgrade_is_exact_match() {
    let req = "GET /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n";
    assert!(parse_request(req, None).unwrap().websocket_upgrade);

    let req = "GET /ws HTTP/1.1\r\nUpgrade: WebSocket\r\n\r\n";
    assert!(!parse_request(req, None).unwrap().websocket_upgrade);
}

#[test]
fn test_parse_missing_version() {
    let parsed = parse_request("GET /bare", None).unwrap();
    assert_eq!(parsed.path, "/bare");
    assert_eq!(parsed.version, "");
}

#[test]
fn test_split_lines() {
    assert_eq!(split_lines("a\r\nb\r\n\r\n"), vec!["a", "b", "", ""]);
}

#[test]
fn test_parse_duplicate_headers_first_wins() {
    let req = "POST /form HTTP/1.1\r\nContent-Length: 16\r\ncontent-length: 99\r\nContent-Length: 3\r\n\r\n";
    let parsed = parse_request(req, None).unwrap();

    assert!(parsed.is_incomplete);
    assert_eq!(parsed.content_length(), 16);
    assert_eq!(parsed.header("Content-Length"), Some("16"));
    assert_eq!(parsed.header("content-length"), Some("16"));
    assert_eq!(parsed.headers.len(), 1);
}
