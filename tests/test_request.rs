use lantern::http::request::{ByteRange, Method, RequestBuilder};

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_content_length_parsing() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .header("Content-Length", "42")
        .build()
        .unwrap();

    assert_eq!(req.content_length(), 42);
}

#[test]
fn test_request_content_length_missing_or_invalid() {
    let missing = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .build()
        .unwrap();
    assert_eq!(missing.content_length(), 0);

    let invalid = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .header("Content-Length", "not-a-number")
        .build()
        .unwrap();
    assert_eq!(invalid.content_length(), 0);
}

#[test]
fn test_request_keep_alive_default() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .build()
        .unwrap();

    assert!(req.keep_alive());
}

#[test]
fn test_request_keep_alive_close() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Connection", "Close")
        .build()
        .unwrap();

    assert!(!req.keep_alive());
}

#[test]
fn test_request_keep_alive_explicit_header() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Connection", "Keep-Alive")
        .build()
        .unwrap();

    assert!(req.keep_alive());
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(Method::from_str("PUT"), None);
    assert_eq!(Method::from_str("get"), None); // Case-sensitive
    assert_eq!(Method::POST.as_str(), "POST");
}

#[test]
fn test_request_session_id_from_cookie() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .cookie("SSID", "f00d")
        .build()
        .unwrap();

    assert_eq!(req.session_id(), Some("f00d"));
    assert_eq!(req.cookie("other"), None);
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());

    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/form")
        .body_var("name", "chris")
        .query("page", "2")
        .build()
        .unwrap();
    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.body_vars.get("name"), Some("chris"));
    assert_eq!(req.query.get("page"), Some("2"));
    assert!(!req.is_incomplete);
}

#[test]
fn test_byte_range_resolution() {
    assert_eq!(ByteRange::new(0, 10).resolve(20), Some((0, 10)));
    assert_eq!(ByteRange::new(0, 19).resolve(20), Some((0, 19)));
    assert_eq!(ByteRange::new(0, 20).resolve(20), None);
    assert_eq!(ByteRange::new(5, 2).resolve(20), None);
    assert_eq!(ByteRange::open(15).resolve(20), Some((15, 19)));
    assert_eq!(ByteRange::open(20).resolve(20), None);
    assert_eq!(ByteRange::open(0).resolve(0), None);
}
