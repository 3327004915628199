use lantern::http::request::ByteRange;
use lantern::http::response::{DEFAULT_CONTENT_TYPE, Response, ResponseBuilder, StatusCode};
use std::time::{Duration, UNIX_EPOCH};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::PartialContent.as_u16(), 206);
    assert_eq!(StatusCode::NotModified.as_u16(), 304);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::RangeNotSatisfiable.as_u16(), 416);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "File Not Found");
    assert_eq!(
        StatusCode::RangeNotSatisfiable.reason_phrase(),
        "Requested Range Not Satisfiable"
    );
    assert_eq!(StatusCode::NotImplemented.status_line(), "501 Not Implemented");
}

#[test]
fn test_response_builder_defaults() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.version, "HTTP/1.1");
    assert_eq!(response.content_type.as_deref(), Some(DEFAULT_CONTENT_TYPE));
    assert!(response.body.is_empty());
    assert!(response.cookies.is_empty());
    assert!(response.range.is_none());
    assert!(response.keep_alive);
}

#[test]
fn test_response_builder_fluent_api() {
    let modified = UNIX_EPOCH + Duration::from_secs(1_000_000);
    let response = ResponseBuilder::new(StatusCode::Ok)
        .content_type("image/png")
        .last_modified(modified)
        .cookie("SSID", "abc")
        .cookie("theme", "dark")
        .range(Some(ByteRange::new(0, 1)))
        .body(vec![0x89, b'P', b'N', b'G'])
        .build();

    assert_eq!(response.content_type.as_deref(), Some("image/png"));
    assert_eq!(response.last_modified, Some(modified));
    assert_eq!(response.cookies.len(), 2);
    assert_eq!(response.cookies[0], ("SSID".to_string(), "abc".to_string()));
    assert_eq!(response.range, Some(ByteRange::new(0, 1)));
    assert_eq!(&response.body[..], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn test_response_helpers() {
    let ok = Response::ok("hi");
    assert_eq!(ok.status, StatusCode::Ok);
    assert_eq!(&ok.body[..], b"hi");

    let text = Response::text("plain");
    assert_eq!(text.content_type.as_deref(), Some("text/plain"));

    let image = Response::bytes("image/gif", vec![1u8, 2, 3]);
    assert_eq!(image.content_type.as_deref(), Some("image/gif"));
    assert_eq!(image.body.len(), 3);

    let not_modified = Response::not_modified(UNIX_EPOCH);
    assert_eq!(not_modified.status, StatusCode::NotModified);
    assert!(not_modified.body.is_empty());
    assert!(not_modified.content_type.is_none());
}

#[test]
fn test_error_page_embeds_escaped_request() {
    let raw = "GET /<script> HTTP/1.1\r\nHost: x\r\n\r\n";
    let page = Response::error_page(StatusCode::NotFound, "Missing <thing>", raw);
    let body = String::from_utf8(page.body.to_vec()).unwrap();

    assert_eq!(page.status, StatusCode::NotFound);
    assert!(body.contains("<h1>404 File Not Found</h1>"));
    assert!(body.contains("Missing &lt;thing&gt;"));
    assert!(body.contains("GET /&lt;script&gt; HTTP/1.1<br>Host: x<br>"));
    assert!(!body.contains("<script>"));
}

#[test]
fn test_set_cookie_appends() {
    let mut response = Response::html("<p>hi</p>");
    response.set_cookie("a", "1");
    response.set_cookie("b", "2");
    assert_eq!(response.cookies.len(), 2);
}
