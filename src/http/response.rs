use std::time::SystemTime;

use bytes::Bytes;

use crate::http::request::ByteRange;

pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// HTTP status codes the server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 206 Partial Content
    PartialContent,
    /// 304 Not Modified
    NotModified,
    /// 403 Forbidden
    Forbidden,
    /// 404 File Not Found
    NotFound,
    /// 416 Requested Range Not Satisfiable
    RangeNotSatisfiable,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use lantern::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::PartialContent => 206,
            StatusCode::NotModified => 304,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::RangeNotSatisfiable => 416,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the reason phrase written on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::PartialContent => "Partial Content",
            StatusCode::NotModified => "Not Modified",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "File Not Found",
            StatusCode::RangeNotSatisfiable => "Requested Range Not Satisfiable",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    /// `"404 File Not Found"`
    pub fn status_line(&self) -> String {
        format!("{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// An HTTP response waiting to be serialized.
///
/// There is no Content-Length field: the writer always derives it from
/// `body` after any range slicing.
#[derive(Debug, Clone)]
pub struct Response {
    pub version: String,
    pub status: StatusCode,
    /// `None` omits the Content-Type header
    pub content_type: Option<String>,
    pub last_modified: Option<SystemTime>,
    pub cookies: Vec<(String, String)>,
    pub body: Bytes,
    /// Serve only this slice of `body`
    pub range: Option<ByteRange>,
    /// `false` sends `Connection: close`
    pub keep_alive: bool,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type("application/json")
///     .body("{}")
///     .build();
/// ```
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            response: Response {
                version: "HTTP/1.1".to_string(),
                status,
                content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
                last_modified: None,
                cookies: Vec::new(),
                body: Bytes::new(),
                range: None,
                keep_alive: true,
            },
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.response.content_type = Some(content_type.into());
        self
    }

    pub fn no_content_type(mut self) -> Self {
        self.response.content_type = None;
        self
    }

    pub fn last_modified(mut self, time: SystemTime) -> Self {
        self.response.last_modified = Some(time);
        self
    }

    /// Queues a `Set-Cookie: key=value; Path=/` header.
    pub fn cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.response.set_cookie(key, value);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.response.body = body.into();
        self
    }

    pub fn range(mut self, range: Option<ByteRange>) -> Self {
        self.response.range = range;
        self
    }

    pub fn build(self) -> Response {
        self.response
    }
}

impl Response {
    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok).body(body).build()
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::ok(body.into())
    }

    pub fn text(body: impl Into<String>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .content_type("text/plain")
            .body(body.into())
            .build()
    }

    /// A 200 response carrying raw bytes, e.g. an image.
    pub fn bytes(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .content_type(content_type)
            .body(body)
            .build()
    }

    /// 304 with an empty body.
    pub fn not_modified(last_modified: SystemTime) -> Self {
        ResponseBuilder::new(StatusCode::NotModified)
            .no_content_type()
            .last_modified(last_modified)
            .build()
    }

    /// Builds the HTML error page used for every 4xx/5xx the server emits.
    ///
    /// The received request text is echoed back (escaped, one `<br>` per
    /// line) below the message to help with debugging.
    pub fn error_page(status: StatusCode, message: &str, raw_request: &str) -> Self {
        let title = status.status_line();
        let body = format!(
            "<html><head><title>{title}</title></head><body>\
             <h1>{title}</h1><p>{message}</p><hr>\
             <p><b>Request:</b><br>{request}</p>\
             </body></html>",
            title = title,
            message = html_escape::encode_text(message),
            request = escape_request(raw_request),
        );

        ResponseBuilder::new(status).body(body).build()
    }

    /// 416 page for `range` against a resource of `total` bytes.
    pub fn range_not_satisfiable(range: ByteRange, total: u64, raw_request: &str) -> Self {
        let message = format!(
            "Requested bytes {}-{} of a {} byte resource",
            range.start,
            range.end.map(|e| e.to_string()).unwrap_or_default(),
            total
        );
        Self::error_page(StatusCode::RangeNotSatisfiable, &message, raw_request)
    }

    pub fn set_cookie(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cookies.push((key.into(), value.into()));
    }
}

fn escape_request(raw: &str) -> String {
    html_escape::encode_text(raw)
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}
