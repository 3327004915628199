use std::collections::HashMap;
use std::time::SystemTime;

use crate::http::query::Variables;

/// Name of the cookie that carries the browser's session id.
pub const SESSION_COOKIE: &str = "SSID";

/// HTTP request methods the server understands.
///
/// Only request lines starting with `GET ` or `POST ` are recognised; anything
/// else is answered with 501 Not Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit form data
    POST,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// ```
    /// # use lantern::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

/// Inclusive byte range from a `Range: bytes=start-end` header.
///
/// `end` is `None` for the open form `bytes=start-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn open(start: u64) -> Self {
        Self { start, end: None }
    }

    /// Resolves the range against a body of `len` bytes.
    ///
    /// Returns the inclusive `(start, end)` pair, or `None` when the range
    /// cannot be satisfied.
    pub fn resolve(&self, len: u64) -> Option<(u64, u64)> {
        let end = match self.end {
            Some(end) => end,
            None => len.checked_sub(1)?,
        };
        if end >= len || self.start > end {
            return None;
        }
        Some((self.start, end))
    }
}

/// A parsed HTTP request.
///
/// Requests are produced by [`crate::http::parser::parse_request`] and are
/// never handed to a handler while `is_incomplete` is set.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// URL-decoded path with the query string removed (e.g. "/index.html")
    pub path: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Variables from the URL query string
    pub query: Variables,
    /// Variables from a urlencoded POST body
    pub body_vars: Variables,
    /// Header lines seen before the blank line
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub if_modified_since: Option<SystemTime>,
    pub range: Option<ByteRange>,
    /// An `Upgrade: websocket` line was present
    pub websocket_upgrade: bool,
    /// The POST body has not arrived yet; buffer `raw` and parse again
    /// once more bytes are read.
    pub is_incomplete: bool,
    /// The text this request was parsed from
    pub raw: String,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    query: Variables,
    body_vars: Variables,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    if_modified_since: Option<SystemTime>,
    range: Option<ByteRange>,
    websocket_upgrade: bool,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            query: Variables::new(),
            body_vars: Variables::new(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            if_modified_since: None,
            range: None,
            websocket_upgrade: false,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    pub fn body_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_vars.insert(key, value);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(key.into(), value.into());
        self
    }

    pub fn if_modified_since(mut self, time: SystemTime) -> Self {
        self.if_modified_since = Some(time);
        self
    }

    pub fn range(mut self, range: ByteRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn websocket_upgrade(mut self, upgrade: bool) -> Self {
        self.websocket_upgrade = upgrade;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let path = self.path.ok_or("path missing")?;
        let version = self.version.unwrap_or_else(|| "HTTP/1.1".to_string());
        let raw = format!("{} {} {}\r\n\r\n", method.as_str(), path, version);

        Ok(Request {
            method,
            path,
            version,
            query: self.query,
            body_vars: self.body_vars,
            headers: self.headers,
            cookies: self.cookies,
            if_modified_since: self.if_modified_since,
            range: self.range,
            websocket_upgrade: self.websocket_upgrade,
            is_incomplete: false,
            raw,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a header value by name. Exact matches win; otherwise the
    /// name is compared case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .map(|v| v.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// Only an explicit `Connection: close` ends the connection.
    pub fn keep_alive(&self) -> bool {
        self.header("Connection")
            .map(|v| !v.trim().eq_ignore_ascii_case("close"))
            .unwrap_or(true)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|v| v.as_str())
    }

    /// The session id cookie, if the browser sent one.
    pub fn session_id(&self) -> Option<&str> {
        self.cookie(SESSION_COOKIE)
    }
}
