use std::collections::HashMap;

use thiserror::Error;

use crate::http::date;
use crate::http::query::{Variables, decode_path, parse_pairs};
use crate::http::request::{ByteRange, Method, Request};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No `GET ` or `POST ` request line, even after merging a buffered fragment.
    #[error("malformed request: no GET or POST request line")]
    Malformed,
}

struct RequestLine<'a> {
    index: usize,
    method: Method,
    target: &'a str,
    version: &'a str,
}

/// Splits decoded request text on CRLF.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split("\r\n").collect()
}

/// Parses request text into a [`Request`].
///
/// When `raw` holds no request line and `prior` is the text of an earlier
/// incomplete read, the two are joined (`prior` first) and scanned once more.
/// A POST whose body has not arrived yet comes back with `is_incomplete` set;
/// the caller keeps `Request::raw` and passes it as `prior` on the next read.
pub fn parse_request(raw: &str, prior: Option<&str>) -> Result<Request, ParseError> {
    let lines = split_lines(raw);
    if let Some(line) = find_request_line(&lines) {
        return Ok(build_request(raw, &lines, line));
    }

    let prior = prior.ok_or(ParseError::Malformed)?;
    let merged = format!("{prior}{raw}");
    let lines = split_lines(&merged);
    let line = find_request_line(&lines).ok_or(ParseError::Malformed)?;
    Ok(build_request(&merged, &lines, line))
}

fn find_request_line<'a>(lines: &[&'a str]) -> Option<RequestLine<'a>> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let (method, rest) = if let Some(rest) = line.strip_prefix("GET ") {
            (Method::GET, rest)
        } else if let Some(rest) = line.strip_prefix("POST ") {
            (Method::POST, rest)
        } else {
            return None;
        };

        let (target, version) = rest.split_once(' ').unwrap_or((rest, ""));
        Some(RequestLine {
            index,
            method,
            target,
            version: version.trim(),
        })
    })
}

fn build_request(text: &str, lines: &[&str], line: RequestLine<'_>) -> Request {
    let (raw_path, raw_query) = line.target.split_once('?').unwrap_or((line.target, ""));
    let path = decode_path(raw_path);
    let query = parse_pairs(raw_query);

    let after = line.index + 1;
    let blank = lines[after..]
        .iter()
        .position(|l| l.trim().is_empty())
        .map(|pos| after + pos);

    // First occurrence wins, same as `first_header`.
    let mut headers: HashMap<String, String> = HashMap::new();
    for (key, value) in lines[after..blank.unwrap_or(lines.len())]
        .iter()
        .filter_map(|l| l.split_once(':'))
    {
        let key = key.trim();
        if !headers.keys().any(|k| k.eq_ignore_ascii_case(key)) {
            headers.insert(key.to_string(), value.trim().to_string());
        }
    }

    let body_vars = match (line.method, blank) {
        (Method::POST, Some(blank)) => {
            let body: Vec<&str> = lines[blank + 1..]
                .iter()
                .filter(|l| !l.trim().is_empty())
                .copied()
                .collect();
            parse_pairs(&body.join("&"))
        }
        _ => Variables::new(),
    };

    let content_length = first_header(lines, "Content-Length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut request = Request {
        method: line.method,
        path,
        version: line.version.to_string(),
        query,
        body_vars,
        headers,
        cookies: HashMap::new(),
        if_modified_since: None,
        range: None,
        websocket_upgrade: false,
        is_incomplete: false,
        raw: text.to_string(),
    };

    // Headers arrived, body did not: the read ended right after "\r\n\r\n".
    if request.method == Method::POST
        && request.body_vars.is_empty()
        && content_length > 0
        && ends_with_blank_pair(lines)
    {
        request.is_incomplete = true;
        return request;
    }

    request.if_modified_since = first_header(lines, "If-Modified-Since").and_then(date::parse);
    request.cookies = first_header(lines, "Cookie")
        .map(parse_cookies)
        .unwrap_or_default();
    request.range = first_header(lines, "Range").and_then(parse_range);
    request.websocket_upgrade = lines.iter().any(|l| *l == "Upgrade: websocket");

    request
}

fn ends_with_blank_pair(lines: &[&str]) -> bool {
    match lines {
        [.., a, b] => a.is_empty() && b.is_empty(),
        _ => false,
    }
}

/// Value of the first line named `name` (case-insensitive), trimmed.
fn first_header<'a>(lines: &[&'a str], name: &str) -> Option<&'a str> {
    lines.iter().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// `a=1; b=2; flag` -> `{a: "1", b: "2", flag: ""}`
pub fn parse_cookies(value: &str) -> HashMap<String, String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let (k, v) = piece.split_once('=').unwrap_or((piece, ""));
            (k.trim().to_string(), v.trim().to_string())
        })
        .collect()
}

/// `bytes=0-10` or `bytes=100-`. Suffix and multi-part ranges are ignored.
pub fn parse_range(value: &str) -> Option<ByteRange> {
    let bounds = value.trim().strip_prefix("bytes=")?;
    let (start, end) = bounds.split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim();
    if end.is_empty() {
        return Some(ByteRange::open(start));
    }
    Some(ByteRange::new(start, end.parse().ok()?))
}
