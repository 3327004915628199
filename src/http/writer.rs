use std::time::SystemTime;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::date;
use crate::http::response::{Response, StatusCode};

pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Serializes a response to wire bytes.
///
/// A satisfiable range slices the body and turns a 200 into 206. An
/// unsatisfiable one replaces the whole response with a 416 page.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let total = resp.body.len() as u64;
    let mut body: &[u8] = &resp.body;
    let mut status = resp.status;
    let mut content_range = None;

    if let Some(range) = resp.range {
        // Static files are checked with the request text at hand; this covers
        // ranges set on handler responses.
        let Some((start, end)) = range.resolve(total) else {
            let mut unsatisfiable = Response::range_not_satisfiable(range, total, "");
            unsatisfiable.keep_alive = resp.keep_alive;
            return serialize_response(&unsatisfiable);
        };

        body = &resp.body[start as usize..=end as usize];
        content_range = Some(format!("bytes {start}-{end}/{total}"));
        if status == StatusCode::Ok {
            status = StatusCode::PartialContent;
        }
    }

    let mut head = String::with_capacity(256);

    // Status line
    head.push_str(&format!(
        "{} {} {}\r\n",
        resp.version,
        status.as_u16(),
        status.reason_phrase()
    ));
    head.push_str(&format!("Date: {}\r\n", date::format(SystemTime::now())));
    head.push_str(&format!("Server: {SERVER_NAME}\r\n"));

    for (key, value) in &resp.cookies {
        head.push_str(&format!("Set-Cookie: {key}={value}; Path=/\r\n"));
    }

    if let Some(modified) = resp.last_modified {
        head.push_str(&format!("Last-Modified: {}\r\n", date::format(modified)));
    }

    head.push_str(if resp.keep_alive {
        "Connection: Keep-Alive\r\n"
    } else {
        "Connection: close\r\n"
    });

    if let Some(content_range) = content_range {
        head.push_str(&format!("Content-Range: {content_range}\r\n"));
    }

    if let Some(content_type) = &resp.content_type {
        head.push_str(&format!("Content-Type: {content_type}; charset=UTF-8\r\n"));
    }

    // Header/body separator
    head.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));

    let mut buf = Vec::with_capacity(head.len() + body.len());
    buf.extend_from_slice(head.as_bytes());
    buf.extend_from_slice(body);
    buf
}

/// A serialized response, written to the socket in one call.
pub struct ResponseWriter {
    buffer: Vec<u8>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub async fn write_to_stream(&self, stream: &mut TcpStream) -> anyhow::Result<()> {
        stream.write_all(&self.buffer).await?;
        stream.flush().await?;
        Ok(())
    }
}
