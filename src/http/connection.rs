use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::http::parser::{ParseError, parse_request};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::context::ServerContext;
use crate::server::dispatch;

/// What one pass of the read loop produced.
#[derive(Debug)]
pub enum Inbound {
    Request(Request),
    /// Text with no GET/POST line; answered with 501.
    Malformed(String),
}

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    context: Arc<ServerContext>,
    shutdown: broadcast::Receiver<()>,
    read_buf: Vec<u8>,
    // Tail of a multi-byte character cut off by the last read.
    undecoded: BytesMut,
    // Text of a POST whose body is still on the way.
    pending: Option<String>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Inbound),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        context: Arc<ServerContext>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        let buf_size = context.config.server.read_buffer_size.max(1);
        Self {
            stream,
            peer,
            context,
            shutdown,
            read_buf: vec![0u8; buf_size],
            undecoded: BytesMut::new(),
            pending: None,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(inbound) => ConnectionState::Processing(inbound),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(inbound) => {
                    let (response, keep_alive) = self.handle(inbound).await;
                    ConnectionState::Writing(ResponseWriter::new(&response), keep_alive)
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    trace!(peer = %self.peer, bytes = writer.len(), "Response written");

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        debug!(peer = %self.peer, "Connection closed");
        Ok(())
    }

    /// Reads until a complete request (or an unparseable one) is available.
    ///
    /// Returns `None` when the peer hangs up, the read times out or the
    /// server is shutting down.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Inbound>> {
        let read_timeout = self.context.config.server.read_timeout();

        loop {
            let n = tokio::select! {
                _ = self.shutdown.recv() => {
                    debug!(peer = %self.peer, "Stopping connection for shutdown");
                    return Ok(None);
                }
                read = timeout(read_timeout, self.stream.read(&mut self.read_buf)) => match read {
                    Ok(result) => result?,
                    Err(_) => {
                        debug!(peer = %self.peer, "Read timed out");
                        return Ok(None);
                    }
                },
            };

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }

            self.undecoded.extend_from_slice(&self.read_buf[..n]);
            let text = decode_available(&mut self.undecoded);
            if text.is_empty() {
                continue;
            }

            let prior = self.pending.take();
            match parse_request(&text, prior.as_deref()) {
                Ok(request) if request.is_incomplete => {
                    trace!(
                        peer = %self.peer,
                        path = %request.path,
                        "POST body not received yet, waiting for next read"
                    );
                    self.pending = Some(request.raw);
                }
                Ok(request) => return Ok(Some(Inbound::Request(request))),
                Err(ParseError::Malformed) => {
                    let mut raw = prior.unwrap_or_default();
                    raw.push_str(&text);
                    return Ok(Some(Inbound::Malformed(raw)));
                }
            }
        }
    }

    async fn handle(&self, inbound: Inbound) -> (Response, bool) {
        match inbound {
            Inbound::Malformed(raw) => {
                warn!(peer = %self.peer, "Malformed request");
                let response = Response::error_page(
                    StatusCode::NotImplemented,
                    "Only GET and POST requests are supported.",
                    &raw,
                );
                (response, true)
            }

            Inbound::Request(request) => {
                let keep_alive = request.keep_alive();
                let method = request.method;
                let path = request.path.clone();

                let mut response = dispatch::dispatch(&self.context, request).await;
                response.keep_alive = keep_alive;

                info!(
                    peer = %self.peer,
                    method = method.as_str(),
                    path = %path,
                    status = response.status.as_u16(),
                    "Request served"
                );
                (response, keep_alive)
            }
        }
    }
}

/// Takes every complete character out of `buf` as text.
///
/// A multi-byte sequence cut off at the end stays in `buf` for the next read;
/// genuinely invalid bytes are replaced.
pub fn decode_available(buf: &mut BytesMut) -> String {
    let valid = match std::str::from_utf8(&buf[..]) {
        Ok(_) => buf.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => buf.len(),
    };
    let chunk = buf.split_to(valid);
    String::from_utf8_lossy(&chunk).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_character_is_carried() {
        let snowman = "☃".as_bytes();
        let mut buf = BytesMut::from(&b"GET /"[..]);
        buf.extend_from_slice(&snowman[..1]);

        assert_eq!(decode_available(&mut buf), "GET /");
        assert_eq!(buf.len(), 1);

        buf.extend_from_slice(&snowman[1..]);
        assert_eq!(decode_available(&mut buf), "☃");
        assert!(buf.is_empty());
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut buf = BytesMut::from(&b"a\xffb"[..]);
        assert_eq!(decode_available(&mut buf), "a\u{fffd}b");
        assert!(buf.is_empty());
    }
}
