//! HTTP protocol implementation.
//!
//! This module implements a small HTTP/1.1 server engine with keep-alive
//! connections, hand-written request scanning and raw-byte responses.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection read/dispatch/write state machine
//! - **`parser`**: Turns decoded request text into a [`request::Request`]
//! - **`query`**: `key=value&...` scanning and URL decoding
//! - **`request`**: HTTP request representation and accessors
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//! - **`date`**: HTTP date formatting and parsing
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘   (a POST missing its body loops here,
//!               │           carrying the text into the next read)
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Handler, static file or error page
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lantern::config::Config;
//! use lantern::http::response::Response;
//! use lantern::server::{Server, ServerContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let context = Arc::new(ServerContext::new(Config::load()?));
//!     context.handlers.register("/hello", |req| {
//!         let name = req.query.get("name").unwrap_or("world");
//!         Ok(Response::text(format!("Hello, {name}!")))
//!     });
//!
//!     let server = Server::bind(context).await?;
//!     server.run(async { let _ = tokio::signal::ctrl_c().await; }).await
//! }
//! ```

pub mod connection;
pub mod date;
pub mod mime;
pub mod parser;
pub mod query;
pub mod request;
pub mod response;
pub mod writer;
