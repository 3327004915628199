//! Lantern - a from-scratch HTTP/1.1 server
//!
//! Core library: request parsing, response serialization, connection
//! handling, handler registration and static file caching.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
