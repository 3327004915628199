//! Accept loop, shared server state and request dispatch.

pub mod context;
pub mod dispatch;
pub mod listener;
pub mod registry;

pub use context::ServerContext;
pub use listener::Server;
pub use registry::{Handler, HandlerRegistry};
