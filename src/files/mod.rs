//! Static file serving support: the in-memory cache and the filesystem
//! watcher that invalidates it.

pub mod cache;
pub mod watcher;

pub use cache::{CachedFile, FileCache, FileError};
