//! Path → handler tables.
//!
//! Two tables: permanent handlers, and one-time handlers that are removed the
//! first time they resolve. The one-time table is bounded; when it overflows
//! the oldest registrations are dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::http::request::Request;
use crate::http::response::Response;

/// A dynamic page. Errors are rendered as 500 pages by the dispatcher.
pub type Handler = Arc<dyn Fn(&Request) -> anyhow::Result<Response> + Send + Sync>;

pub struct HandlerRegistry {
    permanent: RwLock<HashMap<String, Handler>>,
    once: Mutex<VecDeque<(String, Handler)>>,
    once_capacity: usize,
}

/// Paths are matched without their single leading `/`.
pub fn route_key(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

impl HandlerRegistry {
    pub fn new(once_capacity: usize) -> Self {
        Self {
            permanent: RwLock::new(HashMap::new()),
            once: Mutex::new(VecDeque::new()),
            once_capacity,
        }
    }

    pub fn register<F>(&self, path: &str, handler: F)
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let key = route_key(path).to_string();
        debug!(path = %key, "Registered handler");
        self.permanent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(handler));
    }

    /// Registers a handler that answers exactly one request.
    pub fn register_once<F>(&self, path: &str, handler: F)
    where
        F: Fn(&Request) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        let key = route_key(path).to_string();
        let mut once = self.once.lock().unwrap_or_else(PoisonError::into_inner);

        once.retain(|(k, _)| *k != key);
        once.push_back((key, Arc::new(handler)));

        while once.len() > self.once_capacity {
            if let Some((evicted, _)) = once.pop_front() {
                debug!(path = %evicted, "Evicted one-time handler");
            }
        }
    }

    /// Removes `path` from both tables. Returns whether anything was removed.
    pub fn unregister(&self, path: &str) -> bool {
        let key = route_key(path);
        let removed = self
            .permanent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();

        let mut once = self.once.lock().unwrap_or_else(PoisonError::into_inner);
        let before = once.len();
        once.retain(|(k, _)| k != key);

        removed || once.len() != before
    }

    /// Looks up the handler for `path`. Permanent handlers win; a matching
    /// one-time handler is removed as it is returned.
    pub fn resolve(&self, path: &str) -> Option<Handler> {
        let key = route_key(path);

        if let Some(handler) = self
            .permanent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Some(Arc::clone(handler));
        }

        let mut once = self.once.lock().unwrap_or_else(PoisonError::into_inner);
        let pos = once.iter().position(|(k, _)| k == key)?;
        once.remove(pos).map(|(_, handler)| handler)
    }

    pub fn permanent_count(&self) -> usize {
        self.permanent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn once_count(&self) -> usize {
        self.once
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new(256)
    }
}
