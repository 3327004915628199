//! Keeps the [`FileCache`] in step with the static root on disk.
//!
//! `notify` delivers events on its own thread; they are applied straight to
//! the cache, which takes the same lock as request-side reads.

use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::files::cache::FileCache;

/// Starts watching the cache root. Dropping the returned watcher stops it.
pub fn watch(cache: Arc<FileCache>, recursive: bool) -> notify::Result<RecommendedWatcher> {
    let root = cache.root().to_path_buf();
    let target = Arc::clone(&cache);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => apply_event(&target, &event),
            Err(err) => warn!(error = %err, "File watch event failed"),
        },
        NotifyConfig::default(),
    )?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&root, mode)?;

    info!(root = %root.display(), recursive, "Watching static files");
    Ok(watcher)
}

/// Applies one filesystem event to the cache.
pub fn apply_event(cache: &FileCache, event: &Event) {
    let keys: Vec<String> = event
        .paths
        .iter()
        .filter_map(|path| cache.key_for(path))
        .collect();
    if keys.is_empty() {
        return;
    }

    match &event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let [from, to] = keys.as_slice() {
                debug!(from = %from, to = %to, "Renamed");
                cache.rename(from, to);
            }
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            for key in &keys {
                if cache.remove(key) {
                    debug!(path = %key, "Dropped from file cache");
                }
            }
        }

        // One half of a rename with no pairing: look at what is on disk now.
        EventKind::Modify(ModifyKind::Name(_)) => {
            for key in &keys {
                if cache.root().join(key).exists() {
                    cache.refresh(key);
                } else {
                    cache.remove(key);
                }
            }
        }

        EventKind::Modify(_) | EventKind::Create(_) => {
            for key in &keys {
                cache.refresh(key);
            }
        }

        _ => {}
    }
}
