//! In-memory cache of static files.
//!
//! Entries are keyed by their path relative to the root, `/`-separated
//! (`"index.html"`, `"css/site.css"`). Every read and write goes through one
//! mutex. Updates replace whole [`CachedFile`] values, so a caller's clone is
//! always a snapshot taken under that lock. Disk reads happen before the lock
//! is taken.
//!
//! Every invalidation (remove, rename, refresh, clear) bumps a generation
//! counter under the same lock. A load that started under an older generation
//! is served to its caller but not stored, so a file deleted mid-read never
//! lands in the cache.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http::{date, mime};

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found")]
    NotFound,
    #[error("access forbidden")]
    Forbidden,
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
}

/// A cached file's bytes plus metadata.
#[derive(Debug, Clone)]
pub struct CachedFile {
    pub path: String,
    pub contents: Bytes,
    pub size: u64,
    pub last_modified: SystemTime,
    pub is_binary: bool,
    /// Number of cache hits served for this entry
    pub load_count: u64,
}

impl CachedFile {
    pub fn new(
        path: impl Into<String>,
        contents: Bytes,
        is_binary: bool,
        last_modified: SystemTime,
    ) -> Self {
        Self {
            path: path.into(),
            size: contents.len() as u64,
            contents,
            last_modified: date::truncate_to_seconds(last_modified),
            is_binary,
            load_count: 0,
        }
    }
}

pub struct FileCache {
    root: PathBuf,
    index: String,
    max_entries: usize,
    entries: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    files: HashMap<String, CachedFile>,
    generation: u64,
}

impl Entries {
    fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>, max_entries: usize) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root,
            index: index.into(),
            max_entries,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the entry for `key` and bumps its load count.
    pub fn get(&self, key: &str) -> Option<CachedFile> {
        let mut entries = self.entries();
        let file = entries.files.get_mut(key)?;
        file.load_count += 1;
        Some(file.clone())
    }

    /// Inserts or replaces an entry. A new key is skipped once the cache
    /// holds `max_entries`; returns whether the entry was stored.
    pub fn put(
        &self,
        key: &str,
        contents: impl Into<Bytes>,
        is_binary: bool,
        last_modified: SystemTime,
    ) -> bool {
        let fresh = CachedFile::new(key, contents.into(), is_binary, last_modified);
        self.store(&mut self.entries(), fresh)
    }

    /// Current invalidation generation. Pass it to [`put_if_current`] after a
    /// disk read started at this point.
    ///
    /// [`put_if_current`]: FileCache::put_if_current
    pub fn generation(&self) -> u64 {
        self.entries().generation
    }

    /// Like [`put`](FileCache::put), but skipped when anything was
    /// invalidated since `generation` was read.
    pub fn put_if_current(&self, file: CachedFile, generation: u64) -> bool {
        let mut entries = self.entries();
        if entries.generation != generation {
            debug!(path = %file.path, "Cache invalidated during load, not caching");
            return false;
        }
        self.store(&mut entries, file)
    }

    fn store(&self, entries: &mut Entries, fresh: CachedFile) -> bool {
        if let Some(existing) = entries.files.get_mut(&fresh.path) {
            let load_count = existing.load_count;
            *existing = CachedFile { load_count, ..fresh };
            return true;
        }
        if entries.files.len() >= self.max_entries {
            debug!(path = %fresh.path, max = self.max_entries, "File cache full, not caching");
            return false;
        }
        entries.files.insert(fresh.path.clone(), fresh);
        true
    }

    /// Drops `key` and anything cached below it (for a removed directory).
    pub fn remove(&self, key: &str) -> bool {
        let prefix = format!("{key}/");
        let mut entries = self.entries();
        entries.invalidate();
        let before = entries.files.len();
        entries.files.retain(|k, _| k != key && !k.starts_with(&prefix));
        before != entries.files.len()
    }

    /// Moves a cached entry to its new name and reloads it from there.
    ///
    /// A rename onto a name that is already cached (the usual
    /// write-temp-then-rename save) reloads that entry as well.
    pub fn rename(&self, from: &str, to: &str) {
        let fresh = read_disk(&self.root.join(to)).ok();
        let prefix = format!("{from}/");

        let mut entries = self.entries();
        entries.invalidate();
        let old = entries.files.remove(from);
        entries.files.retain(|k, _| !k.starts_with(&prefix));

        let load_count = match (old, entries.files.get(to)) {
            (Some(old), _) => old.load_count,
            (None, Some(target)) => target.load_count,
            (None, None) => return,
        };

        match fresh {
            Some((contents, modified)) => {
                let file = CachedFile::new(to, contents, mime::is_binary(to), modified);
                entries.files.insert(to.to_string(), CachedFile { load_count, ..file });
            }
            None => {
                entries.files.remove(to);
            }
        }
    }

    /// Reloads a cached entry from disk. Uncached keys are left alone, but a
    /// load of them already in flight will not be stored.
    pub fn refresh(&self, key: &str) {
        let generation = {
            let mut entries = self.entries();
            let generation = entries.invalidate();
            if !entries.files.contains_key(key) {
                return;
            }
            generation
        };

        match read_disk(&self.root.join(key)) {
            Ok((contents, modified)) => {
                let fresh = CachedFile::new(key, contents, mime::is_binary(key), modified);
                let mut entries = self.entries();
                // A later invalidation owns the entry now.
                if entries.generation != generation {
                    return;
                }
                if let Some(existing) = entries.files.get_mut(key) {
                    let load_count = existing.load_count;
                    *existing = CachedFile { load_count, ..fresh };
                }
            }
            Err(FileError::NotFound) => {
                self.remove(key);
            }
            Err(err) => warn!(path = key, error = %err, "Failed to refresh cached file"),
        }
    }

    pub fn clear(&self) {
        let mut entries = self.entries();
        entries.invalidate();
        entries.files.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().files.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().files.is_empty()
    }

    /// Resolves a URL path to a file under the root, from cache or disk.
    ///
    /// Directories resolve to their index file; a directory without one is
    /// forbidden, as is any path containing `..`.
    pub fn fetch(&self, url_path: &str) -> Result<CachedFile, FileError> {
        let rel = relative_key(url_path)?;
        if let Some(file) = self.get(&rel) {
            return Ok(file);
        }
        let generation = self.generation();

        let meta = fs::metadata(self.root.join(&rel)).map_err(|_| FileError::NotFound)?;
        let key = if meta.is_dir() {
            let index = if rel.is_empty() {
                self.index.clone()
            } else {
                format!("{rel}/{}", self.index)
            };
            if !self.root.join(&index).is_file() {
                return Err(FileError::Forbidden);
            }
            index
        } else {
            rel
        };

        if let Some(file) = self.get(&key) {
            return Ok(file);
        }

        let (contents, modified) = read_disk(&self.root.join(&key))?;
        let file = CachedFile::new(key.as_str(), contents, mime::is_binary(&key), modified);
        self.put_if_current(file.clone(), generation);
        debug!(path = %key, size = file.size, "Loaded file from disk");
        Ok(file)
    }

    /// Maps a filesystem path under the root to its cache key.
    pub fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = rel
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();
        let key = parts?.join("/");
        (!key.is_empty()).then_some(key)
    }
}

/// `/css/../x` is rejected; `/a//b/` becomes `a/b`.
fn relative_key(url_path: &str) -> Result<String, FileError> {
    let mut parts = Vec::new();
    for segment in url_path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(FileError::Forbidden),
            part => parts.push(part),
        }
    }
    Ok(parts.join("/"))
}

fn read_disk(path: &Path) -> Result<(Bytes, SystemTime), FileError> {
    let contents = fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => FileError::NotFound,
        _ => FileError::Io(err),
    })?;
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| SystemTime::now());
    Ok((Bytes::from(contents), modified))
}
