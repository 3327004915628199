use std::sync::Arc;

use crate::config::Config;
use crate::files::FileCache;
use crate::server::registry::HandlerRegistry;

/// State shared by every connection: configuration, handler tables and the
/// static file cache.
pub struct ServerContext {
    pub config: Config,
    pub handlers: HandlerRegistry,
    pub files: Arc<FileCache>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        let statics = &config.static_files;
        let files = Arc::new(FileCache::new(
            statics.root.clone(),
            statics.index.clone(),
            statics.max_entries,
        ));
        let handlers = HandlerRegistry::new(config.handlers.one_time_capacity);

        Self {
            config,
            handlers,
            files,
        }
    }
}
