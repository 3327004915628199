//! Server configuration.
//!
//! Values come from built-in defaults, then an optional YAML file, then a
//! couple of environment overrides. Every section is `#[serde(default)]`, so a
//! file only needs to name the keys it changes:
//!
//! ```yaml
//! server:
//!   listen_addr: "0.0.0.0:8080"
//!   verbose_errors: false
//! static_files:
//!   root: "./www"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var naming the YAML config file.
pub const CONFIG_ENV: &str = "LANTERN_CONFIG";
/// Config file picked up from the working directory when `LANTERN_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "lantern.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub handlers: HandlerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: String,
    /// Per-connection receive timeout. A connection idle this long is closed.
    pub read_timeout_secs: u64,
    /// Upper bound on bytes taken from the socket per read call.
    pub read_buffer_size: usize,
    /// Finished workers are swept every this many accepted connections.
    pub cleanup_interval: usize,
    /// How long shutdown waits for workers before aborting them.
    pub shutdown_timeout_secs: u64,
    /// Embed handler/file error details in 500 pages.
    pub verbose_errors: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    pub index: String,
    pub max_entries: usize,
    pub watch: bool,
    pub recursive: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    pub one_time_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            static_files: StaticFilesConfig::default(),
            handlers: HandlerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_timeout_secs: 5,
            read_buffer_size: 4096,
            cleanup_interval: 64,
            shutdown_timeout_secs: 5,
            verbose_errors: true,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            index: "index.html".to_string(),
            max_entries: 1024,
            watch: true,
            recursive: true,
        }
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            one_time_capacity: 256,
        }
    }
}

impl Config {
    /// Loads the configuration for the running process.
    ///
    /// Reads `$LANTERN_CONFIG` if set, else `./lantern.yaml` if it exists,
    /// else starts from defaults. `LISTEN` and `LANTERN_ROOT` are applied last.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.server.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("LANTERN_ROOT") {
            self.static_files.root = PathBuf::from(root);
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.is_file().then_some(default)
}
