//! Watcher configuration.
//!
//! The browser client normally runs with [`WatchConfig::default`]; hosts can
//! pass a JSON object to `start_with_config`, and the native probe reads an
//! optional `reload.toml`.
//!
//! # Example
//!
//! ```toml
//! reconnect_delay_ms = 5000       # Fixed delay between reconnect attempts
//! binary_artifact = "index.wasm"  # Changes to this path force a full reload
//! document = "index.html"         # So do changes to the host document
//! script_suffixes = [".js"]       # Re-fetched <script src> references
//! style_suffixes = [".css"]       # Re-fetched <link rel="stylesheet"> references
//! cache_bust_param = "t"          # Query parameter used to defeat the cache
//! endpoint_path = "/"             # WebSocket path on the page's host
//! verbose = false                 # Log ignored and dropped notifications
//! ```

mod error;

pub use error::ConfigError;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delay between a close and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5000;

/// Live reload client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Delay before reconnecting after the channel closes.
    pub reconnect_delay_ms: u64,

    /// Substring identifying the main compiled binary.
    pub binary_artifact: String,

    /// Substring identifying the host document.
    pub document: String,

    /// Path suffixes treated as script assets.
    pub script_suffixes: Vec<String>,

    /// Path suffixes treated as stylesheet assets.
    pub style_suffixes: Vec<String>,

    /// Query parameter carrying the cache-busting stamp.
    pub cache_bust_param: String,

    /// Path of the notification endpoint on the page's host.
    pub endpoint_path: String,

    /// Log ignored notifications and routing decisions.
    pub verbose: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            binary_artifact: "index.wasm".to_string(),
            document: "index.html".to_string(),
            script_suffixes: vec![".js".to_string()],
            style_suffixes: vec![".css".to_string()],
            cache_bust_param: "t".to_string(),
            endpoint_path: "/".to_string(),
            verbose: false,
        }
    }
}

impl WatchConfig {
    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Load and validate a TOML config file.
    ///
    /// Returns the config together with any unknown field paths so the caller
    /// can warn about them.
    pub fn load(path: &Path) -> Result<(Self, Vec<String>), ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;
        config.validate()?;
        Ok((config, ignored))
    }

    /// Parse and validate a JSON config (browser entry point).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Reject settings the dispatcher cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "reconnect_delay_ms must be greater than 0".into(),
            ));
        }
        if self.binary_artifact.trim().is_empty() || self.document.trim().is_empty() {
            return Err(ConfigError::Validation(
                "binary_artifact and document must not be empty".into(),
            ));
        }
        for suffix in self.script_suffixes.iter().chain(&self.style_suffixes) {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "asset suffix `{suffix}` must start with '.'"
                )));
            }
        }
        if self.cache_bust_param.is_empty()
            || self
                .cache_bust_param
                .contains(['=', '&', '?', '#', ' '])
        {
            return Err(ConfigError::Validation(format!(
                "cache_bust_param `{}` is not a valid query key",
                self.cache_bust_param
            )));
        }
        if !self.endpoint_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "endpoint_path `{}` must start with '/'",
                self.endpoint_path
            )));
        }
        Ok(())
    }
}

/// Parse a TOML snippet for tests, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> WatchConfig {
    let (parsed, ignored) = WatchConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
