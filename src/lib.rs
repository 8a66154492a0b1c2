//! wasmdev-reload - live reload client for compiled web applications.
//!
//! Keeps a WebSocket open to the development server and applies each
//! `reload <path>` notification with the smallest update that works:
//!
//! - binary or host document changed: full page reload
//! - script or stylesheet changed: re-fetch the matching references
//! - anything else: nothing
//!
//! After a dropped connection the client retries every 5 seconds and reloads
//! the page once the server is back.
//!
//! # Module Structure
//!
//! - `reload` - protocol, routing, dispatcher and connection state machine
//! - `driver` - browser (wasm32) and native runtimes
//! - `config` - `WatchConfig`
//! - `core` - URL matching and cache-busting helpers
//! - `logger` - `log!` / `debug!` macros
//! - `cli` - native `probe` command

pub mod config;
pub mod core;
pub mod driver;
pub mod logger;
pub mod reload;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

pub use config::{ConfigError, WatchConfig};
pub use reload::{
    AssetKind, ConnectionManager, DispatchOutcome, Dispatcher, FullReload, Notification,
    ResourceRef, ResourceRegistry,
};
