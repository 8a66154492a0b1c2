//! Reload Module
//!
//! Reload-notification protocol and update dispatch.
//!
//! # Architecture
//!
//! ```text
//! driver --ConnectionEvent--> ConnectionManager --Command--> driver
//!                                                  |
//!                                           Dispatch(payload)
//!                                                  v
//!                                             Dispatcher --> ResourceRegistry / FullReload
//! ```
//!
//! # Modules
//!
//! - `message` - `reload <path>` wire format
//! - `classify` - Route a changed path to an update strategy
//! - `version` - Cache-busting stamps
//! - `registry` - Capabilities the dispatcher acts through
//! - `dispatch` - Notification dispatcher
//! - `connection` - Connection lifecycle state machine
//! - `endpoint` - WebSocket URL for the page's host

pub mod classify;
pub mod connection;
pub mod dispatch;
pub mod endpoint;
pub mod message;
pub mod registry;
pub mod version;

pub use classify::{AssetKind, Route, classify};
pub use connection::{Command, Connection, ConnectionEvent, ConnectionManager, ConnectionState};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use endpoint::{EndpointError, endpoint_url};
pub use message::{Notification, NotificationKind};
pub use registry::{FullReload, ResourceRef, ResourceRegistry};
pub use version::CacheBuster;
