//! Runtime drivers executing connection commands against a real transport.
//!
//! - `web` - browser WebSocket, DOM registry, `location.reload()` (wasm32)
//! - `native` - tokio loop over a tungstenite client
//! - `html` - HTML page snapshot registry for the native driver

#[cfg(not(target_arch = "wasm32"))]
pub mod html;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use html::{HtmlRegistry, HtmlReload};
#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeWatcher;
#[cfg(target_arch = "wasm32")]
pub use web::{DomRegistry, LocationReload, start, start_with_config};
