//! Browser driver (web_sys).
//!
//! Installed by the host page after the application's init entry point ran:
//!
//! ```javascript
//! import init, { start } from '/index.js';
//! await init('/index.wasm');
//! start();
//! ```
//!
//! Socket callbacks only forward [`ConnectionEvent`]s into a channel; a
//! single `spawn_local` task owns the manager and the dispatcher, so every
//! event runs to completion before the next one is processed.

use std::collections::VecDeque;

use futures_channel::mpsc::{UnboundedSender, unbounded};
use futures_util::StreamExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CloseEvent, Document, Element, HtmlLinkElement, HtmlScriptElement, Location, MessageEvent,
    WebSocket,
};

use crate::config::WatchConfig;
use crate::reload::{
    AssetKind, Command, ConnectionEvent, ConnectionManager, DispatchOutcome, Dispatcher,
    FullReload, ResourceRef, ResourceRegistry, endpoint_url,
};

// =============================================================================
// Entry points
// =============================================================================

/// Start watching with the default configuration.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    start_with(WatchConfig::default())
}

/// Start watching with a JSON configuration object (see `WatchConfig`).
#[wasm_bindgen(js_name = startWithConfig)]
pub fn start_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = WatchConfig::from_json(config_json).map_err(to_js)?;
    start_with(config)
}

fn start_with(config: WatchConfig) -> Result<(), JsValue> {
    crate::logger::set_verbose(config.verbose);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let location = window.location();

    let endpoint = endpoint_url(&location.protocol()?, &location.host()?, &config.endpoint_path)
        .map_err(to_js)?;

    let dispatcher = Dispatcher::new(&config, DomRegistry::new(document), LocationReload::new(location));
    let watcher = WebWatcher {
        endpoint,
        manager: ConnectionManager::new(config.reconnect_delay()),
        dispatcher,
        socket: None,
    };
    wasm_bindgen_futures::spawn_local(watcher.run());
    Ok(())
}

fn to_js(err: impl std::error::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// =============================================================================
// Event loop
// =============================================================================

struct WebWatcher {
    endpoint: String,
    manager: ConnectionManager,
    dispatcher: Dispatcher<DomRegistry, LocationReload>,
    /// The live socket; replaced on every attempt
    socket: Option<Socket>,
}

impl WebWatcher {
    async fn run(mut self) {
        let (tx, mut rx) = unbounded::<ConnectionEvent>();

        let mut pending = VecDeque::from([self.manager.start()]);
        loop {
            while let Some(command) = pending.pop_front() {
                self.execute(command, &tx);
            }
            let Some(event) = rx.next().await else {
                break;
            };
            pending.extend(self.manager.handle(event));
        }
    }

    fn execute(&mut self, command: Command, tx: &UnboundedSender<ConnectionEvent>) {
        match command {
            Command::Connect { attempt, .. } => {
                // drop the previous socket and its callbacks first
                self.socket = None;
                match Socket::open(&self.endpoint, attempt, tx.clone()) {
                    Ok(socket) => self.socket = Some(socket),
                    Err(e) => {
                        crate::debug!("reload"; "cannot open socket: {:?}", e);
                        let _ = tx.unbounded_send(ConnectionEvent::Closed { attempt });
                    }
                }
            }

            Command::Dispatch(payload) => match self.dispatcher.dispatch(&payload) {
                DispatchOutcome::Ignored => {
                    crate::debug!("reload"; "ignored payload: {:?}", payload);
                }
                outcome => crate::debug!("reload"; "{}", outcome),
            },

            Command::FullReload => {
                crate::log!("reload"; "server is back, reloading page");
                self.dispatcher.full_reload();
            }

            Command::ScheduleReconnect(delay) => {
                crate::debug!("reload"; "retrying in {}ms", delay.as_millis());
                let tx = tx.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    gloo_timers::future::sleep(delay).await;
                    let _ = tx.unbounded_send(ConnectionEvent::ReconnectDue);
                });
            }
        }
    }
}

// =============================================================================
// Socket
// =============================================================================

/// A browser WebSocket whose callbacks post events for one attempt.
struct Socket {
    ws: WebSocket,
    _onopen: Closure<dyn FnMut()>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

impl Socket {
    fn open(
        endpoint: &str,
        attempt: u64,
        tx: UnboundedSender<ConnectionEvent>,
    ) -> Result<Self, JsValue> {
        let ws = WebSocket::new(endpoint)?;

        let tx_open = tx.clone();
        let onopen = Closure::wrap(Box::new(move || {
            let _ = tx_open.unbounded_send(ConnectionEvent::Opened { attempt });
        }) as Box<dyn FnMut()>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let tx_msg = tx.clone();
        let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
            // binary frames are not part of the protocol
            if let Some(payload) = e.data().as_string() {
                let _ = tx_msg.unbounded_send(ConnectionEvent::Message { attempt, payload });
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        // onerror is always followed by onclose
        let onclose = Closure::wrap(Box::new(move |_: CloseEvent| {
            let _ = tx.unbounded_send(ConnectionEvent::Closed { attempt });
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            _onopen: onopen,
            _onmessage: onmessage,
            _onclose: onclose,
        })
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}

// =============================================================================
// Document capabilities
// =============================================================================

/// Script and stylesheet references of the live document.
pub struct DomRegistry {
    document: Document,
}

impl DomRegistry {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn url_of(kind: AssetKind, element: &Element) -> Option<String> {
        let url = match kind {
            AssetKind::Script => element.dyn_ref::<HtmlScriptElement>()?.src(),
            AssetKind::Style => element.dyn_ref::<HtmlLinkElement>()?.href(),
        };
        (!url.is_empty()).then_some(url)
    }
}

impl ResourceRegistry for DomRegistry {
    type Handle = Element;

    fn references(&self, kind: AssetKind) -> Vec<ResourceRef<Element>> {
        let Ok(nodes) = self.document.query_selector_all(kind.selector()) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|element| {
                let url = Self::url_of(kind, &element)?;
                Some(ResourceRef::new(element, url))
            })
            .collect()
    }

    fn rewrite(&mut self, element: &Element, url: &str) {
        if let Some(script) = element.dyn_ref::<HtmlScriptElement>() {
            script.set_src(url);
        } else if let Some(link) = element.dyn_ref::<HtmlLinkElement>() {
            link.set_href(url);
        }
    }
}

/// Full reload through `location.reload()`.
pub struct LocationReload {
    location: Location,
}

impl LocationReload {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

impl FullReload for LocationReload {
    fn trigger_full_reload(&mut self) {
        if let Err(e) = self.location.reload() {
            crate::log!("error"; "reload failed: {:?}", e);
        }
    }
}
