//! Native driver - tokio event loop over a blocking tungstenite client.
//!
//! ```text
//! io thread (per attempt) --ConnectionEvent--> NativeWatcher::run --Dispatch--> Dispatcher
//!        ^                                          |
//!        +-------------- Connect -------------------+--ScheduleReconnect--> timer task
//! ```
//!
//! The loop task is the only owner of the manager and the dispatcher; socket
//! reads happen on a dedicated thread per connection attempt.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;

use crate::config::WatchConfig;
use crate::reload::{
    Command, ConnectionEvent, ConnectionManager, DispatchOutcome, Dispatcher, FullReload,
    ResourceRegistry,
};

/// Channel capacity between io threads and the loop.
const EVENT_BUFFER: usize = 64;

/// Read timeout of io threads, bounding how long they outlive the watcher.
const READ_POLL: Duration = Duration::from_millis(250);

type OutcomeObserver = Box<dyn FnMut(&DispatchOutcome) + Send>;
type DisconnectObserver = Box<dyn FnMut(Duration) + Send>;

/// Live reload watcher for native hosts.
pub struct NativeWatcher<R, F> {
    endpoint: String,
    manager: ConnectionManager,
    dispatcher: Dispatcher<R, F>,
    observer: Option<OutcomeObserver>,
    on_disconnect: Option<DisconnectObserver>,
    tx: mpsc::Sender<ConnectionEvent>,
    rx: mpsc::Receiver<ConnectionEvent>,
}

impl<R: ResourceRegistry, F: FullReload> NativeWatcher<R, F> {
    /// Create a watcher for `endpoint` (a `ws://` URL).
    pub fn new(endpoint: impl Into<String>, config: &WatchConfig, registry: R, reloader: F) -> Self {
        Self::with_dispatcher(endpoint, config, Dispatcher::new(config, registry, reloader))
    }

    pub fn with_dispatcher(
        endpoint: impl Into<String>,
        config: &WatchConfig,
        dispatcher: Dispatcher<R, F>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            endpoint: endpoint.into(),
            manager: ConnectionManager::new(config.reconnect_delay()),
            dispatcher,
            observer: None,
            on_disconnect: None,
            tx,
            rx,
        }
    }

    /// Call `observer` after every dispatch.
    pub fn on_outcome(mut self, observer: impl FnMut(&DispatchOutcome) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Call `observer` with the retry delay whenever the connection is lost.
    pub fn on_disconnect(mut self, observer: impl FnMut(Duration) + Send + 'static) -> Self {
        self.on_disconnect = Some(Box::new(observer));
        self
    }

    /// Run until `shutdown` resolves (or its sender is dropped).
    ///
    /// Returns the dispatcher so callers can inspect the registry.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> Dispatcher<R, F> {
        crate::log!("reload"; "watching {}", self.endpoint);

        let mut pending = VecDeque::from([self.manager.start()]);
        loop {
            while let Some(command) = pending.pop_front() {
                self.execute(command);
            }

            tokio::select! {
                _ = &mut shutdown => {
                    crate::debug!("reload"; "shutting down");
                    break;
                }
                event = self.rx.recv() => match event {
                    Some(event) => pending.extend(self.manager.handle(event)),
                    None => break,
                },
            }
        }

        self.dispatcher
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Connect { attempt, first } => {
                crate::debug!("reload"; "connecting to {} (attempt {}, first: {})", self.endpoint, attempt, first);
                let endpoint = self.endpoint.clone();
                let tx = self.tx.clone();
                std::thread::spawn(move || connection_loop(&endpoint, attempt, &tx));
            }

            Command::Dispatch(payload) => {
                let outcome = self.dispatcher.dispatch(&payload);
                match &outcome {
                    DispatchOutcome::Ignored => {
                        crate::debug!("reload"; "ignored payload: {:?}", payload);
                    }
                    outcome if outcome.is_effective() => crate::log!("reload"; "{}", outcome),
                    outcome => crate::debug!("reload"; "{}", outcome),
                }
                if let Some(observer) = self.observer.as_mut() {
                    observer(&outcome);
                }
            }

            Command::FullReload => {
                crate::log!("reload"; "server is back, reloading page");
                self.dispatcher.full_reload();
            }

            Command::ScheduleReconnect(delay) => {
                match self.on_disconnect.as_mut() {
                    Some(observer) => observer(delay),
                    None => {
                        crate::log!("reload"; "connection lost, retrying in {}ms", delay.as_millis())
                    }
                }
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(ConnectionEvent::ReconnectDue).await;
                });
            }
        }
    }
}

/// Blocking io for one connection attempt.
///
/// Always ends by reporting `Closed`, whether the handshake failed, the
/// server closed the channel or the connection dropped. Exits silently once
/// the watcher is gone.
fn connection_loop(endpoint: &str, attempt: u64, tx: &mpsc::Sender<ConnectionEvent>) {
    let mut ws = match tungstenite::connect(endpoint) {
        Ok((ws, _)) => ws,
        Err(e) => {
            crate::debug!("reload"; "connect failed: {}", e);
            let _ = tx.blocking_send(ConnectionEvent::Closed { attempt });
            return;
        }
    };

    if let MaybeTlsStream::Plain(stream) = ws.get_ref()
        && let Err(e) = stream.set_read_timeout(Some(READ_POLL))
    {
        crate::debug!("reload"; "cannot set read timeout: {}", e);
    }

    if tx.blocking_send(ConnectionEvent::Opened { attempt }).is_err() {
        let _ = ws.close(None);
        return;
    }

    loop {
        match ws.read() {
            Ok(Message::Text(text)) => {
                let event = ConnectionEvent::Message {
                    attempt,
                    payload: text.as_str().to_owned(),
                };
                if tx.blocking_send(event).is_err() {
                    // watcher gone
                    let _ = ws.close(None);
                    return;
                }
            }
            // the reply is queued by tungstenite; send it and end the attempt
            Ok(Message::Close(_)) => {
                let _ = ws.flush();
                break;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                if tx.is_closed() {
                    let _ = ws.close(None);
                    let _ = ws.flush();
                    return;
                }
            }
            Err(e) => {
                crate::debug!("reload"; "connection {} ended: {}", attempt, e);
                break;
            }
        }
    }

    let _ = tx.blocking_send(ConnectionEvent::Closed { attempt });
}
