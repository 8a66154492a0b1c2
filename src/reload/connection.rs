//! Connection Manager
//!
//! Keeps exactly one notification channel alive for the life of the page.
//! Modeled as a pure state machine so drivers stay thin:
//!
//! ```text
//!            Opened           Closed            ReconnectDue
//! Connecting ------> Open ----------> Closed ----------------> Connecting (new attempt)
//!      |                                ^
//!      +------------- Closed -----------+
//! ```
//!
//! Drivers feed [`ConnectionEvent`]s in and execute the returned
//! [`Command`]s. Every event carries the attempt id it belongs to; events of
//! superseded attempts are discarded, so at most one connection is live.

use std::time::Duration;

/// Lifecycle state of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// One logical channel to the notification server.
///
/// Recreated, never reused, on every reconnect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    attempt: u64,
    is_first_attempt: bool,
    state: ConnectionState,
}

impl Connection {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Distinguishes startup from recovery.
    pub fn is_first_attempt(&self) -> bool {
        self.is_first_attempt
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }
}

/// Transport events reported by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Channel for `attempt` is open
    Opened { attempt: u64 },
    /// Text message received on `attempt`
    Message { attempt: u64, payload: String },
    /// Channel for `attempt` closed or failed to open
    Closed { attempt: u64 },
    /// Reconnect timer fired
    ReconnectDue,
}

/// Work the driver must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a new channel tagged with `attempt`
    Connect { attempt: u64, first: bool },
    /// Hand a raw payload to the dispatcher
    Dispatch(String),
    /// Reload the whole page (server came back)
    FullReload,
    /// Post `ReconnectDue` after the delay
    ScheduleReconnect(Duration),
}

/// Owns the single live [`Connection`] and the reconnect timer state.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    delay: Duration,
    next_attempt: u64,
    connection: Option<Connection>,
    reconnect_pending: bool,
}

impl ConnectionManager {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_attempt: 0,
            connection: None,
            reconnect_pending: false,
        }
    }

    /// Open the first connection. Call once at page load.
    pub fn start(&mut self) -> Command {
        self.reconnect_pending = false;
        self.connect(true)
    }

    /// Advance the state machine by one event.
    pub fn handle(&mut self, event: ConnectionEvent) -> Vec<Command> {
        match event {
            ConnectionEvent::Opened { attempt } => {
                let Some(conn) = self.live_mut(attempt) else {
                    return Vec::new();
                };
                if conn.state != ConnectionState::Connecting {
                    return Vec::new();
                }
                conn.state = ConnectionState::Open;
                crate::debug!("reload"; "connection {} open", attempt);
                if conn.is_first_attempt {
                    Vec::new()
                } else {
                    // server restarted: whatever changed meanwhile was never notified
                    vec![Command::FullReload]
                }
            }

            ConnectionEvent::Message { attempt, payload } => match self.live_mut(attempt) {
                Some(conn) if conn.state == ConnectionState::Open => {
                    vec![Command::Dispatch(payload)]
                }
                _ => Vec::new(),
            },

            ConnectionEvent::Closed { attempt } => {
                let delay = self.delay;
                let Some(conn) = self.live_mut(attempt) else {
                    return Vec::new();
                };
                if conn.state == ConnectionState::Closed {
                    return Vec::new();
                }
                conn.state = ConnectionState::Closed;
                self.reconnect_pending = true;
                crate::debug!("reload"; "connection {} closed, retrying in {}ms", attempt, delay.as_millis());
                vec![Command::ScheduleReconnect(delay)]
            }

            ConnectionEvent::ReconnectDue => {
                if !self.reconnect_pending {
                    return Vec::new();
                }
                self.reconnect_pending = false;
                vec![self.connect(false)]
            }
        }
    }

    /// The live connection, if started.
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn state(&self) -> Option<ConnectionState> {
        self.connection.as_ref().map(Connection::state)
    }

    /// Whether a reconnect timer is outstanding.
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn connect(&mut self, first: bool) -> Command {
        self.next_attempt += 1;
        let attempt = self.next_attempt;
        self.connection = Some(Connection {
            attempt,
            is_first_attempt: first,
            state: ConnectionState::Connecting,
        });
        Command::Connect { attempt, first }
    }

    fn live_mut(&mut self, attempt: u64) -> Option<&mut Connection> {
        self.connection
            .as_mut()
            .filter(|conn| conn.attempt == attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(5000);

    fn started() -> (ConnectionManager, u64) {
        let mut manager = ConnectionManager::new(DELAY);
        let Command::Connect { attempt, first } = manager.start() else {
            panic!("start must connect");
        };
        assert!(first);
        (manager, attempt)
    }

    fn reconnect(manager: &mut ConnectionManager) -> u64 {
        match manager.handle(ConnectionEvent::ReconnectDue).as_slice() {
            [Command::Connect { attempt, first: false }] => *attempt,
            other => panic!("expected reconnect, got {other:?}"),
        }
    }

    #[test]
    fn test_start_connects_first_attempt() {
        let (manager, _) = started();
        let conn = manager.connection().unwrap();
        assert!(conn.is_first_attempt());
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert!(!manager.reconnect_pending());
    }

    #[test]
    fn test_first_open_does_not_reload() {
        let (mut manager, attempt) = started();
        assert!(manager.handle(ConnectionEvent::Opened { attempt }).is_empty());
        assert_eq!(manager.state(), Some(ConnectionState::Open));
    }

    #[test]
    fn test_messages_forwarded_in_order() {
        let (mut manager, attempt) = started();
        manager.handle(ConnectionEvent::Opened { attempt });

        let mut dispatched = Vec::new();
        for payload in ["reload a.js", "reload b.css", "junk"] {
            dispatched.extend(manager.handle(ConnectionEvent::Message {
                attempt,
                payload: payload.into(),
            }));
        }
        assert_eq!(
            dispatched,
            vec![
                Command::Dispatch("reload a.js".into()),
                Command::Dispatch("reload b.css".into()),
                Command::Dispatch("junk".into()),
            ]
        );
    }

    #[test]
    fn test_close_schedules_exactly_one_reconnect() {
        let (mut manager, attempt) = started();
        manager.handle(ConnectionEvent::Opened { attempt });

        assert_eq!(
            manager.handle(ConnectionEvent::Closed { attempt }),
            vec![Command::ScheduleReconnect(DELAY)]
        );
        // duplicate close (error followed by close) schedules nothing more
        assert!(manager.handle(ConnectionEvent::Closed { attempt }).is_empty());
        assert!(manager.reconnect_pending());
        assert_eq!(manager.state(), Some(ConnectionState::Closed));
    }

    #[test]
    fn test_failed_connect_schedules_reconnect() {
        let (mut manager, attempt) = started();
        assert_eq!(
            manager.handle(ConnectionEvent::Closed { attempt }),
            vec![Command::ScheduleReconnect(DELAY)]
        );
    }

    #[test]
    fn test_recovery_open_reloads_before_messages() {
        let (mut manager, attempt) = started();
        manager.handle(ConnectionEvent::Opened { attempt });
        manager.handle(ConnectionEvent::Closed { attempt });

        let second = reconnect(&mut manager);
        assert_ne!(second, attempt);
        assert!(!manager.connection().unwrap().is_first_attempt());

        assert_eq!(
            manager.handle(ConnectionEvent::Opened { attempt: second }),
            vec![Command::FullReload]
        );
        assert_eq!(
            manager.handle(ConnectionEvent::Message {
                attempt: second,
                payload: "reload a.js".into()
            }),
            vec![Command::Dispatch("reload a.js".into())]
        );
    }

    #[test]
    fn test_first_attempt_failure_then_success_reloads() {
        let (mut manager, attempt) = started();
        manager.handle(ConnectionEvent::Closed { attempt });
        let second = reconnect(&mut manager);
        assert_eq!(
            manager.handle(ConnectionEvent::Opened { attempt: second }),
            vec![Command::FullReload]
        );
    }

    #[test]
    fn test_repeated_closes_each_schedule_one_attempt() {
        let (mut manager, mut attempt) = started();
        for _ in 0..5 {
            assert_eq!(
                manager.handle(ConnectionEvent::Closed { attempt }),
                vec![Command::ScheduleReconnect(DELAY)]
            );
            attempt = reconnect(&mut manager);
            // stray timer with nothing pending is a no-op
            assert!(manager.handle(ConnectionEvent::ReconnectDue).is_empty());
        }
        assert_eq!(attempt, 6);
    }

    #[test]
    fn test_stale_events_discarded() {
        let (mut manager, first) = started();
        manager.handle(ConnectionEvent::Closed { attempt: first });
        let second = reconnect(&mut manager);

        assert!(manager.handle(ConnectionEvent::Opened { attempt: first }).is_empty());
        assert!(
            manager
                .handle(ConnectionEvent::Message {
                    attempt: first,
                    payload: "reload index.wasm".into()
                })
                .is_empty()
        );
        assert!(manager.handle(ConnectionEvent::Closed { attempt: first }).is_empty());
        assert!(!manager.reconnect_pending());
        assert_eq!(manager.connection().unwrap().attempt(), second);
    }

    #[test]
    fn test_message_before_open_dropped() {
        let (mut manager, attempt) = started();
        assert!(
            manager
                .handle(ConnectionEvent::Message {
                    attempt,
                    payload: "reload a.js".into()
                })
                .is_empty()
        );
    }

    #[test]
    fn test_independent_instances() {
        let (mut a, attempt_a) = started();
        let (b, _) = started();
        a.handle(ConnectionEvent::Closed { attempt: attempt_a });
        assert!(a.reconnect_pending());
        assert!(!b.reconnect_pending());
    }
}
