//! Notification Dispatcher
//!
//! Translates one textual notification into a document mutation:
//!
//! ```text
//! payload --parse--> Notification --classify--> Route --apply--> reload | rewrite | nothing
//! ```
//!
//! Every failure is a silent no-op. A malformed or unmatched notification has
//! the same observable effect as no notification at all.

use std::fmt;

use crate::config::WatchConfig;
use crate::core::matches_resource;

use super::classify::{AssetKind, Route, classify};
use super::message::Notification;
use super::registry::{FullReload, ResourceRegistry};
use super::version::CacheBuster;

/// What a dispatch did. Used for logging only; not an error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Payload was not a notification
    Ignored,
    /// Full page reload triggered
    FullReload { path: String },
    /// `matched` references of `kind` were rewritten (may be zero)
    Refetched {
        kind: AssetKind,
        path: String,
        matched: usize,
    },
    /// Notification had no defined behavior
    Dropped { path: String },
}

impl DispatchOutcome {
    /// Whether the document was touched.
    pub fn is_effective(&self) -> bool {
        match self {
            Self::FullReload { .. } => true,
            Self::Refetched { matched, .. } => *matched > 0,
            Self::Ignored | Self::Dropped { .. } => false,
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => f.write_str("ignored"),
            Self::FullReload { path } => write!(f, "full reload: {path}"),
            Self::Refetched {
                kind,
                path,
                matched: 0,
            } => write!(f, "no {kind} reference for {path}"),
            Self::Refetched {
                kind,
                path,
                matched: 1,
            } => write!(f, "refetched {kind}: {path}"),
            Self::Refetched {
                kind,
                path,
                matched,
            } => write!(f, "refetched {kind}: {path} ({matched} references)"),
            Self::Dropped { path } => write!(f, "dropped: {path}"),
        }
    }
}

/// Applies notifications through a registry and a reload capability.
pub struct Dispatcher<R, F> {
    config: WatchConfig,
    registry: R,
    reloader: F,
    buster: CacheBuster,
}

impl<R: ResourceRegistry, F: FullReload> Dispatcher<R, F> {
    pub fn new(config: &WatchConfig, registry: R, reloader: F) -> Self {
        Self {
            config: config.clone(),
            registry,
            reloader,
            buster: CacheBuster::new(config.cache_bust_param.clone()),
        }
    }

    /// Replace the cache-busting clock.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.buster = self.buster.with_clock(clock);
        self
    }

    /// Handle one inbound payload.
    pub fn dispatch(&mut self, payload: &str) -> DispatchOutcome {
        let Some(notification) = Notification::parse(payload) else {
            return DispatchOutcome::Ignored;
        };
        let path = notification.resource_path();

        match classify(path, &self.config) {
            Route::FullReload => {
                self.full_reload();
                DispatchOutcome::FullReload {
                    path: path.to_string(),
                }
            }
            Route::Refetch(kind) => DispatchOutcome::Refetched {
                kind,
                path: path.to_string(),
                matched: self.refetch(kind, path),
            },
            Route::Drop => DispatchOutcome::Dropped {
                path: path.to_string(),
            },
        }
    }

    /// Trigger a full page reload.
    pub fn full_reload(&mut self) {
        self.reloader.trigger_full_reload();
    }

    /// Rewrite every reference of `kind` pointing at `path`.
    fn refetch(&mut self, kind: AssetKind, path: &str) -> usize {
        let matching: Vec<_> = self
            .registry
            .references(kind)
            .into_iter()
            .filter(|reference| matches_resource(&reference.url, path))
            .collect();

        for reference in &matching {
            let url = self.buster.bust(&reference.url);
            self.registry.rewrite(&reference.handle, &url);
        }
        matching.len()
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn reloader(&self) -> &F {
        &self.reloader
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }
}
