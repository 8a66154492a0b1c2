//! Cache-busting stamps for targeted re-fetch.
//!
//! A reference is re-fetched by rewriting its URL with `?<param>=<stamp>`.
//! Stamps are millisecond timestamps forced to increase strictly, so two
//! re-fetches within the same millisecond still produce distinct URLs.

use crate::core::{now_millis, with_cache_bust};

/// Produces fresh cache-busting URLs.
#[derive(Debug, Clone)]
pub struct CacheBuster {
    param: String,
    last: u64,
    clock: fn() -> u64,
}

impl CacheBuster {
    /// Create a buster stamping URLs with `param`, using the wall clock.
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            last: 0,
            clock: now_millis,
        }
    }

    /// Replace the clock (tests use a fixed one).
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Next stamp: current time, or one past the previous stamp.
    pub fn next_stamp(&mut self) -> u64 {
        let stamp = (self.clock)().max(self.last.saturating_add(1));
        self.last = stamp;
        stamp
    }

    /// Return `url` rewritten with a fresh stamp.
    pub fn bust(&mut self, url: &str) -> String {
        let stamp = self.next_stamp();
        with_cache_bust(url, &self.param, stamp)
    }
}
