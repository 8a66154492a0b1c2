//! `probe` command: run the native watcher against a dev server.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::config::WatchConfig;
use crate::driver::{HtmlRegistry, NativeWatcher};
use crate::logger::{status_error, status_success, status_unchanged};
use crate::reload::{AssetKind, DispatchOutcome};

/// Watch `server` until Ctrl+C, mirroring `page` if given.
pub fn run_probe(config: &WatchConfig, server: &str, page: Option<&Path>) -> Result<()> {
    let registry = match page {
        Some(path) => HtmlRegistry::load(path)?,
        None => HtmlRegistry::empty(),
    };
    crate::log!(
        "probe";
        "{} script and {} stylesheet references",
        registry.urls(AssetKind::Script).len(),
        registry.urls(AssetKind::Style).len()
    );

    let shutdown = shutdown_signal()?;
    let watcher = NativeWatcher::new(server, config, registry.clone(), registry.reloader())
        .on_outcome(report)
        .on_disconnect(report_disconnect);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watcher.run(shutdown));

    crate::log!("probe"; "stopped after {} full reloads", registry.reload_count());
    Ok(())
}

/// Single-line status for each routed notification.
fn report(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Ignored => {}
        outcome if outcome.is_effective() => status_success(&outcome.to_string()),
        outcome => status_unchanged(&outcome.to_string()),
    }
}

fn report_disconnect(delay: Duration) {
    status_error("connection lost", &retry_detail(delay));
}

fn retry_detail(delay: Duration) -> String {
    format!("retrying in {}ms", delay.as_millis())
}

/// Resolves on the first Ctrl+C.
fn shutdown_signal() -> Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    ctrlc::set_handler(move || {
        if let Some(tx) = tx.lock().take() {
            crate::log!("probe"; "shutting down...");
            let _ = tx.send(());
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))?;
    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_detail() {
        assert_eq!(retry_detail(Duration::from_millis(5000)), "retrying in 5000ms");
    }
}
