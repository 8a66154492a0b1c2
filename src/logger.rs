//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted output with a module prefix
//! - `debug!` macro gated on the global verbose flag
//! - `WatchStatus` for single-line probe status messages (native only)
//!
//! In the browser the same macros write to the devtools console.
//!
//! # Example
//!
//! ```ignore
//! log!("reload"; "connected to {}", url);
//! debug!("dispatch"; "ignored payload: {:?}", payload);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// Global verbose flag (set by --verbose or `verbose = true` in config)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn log(module: &str, message: &str) {
    use crossterm::{
        execute,
        terminal::{Clear, ClearType},
    };
    use std::io::{Write, stdout};

    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Log a message to the browser console
#[cfg(target_arch = "wasm32")]
#[inline]
pub fn log(module: &str, message: &str) {
    let line = format!("[{module}] {message}");
    if module.eq_ignore_ascii_case("error") {
        web_sys::console::error_1(&line.into());
    } else {
        web_sys::console::log_1(&line.into());
    }
}

/// Apply color to a module prefix based on module type
#[cfg(not(target_arch = "wasm32"))]
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    use owo_colors::OwoColorize;

    let prefix = format!("[{module}]");
    match module_lower {
        "reload" => prefix.bright_blue().bold().to_string(),
        "probe" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status (single-line status with overwrite)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use status::{WatchStatus, status_error, status_success, status_unchanged};

#[cfg(not(target_arch = "wasm32"))]
mod status {
    use std::io::{Write, stdout};
    use std::sync::LazyLock;

    use crossterm::{
        cursor, execute,
        terminal::{Clear, ClearType},
    };
    use owo_colors::OwoColorize;
    use parking_lot::Mutex;

    /// Get current UTC time formatted as HH:MM:SS
    fn now() -> String {
        use std::time::SystemTime;
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let hours = (secs / 3600) % 24;
        let minutes = (secs / 60) % 60;
        let seconds = secs % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }

    /// Single-line status display for probe mode
    ///
    /// Displays status messages that overwrite the previous output,
    /// keeping the terminal clean.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut status = WatchStatus::new();
    /// status.success("refetched script: src/app.js (1 reference)");
    /// status.unchanged("dropped: assets/logo.png");
    /// status.error("connection lost", "retrying in 5000ms");
    /// ```
    pub struct WatchStatus {
        /// Lines of previous output to clear
        pub(super) last_lines: usize,
    }

    static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
        LazyLock::new(|| Mutex::new(WatchStatus::new()));

    impl WatchStatus {
        pub const fn new() -> Self {
            Self { last_lines: 0 }
        }

        /// Display success message (✓ prefix, green).
        pub fn success(&mut self, message: &str) {
            self.display(format!("{}", "✓".green()), message);
        }

        /// Display unchanged message (dimmed, no symbol).
        pub fn unchanged(&mut self, message: &str) {
            self.display(String::new(), &format!("{}", message.dimmed()));
        }

        /// Display error message (✗ prefix, red) with optional detail.
        pub fn error(&mut self, summary: &str, detail: &str) {
            let message = if detail.is_empty() {
                summary.to_string()
            } else {
                format!("{summary}\n{detail}")
            };
            self.display(format!("{}", "✗".red()), &message);
        }

        fn display(&mut self, symbol: String, message: &str) {
            let mut stdout = stdout().lock();

            if self.last_lines > 0 {
                #[allow(clippy::cast_possible_truncation)]
                let lines = self.last_lines as u16;
                execute!(stdout, cursor::MoveUp(lines)).ok();
                execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
            }

            let timestamp = format!("[{}]", now()).dimmed().to_string();
            let line = if symbol.is_empty() {
                format!("{timestamp} {message}")
            } else {
                format!("{timestamp} {symbol} {message}")
            };

            writeln!(stdout, "{line}").ok();
            stdout.flush().ok();

            self.last_lines = line_count(message);
        }
    }

    impl Default for WatchStatus {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Number of terminal lines a status message occupies.
    pub(super) fn line_count(message: &str) -> usize {
        message.matches('\n').count() + 1
    }

    /// Global watch status: success
    pub fn status_success(message: &str) {
        WATCH_STATUS.lock().success(message);
    }

    /// Global watch status: unchanged
    pub fn status_unchanged(message: &str) {
        WATCH_STATUS.lock().unchanged(message);
    }

    /// Global watch status: error
    pub fn status_error(summary: &str, detail: &str) {
        WATCH_STATUS.lock().error(summary, detail);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::status::line_count;
    use super::*;

    #[test]
    fn test_watch_status_new() {
        let status = WatchStatus::new();
        assert_eq!(status.last_lines, 0);
    }

    #[test]
    fn test_line_count_single() {
        assert_eq!(line_count("refetched script: src/app.js"), 1);
    }

    #[test]
    fn test_line_count_error_with_detail() {
        let message = format!("{}\n{}", "connection lost", "retrying in 5000ms");
        assert_eq!(line_count(&message), 2);
    }

    #[test]
    fn test_error_with_detail_occupies_two_lines() {
        let mut status = WatchStatus::new();
        status.error("connection lost", "retrying in 5000ms");
        assert_eq!(status.last_lines, 2);

        status.success("refetched script: src/app.js");
        assert_eq!(status.last_lines, 1);
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
