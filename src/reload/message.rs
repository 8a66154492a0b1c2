//! Reload Notification Protocol
//!
//! One notification is one text message of the form `reload <path>`, where
//! `<path>` is a server-relative path without embedded whitespace.
//!
//! No other message kinds exist; any other payload is inert and parses to
//! `None`.

use std::fmt;

/// Literal prefix of every notification.
pub const RELOAD_PREFIX: &str = "reload ";

/// Kind of a notification. `Reload` is the only kind in this protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A resource changed on the server
    Reload,
}

/// A parsed notification, alive for the duration of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    kind: NotificationKind,
    resource_path: String,
}

impl Notification {
    /// Create a reload notification for `path`.
    pub fn reload(path: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Reload,
            resource_path: path.into(),
        }
    }

    /// Parse one inbound payload.
    ///
    /// Returns `None` for empty payloads, payloads without the `reload `
    /// prefix, and payloads with no path token after the prefix.
    pub fn parse(payload: &str) -> Option<Self> {
        let rest = payload.strip_prefix(RELOAD_PREFIX)?;
        let path = rest.split_whitespace().next()?;
        Some(Self::reload(path))
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Server-relative path of the changed resource.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }
}

/// Wire form, e.g. `reload src/app.js`.
impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NotificationKind::Reload => write!(f, "{RELOAD_PREFIX}{}", self.resource_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reload() {
        let n = Notification::parse("reload dist/index.wasm").unwrap();
        assert_eq!(n.kind(), NotificationKind::Reload);
        assert_eq!(n.resource_path(), "dist/index.wasm");
    }

    #[test]
    fn test_parse_takes_first_token() {
        let n = Notification::parse("reload src/app.js trailing words").unwrap();
        assert_eq!(n.resource_path(), "src/app.js");

        let n = Notification::parse("reload    theme.css\n").unwrap();
        assert_eq!(n.resource_path(), "theme.css");
    }

    #[test]
    fn test_parse_malformed() {
        for payload in [
            "",
            "reload",
            "reload ",
            "reload    ",
            "Reload src/app.js",
            " reload src/app.js",
            "reloadsrc/app.js",
            "patch src/app.js",
            r#"{"type":"reload"}"#,
        ] {
            assert!(
                Notification::parse(payload).is_none(),
                "expected {payload:?} to be ignored"
            );
        }
    }

    #[test]
    fn test_display_is_wire_form() {
        let n = Notification::reload("src/app.js");
        assert_eq!(n.to_string(), "reload src/app.js");
        assert_eq!(Notification::parse(&n.to_string()), Some(n));
    }
}
