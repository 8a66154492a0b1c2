//! Notification Routing
//!
//! Pure function mapping a changed resource path to an update strategy.
//! No side effects; the dispatcher applies the result.

use std::fmt;

use crate::config::WatchConfig;

/// Kind of document-embedded asset that can be re-fetched in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `<script src="...">`
    Script,
    /// `<link rel="stylesheet" href="...">`
    Style,
}

impl AssetKind {
    /// CSS selector for references of this kind.
    pub fn selector(self) -> &'static str {
        match self {
            Self::Script => "script[src]",
            // token match, so `rel="preload stylesheet"` counts too
            Self::Style => r#"link[rel~="stylesheet"]"#,
        }
    }

    /// Display name for this asset kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "stylesheet",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Update strategy for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Binary or host document changed: the whole page is stale
    FullReload,
    /// Re-fetch matching references of this kind
    Refetch(AssetKind),
    /// No defined behavior
    Drop,
}

/// Route a resource path, first match wins:
///
/// 1. contains the binary artifact or document name -> `FullReload`
/// 2. ends with a script suffix -> `Refetch(Script)`
/// 3. ends with a style suffix -> `Refetch(Style)`
/// 4. anything else -> `Drop`
pub fn classify(resource_path: &str, config: &WatchConfig) -> Route {
    if resource_path.contains(config.binary_artifact.as_str())
        || resource_path.contains(config.document.as_str())
    {
        return Route::FullReload;
    }

    let has_suffix = |suffixes: &[String]| suffixes.iter().any(|s| resource_path.ends_with(s.as_str()));

    if has_suffix(&config.script_suffixes) {
        Route::Refetch(AssetKind::Script)
    } else if has_suffix(&config.style_suffixes) {
        Route::Refetch(AssetKind::Style)
    } else {
        Route::Drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> Route {
        classify(path, &WatchConfig::default())
    }

    #[test]
    fn test_binary_and_document_force_reload() {
        assert_eq!(route("dist/index.wasm"), Route::FullReload);
        assert_eq!(route("index.html"), Route::FullReload);
        assert_eq!(route("pkg/index.wasm.map"), Route::FullReload);
    }

    #[test]
    fn test_reload_wins_over_suffix() {
        // contains the binary name but also ends in .js
        assert_eq!(route("index.wasm.js"), Route::FullReload);
        assert_eq!(route("index.html.css"), Route::FullReload);
    }

    #[test]
    fn test_scripts_and_styles() {
        assert_eq!(route("src/app.js"), Route::Refetch(AssetKind::Script));
        assert_eq!(route("theme.css"), Route::Refetch(AssetKind::Style));
        assert_eq!(route("app/styles/main.css"), Route::Refetch(AssetKind::Style));
    }

    #[test]
    fn test_unknown_dropped() {
        assert_eq!(route("assets/logo.png"), Route::Drop);
        assert_eq!(route("src/app.jsx"), Route::Drop);
        assert_eq!(route("README"), Route::Drop);
    }

    #[test]
    fn test_custom_suffixes() {
        let config = WatchConfig {
            script_suffixes: vec![".js".into(), ".mjs".into()],
            style_suffixes: vec![".css".into()],
            ..Default::default()
        };
        assert_eq!(
            classify("lib/worker.mjs", &config),
            Route::Refetch(AssetKind::Script)
        );
    }

    #[test]
    fn test_selectors() {
        assert_eq!(AssetKind::Script.selector(), "script[src]");
        assert_eq!(AssetKind::Style.selector(), r#"link[rel~="stylesheet"]"#);
        assert_eq!(AssetKind::Style.to_string(), "stylesheet");
    }
}
