//! HTML page snapshot acting as a resource registry.
//!
//! Mirrors the `<script src>` and `<link rel="stylesheet">` references of an
//! HTML file so the native driver can show what a browser would re-fetch.
//! A full reload re-reads the file from disk, dropping earlier rewrites.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::reload::{AssetKind, FullReload, ResourceRef, ResourceRegistry};

#[derive(Debug, Default)]
struct PageState {
    path: Option<PathBuf>,
    scripts: Vec<String>,
    styles: Vec<String>,
    reloads: usize,
}

impl PageState {
    fn list(&self, kind: AssetKind) -> &Vec<String> {
        match kind {
            AssetKind::Script => &self.scripts,
            AssetKind::Style => &self.styles,
        }
    }

    fn list_mut(&mut self, kind: AssetKind) -> &mut Vec<String> {
        match kind {
            AssetKind::Script => &mut self.scripts,
            AssetKind::Style => &mut self.styles,
        }
    }
}

/// In-memory registry built from HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlRegistry {
    page: Arc<Mutex<PageState>>,
}

impl HtmlRegistry {
    /// Registry with no references.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan an HTML string.
    pub fn from_html(html: &str) -> Self {
        let (scripts, styles) = scan(html);
        Self {
            page: Arc::new(Mutex::new(PageState {
                scripts,
                styles,
                ..Default::default()
            })),
        }
    }

    /// Scan an HTML file; full reloads re-read it.
    pub fn load(path: &Path) -> Result<Self> {
        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read page `{}`", path.display()))?;
        let registry = Self::from_html(&html);
        registry.page.lock().path = Some(path.to_path_buf());
        Ok(registry)
    }

    /// Reload capability sharing this registry's page.
    pub fn reloader(&self) -> HtmlReload {
        HtmlReload {
            page: Arc::clone(&self.page),
        }
    }

    /// Current URLs of `kind`, in document order.
    pub fn urls(&self, kind: AssetKind) -> Vec<String> {
        self.page.lock().list(kind).clone()
    }

    /// Number of full reloads performed.
    pub fn reload_count(&self) -> usize {
        self.page.lock().reloads
    }
}

impl ResourceRegistry for HtmlRegistry {
    type Handle = (AssetKind, usize);

    fn references(&self, kind: AssetKind) -> Vec<ResourceRef<Self::Handle>> {
        self.page
            .lock()
            .list(kind)
            .iter()
            .enumerate()
            .map(|(i, url)| ResourceRef::new((kind, i), url.clone()))
            .collect()
    }

    fn rewrite(&mut self, handle: &Self::Handle, url: &str) {
        let (kind, index) = *handle;
        if let Some(slot) = self.page.lock().list_mut(kind).get_mut(index) {
            *slot = url.to_string();
        }
    }
}

/// Full reload for an [`HtmlRegistry`]: re-scan the page file.
#[derive(Debug, Clone)]
pub struct HtmlReload {
    page: Arc<Mutex<PageState>>,
}

impl FullReload for HtmlReload {
    fn trigger_full_reload(&mut self) {
        let mut page = self.page.lock();
        page.reloads += 1;

        let Some(path) = page.path.clone() else {
            return;
        };
        match fs::read_to_string(&path) {
            Ok(html) => {
                let (scripts, styles) = scan(&html);
                page.scripts = scripts;
                page.styles = styles;
                crate::debug!("reload"; "re-read {}", path.display());
            }
            // keep the previous snapshot, like a failed navigation would
            Err(e) => crate::log!("error"; "failed to re-read {}: {}", path.display(), e),
        }
    }
}

/// Collect `(script srcs, stylesheet hrefs)` in document order.
fn scan(html: &str) -> (Vec<String>, Vec<String>) {
    let mut scripts = Vec::new();
    let mut styles = Vec::new();

    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return (scripts, styles);
    };

    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else {
            continue;
        };
        let name = tag.name().as_utf8_str().to_ascii_lowercase();
        let attrs = tag.attributes();
        let attr = |key: &'static str| {
            attrs
                .get(key)
                .flatten()
                .map(|v| v.as_utf8_str().trim().to_string())
                .filter(|v| !v.is_empty())
        };

        match name.as_str() {
            "script" => scripts.extend(attr("src")),
            "link" => {
                let is_stylesheet = attr("rel").is_some_and(|rel| {
                    rel.split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("stylesheet"))
                });
                if is_stylesheet {
                    styles.extend(attr("href"));
                }
            }
            _ => {}
        }
    }

    (scripts, styles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchConfig;
    use crate::reload::Dispatcher;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="/static/theme.css?v=1">
  <link rel="icon" href="/favicon.ico">
  <link rel="preload stylesheet" href="app/styles/main.css">
  <script type="module" src="/static/src/app.js?t=123"></script>
</head>
<body>
  <script>console.log("inline")</script>
  <script src="/other.js"></script>
</body>
</html>"#;

    #[test]
    fn test_scan_references() {
        let registry = HtmlRegistry::from_html(PAGE);
        assert_eq!(
            registry.urls(AssetKind::Script),
            vec!["/static/src/app.js?t=123", "/other.js"]
        );
        assert_eq!(
            registry.urls(AssetKind::Style),
            vec!["/static/theme.css?v=1", "app/styles/main.css"]
        );
    }

    #[test]
    fn test_dispatch_against_page() {
        let registry = HtmlRegistry::from_html(PAGE);
        let mut dispatcher =
            Dispatcher::new(&WatchConfig::default(), registry.clone(), registry.reloader())
                .with_clock(|| 42);

        dispatcher.dispatch("reload src/app.js");
        dispatcher.dispatch("reload app/styles/main.css");

        assert_eq!(
            registry.urls(AssetKind::Script),
            vec!["/static/src/app.js?t=42", "/other.js"]
        );
        assert_eq!(
            registry.urls(AssetKind::Style),
            vec!["/static/theme.css?v=1", "app/styles/main.css?t=43"]
        );
    }

    #[test]
    fn test_reload_rereads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, PAGE).unwrap();

        let registry = HtmlRegistry::load(&path).unwrap();
        let mut dispatcher =
            Dispatcher::new(&WatchConfig::default(), registry.clone(), registry.reloader());

        dispatcher.dispatch("reload src/app.js");
        assert_ne!(registry.urls(AssetKind::Script)[0], "/static/src/app.js?t=123");

        fs::write(&path, r#"<script src="/new.js"></script>"#).unwrap();
        dispatcher.dispatch("reload index.html");

        assert_eq!(registry.reload_count(), 1);
        assert_eq!(registry.urls(AssetKind::Script), vec!["/new.js"]);
        assert!(registry.urls(AssetKind::Style).is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(HtmlRegistry::load(&dir.path().join("missing.html")).is_err());
    }

    #[test]
    fn test_empty_registry_reload_is_counted() {
        let registry = HtmlRegistry::empty();
        registry.reloader().trigger_full_reload();
        assert_eq!(registry.reload_count(), 1);
    }
}
