//! Capabilities the dispatcher acts through.
//!
//! The dispatcher never touches a document directly: it lists references
//! through a [`ResourceRegistry`] and reloads through a [`FullReload`], so the
//! routing and matching logic runs the same against a browser DOM, an HTML
//! snapshot on disk, or a test fake.

use super::classify::AssetKind;

/// A document-embedded asset reference and its current URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef<H> {
    /// Live handle owned by the host document
    pub handle: H,
    /// Current `src` / `href` value
    pub url: String,
}

impl<H> ResourceRef<H> {
    pub fn new(handle: H, url: impl Into<String>) -> Self {
        Self {
            handle,
            url: url.into(),
        }
    }
}

/// Read and rewrite URL-bearing attributes of document references.
pub trait ResourceRegistry {
    type Handle;

    /// Current references of `kind`, in document order.
    fn references(&self, kind: AssetKind) -> Vec<ResourceRef<Self::Handle>>;

    /// Point `handle` at `url`, forcing the browser to fetch it.
    fn rewrite(&mut self, handle: &Self::Handle, url: &str);
}

/// Discard and reload the whole page.
pub trait FullReload {
    fn trigger_full_reload(&mut self);
}

impl<F: FnMut()> FullReload for F {
    fn trigger_full_reload(&mut self) {
        self()
    }
}
