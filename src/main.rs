//! wasmdev-reload - probe a dev server's live reload channel from the terminal.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    wasmdev_reload::cli::run()
}

// The browser entry points are exported from the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
