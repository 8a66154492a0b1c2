//! Native command-line entry point.

mod args;
mod probe;

pub use args::{Cli, Commands};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};

use crate::config::WatchConfig;

/// Config file picked up from the working directory when `-C` is absent.
const DEFAULT_CONFIG: &str = "reload.toml";

/// Parse arguments and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = load_config(cli.config.as_deref())?;
    crate::logger::set_verbose(cli.verbose || config.verbose);

    match &cli.command {
        Commands::Probe { server, page } => probe::run_probe(&config, server, page.as_deref()),
    }
}

/// Explicit path must exist; the default one is optional.
fn load_config(explicit: Option<&Path>) -> Result<WatchConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG);
            if !path.exists() {
                return Ok(WatchConfig::default());
            }
            path
        }
    };

    let (config, ignored) = WatchConfig::load(&path)
        .with_context(|| format!("failed to load config `{}`", path.display()))?;
    if !ignored.is_empty() {
        crate::log!("warning"; "unknown fields in {}, ignoring:", path.display());
        for field in &ignored {
            eprintln!("- {}", field);
        }
    }
    Ok(config)
}
