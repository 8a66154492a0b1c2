//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};

/// Live reload client for wasm web apps
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Log ignored notifications and connection details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: reload.toml, if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Connect to a dev server and show how each notification is applied
    #[command(visible_alias = "p")]
    Probe {
        /// Notification endpoint of the dev server
        #[arg(short, long, default_value = "ws://127.0.0.1:8080/")]
        server: String,

        /// HTML page whose script and stylesheet references are mirrored
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        page: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_defaults() {
        let cli = Cli::try_parse_from(["wasmdev-reload", "probe"]).unwrap();
        let Commands::Probe { server, page } = cli.command;
        assert_eq!(server, "ws://127.0.0.1:8080/");
        assert!(page.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_probe_args() {
        let cli = Cli::try_parse_from([
            "wasmdev-reload",
            "-v",
            "-C",
            "dev/reload.toml",
            "p",
            "--server",
            "ws://localhost:5277/",
            "--page",
            "dist/index.html",
        ])
        .unwrap();
        let Commands::Probe { server, page } = cli.command;
        assert_eq!(server, "ws://localhost:5277/");
        assert_eq!(page, Some(PathBuf::from("dist/index.html")));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("dev/reload.toml")));
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["wasmdev-reload"]).is_err());
    }
}
