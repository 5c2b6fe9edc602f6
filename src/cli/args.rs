//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Livegate: serve a folder and reload the browser when it changes
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Content directory to serve and watch (default: current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub content_dir: Option<PathBuf>,

    /// Maximum directory depth the watcher descends into (default: unlimited)
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// HTTP port; the live reload websocket listens on PORT + 1
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Run the sass compiler in watch mode
    #[arg(short, long, conflicts_with = "sass_docker")]
    pub sass: bool,

    /// Run the sass compiler in watch mode inside a docker container
    #[arg(long)]
    pub sass_docker: bool,

    /// Log every request
    #[arg(short = 'q', long)]
    pub log_requests: bool,

    /// Log every response header block
    #[arg(short = 'a', long)]
    pub log_responses: bool,

    /// Config file path (default: livegate.toml, if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
