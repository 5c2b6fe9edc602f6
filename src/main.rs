//! Livegate - a local development server with live reload.

mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod serve;
mod utils;
mod watch;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use cli::Cli;
use compiler::CompilerSupervisor;
use config::Config;
use core::Shutdown;
use reload::{LiveChannel, LiveReloadServer};
use serve::ServerLoop;
use watch::{FileWatcher, Watcher};

fn main() -> Result<()> {
    // Setup Ctrl+C / SIGTERM handler (before any blocking operations)
    let shutdown = Shutdown::new();
    core::setup_shutdown_handler(shutdown.clone())?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Arc::new(Config::load(&cli)?);
    serve(config, shutdown)
}

/// Start every component, serve until shutdown, then stop them in order:
/// listener, watcher, live reload port, compiler.
fn serve(config: Arc<Config>, shutdown: Shutdown) -> Result<()> {
    let channel = LiveChannel::new();

    let server = ServerLoop::bind(Arc::clone(&config), shutdown.clone())?;

    let ws_addr = SocketAddr::new(config.serve.interface, config.serve.ws_port());
    let reload = LiveReloadServer::start(ws_addr, channel.clone(), shutdown.clone())?;
    log!("reload"; "ws://{}", reload.local_addr());

    let interval = Duration::from_millis(config.watch.interval_ms);
    let watcher = FileWatcher::spawn(Watcher::new(&config, channel), interval, shutdown.clone())?;

    let mut supervisor = CompilerSupervisor::new(&config);
    if let Err(e) = supervisor.start() {
        // Serving goes on without live style-sheet compilation
        log!("sass"; "{}", e);
    }

    // Blocks until shutdown; closes the listening socket on return
    server.run();

    watcher.join();
    reload.join();
    supervisor.shutdown();

    log!("serve"; "stopped");
    Ok(())
}
