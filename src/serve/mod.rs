//! Static HTTP server with live reload injection.
//!
//! Connections are handled one at a time on the calling thread: read one
//! chunk, resolve, write, close. A stalled client holds up every request
//! behind it. That keeps "the last page loaded" unambiguous for the single
//! live reload slot, and is accepted for a one-developer local server.

mod inject;
mod path;
mod request;
mod response;

pub use path::{Resolved, resolve_path};
pub use response::Response;

use crate::{config::Config, core::Shutdown, debug, log};
use anyhow::{Context, Result};
use request::{RawRequest, REQUEST_BUFFER_SIZE};
use std::{
    io::{self, ErrorKind, Read, Write},
    net::{SocketAddr, TcpListener},
    path::Path,
    sync::Arc,
    thread,
    time::Duration,
};

/// Sleep between accept polls while no client is waiting.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Listening socket plus what each request needs.
pub struct ServerLoop {
    listener: TcpListener,
    addr: SocketAddr,
    config: Arc<Config>,
    shutdown: Shutdown,
}

impl ServerLoop {
    /// Bind the HTTP port (address reuse is the platform default for
    /// `TcpListener` on unix).
    pub fn bind(config: Arc<Config>, shutdown: Shutdown) -> Result<Self> {
        let addr = SocketAddr::new(config.serve.interface, config.serve.port);
        let listener =
            TcpListener::bind(addr).with_context(|| format!("Failed to bind HTTP server on {addr}"))?;
        let addr = listener.local_addr()?;

        // Polled accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        log!("serve"; "http://{} serving {}", addr, config.root().display());
        Ok(Self {
            listener,
            addr,
            config,
            shutdown,
        })
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Accept and handle connections until shutdown is triggered.
    ///
    /// The listening socket is closed when this returns.
    pub fn run(self) {
        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    debug!("serve"; "connection from {}", peer);
                    if let Err(e) = stream.set_nonblocking(false) {
                        log!("serve"; "could not configure connection from {}: {}", peer, e);
                        continue;
                    }
                    if let Err(e) = handle_connection(&mut stream, &self.config) {
                        log!("serve"; "connection from {} failed: {}", peer, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    log!("serve"; "accept error: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        drop(self.listener);
        debug!("serve"; "stopped accepting connections on {}", self.addr);
    }
}

/// Serve one request on an accepted connection.
pub fn handle_connection<S: Read + Write>(stream: &mut S, config: &Config) -> io::Result<()> {
    let request = RawRequest::read_from(stream)?;
    if request.is_empty() {
        debug!("request"; "connection closed before sending data");
        return Ok(());
    }
    if request.is_truncated() {
        log!("request"; "request filled the {} byte buffer, path may be truncated", REQUEST_BUFFER_SIZE);
    }

    let request_path = request.path();
    if config.serve.log_requests {
        log!(
            "request";
            "/{}\n{}",
            request_path,
            String::from_utf8_lossy(&request.bytes).trim_end()
        );
    }

    let mut response = build_response(&request_path, config.root());
    response.finish();

    let head = response.write_to(stream)?;
    if config.serve.log_responses {
        log!("response"; "{}", String::from_utf8_lossy(&head).trim_end());
    }
    Ok(())
}

/// Map a request path to its response.
pub fn build_response(request_path: &str, root: &Path) -> Response {
    match resolve_path(request_path, root) {
        Resolved::Found(path) => Response::from_file(&path),
        Resolved::Redirect(location) => Response::redirect(&location),
        Resolved::NotFound => {
            log!("request"; "not found: /{}", request_path);
            Response::not_found()
        }
    }
}
