//! WebSocket acceptor for the live reload port.
//!
//! One background thread accepts handshakes and polls the held
//! connection for incoming messages. The handshake accepts any request
//! path; the injected script uses `/livegate`.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};

use super::channel::LiveChannel;
use crate::core::Shutdown;
use crate::{debug, log};

/// Sleep between accept/read polls.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Upper bound on a client's handshake before it is dropped.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Running acceptor thread.
pub struct LiveReloadServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl LiveReloadServer {
    /// Bind `addr` and start accepting browsers into `channel`.
    ///
    /// The thread exits once `shutdown` is triggered.
    pub fn start(addr: SocketAddr, channel: LiveChannel, shutdown: Shutdown) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .with_context(|| format!("Failed to bind live reload server on {addr}"))?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let handle = thread::Builder::new()
            .name("livegate-reload".into())
            .spawn(move || accept_loop(&listener, &channel, &shutdown))
            .context("Failed to spawn live reload thread")?;

        debug!("reload"; "ws://{}", addr);
        Ok(Self { addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the thread after shutdown was triggered.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log!("reload"; "live reload thread panicked");
        }
    }
}

fn accept_loop(listener: &TcpListener, channel: &LiveChannel, shutdown: &Shutdown) {
    while !shutdown.is_triggered() {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("reload"; "client connecting from {}", peer);
                if let Err(e) = handshake(stream, channel) {
                    log!("reload"; "handshake with {} failed: {}", peer, e);
                }
                continue;
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => log!("reload"; "accept error: {}", e),
        }

        channel.poll();
        thread::sleep(POLL_INTERVAL);
    }
    debug!("reload"; "live reload server stopped");
}

/// Upgrade the connection and hand it to the channel.
fn handshake(stream: TcpStream, channel: &LiveChannel) -> Result<()> {
    // Blocking during the handshake, non-blocking for polled reads after
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;

    let ws = tungstenite::accept(stream).map_err(|e| anyhow::anyhow!("{e}"))?;

    ws.get_ref().set_read_timeout(None)?;
    ws.get_ref().set_nonblocking(true)?;
    channel.on_open(Box::new(ws));
    Ok(())
}
