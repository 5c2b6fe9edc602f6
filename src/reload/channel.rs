//! Single-slot live reload channel.
//!
//! At most one browser connection is held. A new connection replaces
//! (and closes) the old one, so the most recently opened tab is the one
//! that gets told to reload.
//!
//! # States
//!
//! ```text
//!   Idle --on_open--> Active --on_close--> Idle
//!                       |  ^
//!                       +--+ on_open (old peer closed first)
//! ```

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::{debug, log};

/// Target telling every open tab to reload.
pub const FULL_RELOAD: &str = "*";

/// What a poll of the peer turned up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// Nothing to read right now.
    Idle,
    /// Text from the browser (its current path).
    Message(String),
    /// The peer closed or the connection broke.
    Closed,
}

/// One browser connection as the channel sees it.
pub trait Peer: Send {
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Non-blocking read of at most one incoming message.
    fn poll_event(&mut self) -> PeerEvent;

    /// Start a close handshake and release the connection.
    fn disconnect(&mut self);
}

impl Peer for WebSocket<TcpStream> {
    fn send_text(&mut self, text: &str) -> Result<()> {
        match self.send(Message::Text(text.to_owned().into())) {
            Ok(()) => Ok(()),
            // Queued; flushed on the next read or send
            Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn poll_event(&mut self) -> PeerEvent {
        match self.read() {
            Ok(Message::Text(text)) => PeerEvent::Message(text.as_str().to_owned()),
            Ok(Message::Close(_)) => PeerEvent::Closed,
            Ok(_) => PeerEvent::Idle,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                PeerEvent::Idle
            }
            Err(_) => PeerEvent::Closed,
        }
    }

    fn disconnect(&mut self) {
        let _ = WebSocket::close(self, None);
        let _ = self.flush();
    }
}

/// Identifies one `on_open` so a late `on_close` can't clear a newer peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionId(u64);

struct Connection {
    id: ConnectionId,
    peer: Box<dyn Peer>,
}

/// Cloneable handle to the shared slot.
///
/// Every access goes through one lock, so a close/reopen can never race
/// with a `notify` from the watcher thread.
#[derive(Clone, Default)]
pub struct LiveChannel {
    slot: Arc<Mutex<Option<Connection>>>,
    next_id: Arc<AtomicU64>,
}

impl LiveChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new connection, closing the current one first.
    pub fn on_open(&self, peer: Box<dyn Peer>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut slot = self.slot.lock();

        if let Some(mut old) = slot.take() {
            debug!("reload"; "replacing connection {} with {}", old.id.0, id.0);
            old.peer.disconnect();
        }

        *slot = Some(Connection { id, peer });
        debug!("reload"; "browser connected ({})", id.0);
        id
    }

    /// Clear the slot if it still holds `id`. Idempotent.
    ///
    /// Returns whether anything was cleared.
    pub fn on_close(&self, id: ConnectionId) -> bool {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(conn) if conn.id == id => {
                *slot = None;
                debug!("reload"; "browser disconnected ({})", id.0);
                true
            }
            _ => false,
        }
    }

    /// Send `target` to the connected browser.
    ///
    /// `false` when no browser is connected or the send failed; neither
    /// is an error for the caller. A failed send drops the connection.
    pub fn notify(&self, target: &str) -> bool {
        let mut slot = self.slot.lock();
        let Some(conn) = slot.as_mut() else {
            log!("reload"; "no browser connected, `{}` not delivered", target);
            return false;
        };

        match conn.peer.send_text(target) {
            Ok(()) => {
                debug!("reload"; "sent `{}` to connection {}", target, conn.id.0);
                true
            }
            Err(e) => {
                log!("reload"; "send to browser failed: {}", e);
                *slot = None;
                false
            }
        }
    }

    /// Drain pending events of the current peer.
    ///
    /// Messages are only logged; a close goes through [`Self::on_close`].
    pub fn poll(&self) {
        let closed = {
            let mut slot = self.slot.lock();
            loop {
                let Some(conn) = slot.as_mut() else { return };
                match conn.peer.poll_event() {
                    PeerEvent::Idle => return,
                    PeerEvent::Message(path) => {
                        debug!("reload"; "browser is on {}", path);
                    }
                    PeerEvent::Closed => break conn.id,
                }
            }
        };
        self.on_close(closed);
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Id of the held connection, if any.
    #[cfg(test)]
    pub fn active_id(&self) -> Option<ConnectionId> {
        self.slot.lock().as_ref().map(|conn| conn.id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicBool;

    /// Records what the channel does to it.
    #[derive(Clone, Default)]
    pub(crate) struct MockPeer {
        pub sent: Arc<Mutex<Vec<String>>>,
        pub closed: Arc<AtomicBool>,
        pub incoming: Arc<Mutex<VecDeque<PeerEvent>>>,
        pub fail_send: bool,
    }

    impl MockPeer {
        pub fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }

        pub fn sent(&self) -> Vec<String> {
            self.sent.lock().clone()
        }
    }

    impl Peer for MockPeer {
        fn send_text(&mut self, text: &str) -> Result<()> {
            if self.fail_send {
                anyhow::bail!("broken pipe");
            }
            self.sent.lock().push(text.to_owned());
            Ok(())
        }

        fn poll_event(&mut self) -> PeerEvent {
            self.incoming.lock().pop_front().unwrap_or(PeerEvent::Idle)
        }

        fn disconnect(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_notify_idle_returns_false() {
        let channel = LiveChannel::new();
        assert!(!channel.is_active());
        assert!(!channel.notify(FULL_RELOAD));
    }

    #[test]
    fn test_notify_active() {
        let channel = LiveChannel::new();
        let peer = MockPeer::default();
        channel.on_open(Box::new(peer.clone()));

        assert!(channel.notify("page2.html"));
        assert!(channel.notify(FULL_RELOAD));
        assert_eq!(peer.sent(), ["page2.html", "*"]);
    }

    #[test]
    fn test_second_open_closes_first() {
        let channel = LiveChannel::new();
        let a = MockPeer::default();
        let b = MockPeer::default();

        let id_a = channel.on_open(Box::new(a.clone()));
        let id_b = channel.on_open(Box::new(b.clone()));

        assert_ne!(id_a, id_b);
        assert!(a.is_closed());
        assert!(!b.is_closed());
        assert_eq!(channel.active_id(), Some(id_b));

        channel.notify("index.html");
        assert!(a.sent().is_empty());
        assert_eq!(b.sent(), ["index.html"]);
    }

    #[test]
    fn test_stale_close_keeps_newer_connection() {
        let channel = LiveChannel::new();
        let id_a = channel.on_open(Box::new(MockPeer::default()));
        let id_b = channel.on_open(Box::new(MockPeer::default()));

        assert!(!channel.on_close(id_a));
        assert_eq!(channel.active_id(), Some(id_b));
    }

    #[test]
    fn test_close_is_idempotent() {
        let channel = LiveChannel::new();
        let id = channel.on_open(Box::new(MockPeer::default()));

        assert!(channel.on_close(id));
        assert!(!channel.on_close(id));
        assert!(!channel.is_active());
        assert!(!channel.notify(FULL_RELOAD));
    }

    #[test]
    fn test_failed_send_drops_connection() {
        let channel = LiveChannel::new();
        let peer = MockPeer {
            fail_send: true,
            ..Default::default()
        };
        channel.on_open(Box::new(peer));

        assert!(!channel.notify(FULL_RELOAD));
        assert!(!channel.is_active());
    }

    #[test]
    fn test_poll_consumes_messages_and_close() {
        let channel = LiveChannel::new();
        let peer = MockPeer::default();
        peer.incoming.lock().extend([
            PeerEvent::Message("/docs/".into()),
            PeerEvent::Closed,
        ]);
        let id = channel.on_open(Box::new(peer.clone()));

        channel.poll();
        assert!(!channel.is_active());
        assert!(peer.incoming.lock().is_empty());
        // Already cleared through the close path
        assert!(!channel.on_close(id));
    }

    #[test]
    fn test_poll_idle_keeps_connection() {
        let channel = LiveChannel::new();
        channel.on_open(Box::new(MockPeer::default()));
        channel.poll();
        assert!(channel.is_active());
    }

    #[test]
    fn test_clones_share_slot() {
        let channel = LiveChannel::new();
        let watcher_side = channel.clone();
        let peer = MockPeer::default();
        channel.on_open(Box::new(peer.clone()));

        assert!(watcher_side.notify("a.html"));
        assert_eq!(peer.sent(), ["a.html"]);
    }
}
