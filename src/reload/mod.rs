//! Live reload: the single-browser channel and its websocket port.
//!
//! ```text
//! watcher --notify(target)--> LiveChannel --text--> browser
//!                                  ^                   |
//!                                  +----(pathname)-----+
//! ```
//!
//! - `channel` - [`LiveChannel`], the one-slot connection holder
//! - `server` - [`LiveReloadServer`], accepts browsers on `port + 1`

pub mod channel;
pub mod server;

pub use channel::{FULL_RELOAD, LiveChannel};
pub use server::LiveReloadServer;
