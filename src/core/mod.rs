//! Core process state shared by the server loop and the signal handler.

mod state;

pub use state::{Shutdown, setup_shutdown_handler};
