//! Configuration section definitions for `livegate.toml`.

mod compiler;
mod serve;
mod watch;

pub use compiler::{CompilerConfig, CompilerMode};
pub use serve::ServeConfig;
pub use watch::WatchConfig;
