//! External compilers: the supervised sass watcher and the one-shot
//! transpiler the file watcher runs on source changes.

mod sass_map;
mod supervisor;
mod transpile;

pub use supervisor::CompilerSupervisor;
pub use transpile::Transpiler;
