//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! max_depth = 3                       # Unlimited when omitted
//! interval_ms = 50                    # Poll interval
//! extensions = ["html", "ts", "css"]  # Files worth tracking
//! full_reload = ["ts", "css"]         # Changes that reload every tab
//! transpile = ["ts"]                  # Changes that run the transpiler first
//! transpiler = ["tsc"]                # Transpiler command line
//! max_entries = 1000                  # Cap on tracked files (unlimited when omitted)
//! ```

use serde::Deserialize;

/// File watcher settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Maximum directory depth below the content root. `None` = unlimited,
    /// `0` = only files directly in the root.
    pub max_depth: Option<usize>,

    /// Poll interval in milliseconds.
    pub interval_ms: u64,

    /// Extensions (without dot) of files the watcher tracks.
    pub extensions: Vec<String>,

    /// Extensions whose change reloads every tab (`"*"`).
    pub full_reload: Vec<String>,

    /// Extensions whose change runs the transpiler before notifying.
    pub transpile: Vec<String>,

    /// Transpiler command line (program followed by arguments).
    pub transpiler: Vec<String>,

    /// Upper bound on tracked files. New files beyond it are rejected.
    pub max_entries: Option<usize>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            interval_ms: 50,
            extensions: vec!["html".into(), "ts".into(), "css".into()],
            full_reload: vec!["ts".into(), "css".into()],
            transpile: vec!["ts".into()],
            transpiler: vec!["tsc".into()],
            max_entries: None,
        }
    }
}
