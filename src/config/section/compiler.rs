//! `[compiler]` section configuration.
//!
//! Controls the external style-sheet compiler kept running in watch mode.
//!
//! # Example
//!
//! ```toml
//! [compiler]
//! mode = "direct"                     # disabled | direct | containerized
//! command = ["sass"]                  # Compiler command line
//! map_file = "sass-map.txt"           # source:dest pairs, read from the content root
//! fallback_map = "scss/:css/"         # Used when map_file is missing
//! container_runtime = "docker"       # Or any docker-compatible CLI, e.g. "podman"
//! container_name = "livegate-sass-node"
//! container_image = "node"
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Where (and whether) the style-sheet compiler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerMode {
    #[default]
    Disabled,
    /// Spawn the compiler's own watch mode on the host.
    Direct,
    /// Run the compiler inside a throwaway container and follow its logs.
    Containerized,
}

impl CompilerMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Direct => "direct",
            Self::Containerized => "containerized",
        }
    }
}

/// Style-sheet compiler settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub mode: CompilerMode,

    /// Compiler command line; `--watch` and the mapping are appended.
    pub command: Vec<String>,

    /// Project file with whitespace-separated `source:dest` pairs,
    /// relative to the content root.
    pub map_file: PathBuf,

    /// Mapping used when `map_file` does not exist.
    pub fallback_map: String,

    /// Container CLI used in containerized mode.
    pub container_runtime: String,

    pub container_name: String,

    pub container_image: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            mode: CompilerMode::Disabled,
            command: vec!["sass".into()],
            map_file: PathBuf::from("sass-map.txt"),
            fallback_map: "scss/:css/".into(),
            container_runtime: "docker".into(),
            container_name: "livegate-sass-node".into(),
            container_image: "node".into(),
        }
    }
}
