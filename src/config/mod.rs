//! Server configuration: optional `livegate.toml` plus CLI overrides.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── compiler   # [compiler]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The file is optional. Every section defaults, so an empty (or absent)
//! file yields the same server as running with no flags at all. CLI flags
//! always win over file values.
//!
//! The resolved [`Config`] is wrapped in an `Arc` by `main` and handed to
//! each component; there is no global config handle.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{CompilerConfig, CompilerMode, ServeConfig, WatchConfig};

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "livegate.toml";

/// Root configuration structure representing livegate.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Canonical content root (internal use only, set by `finalize`)
    #[serde(skip)]
    root: PathBuf,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// File watcher settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Style-sheet compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// An explicit `--config` must exist; the default `livegate.toml` is
    /// used only when present.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (config_path, required) = match &cli.config {
            Some(path) => (cwd.join(path), true),
            None => (cwd.join(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else if required {
            return Err(ConfigError::Io(
                config_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            )
            .into());
        } else {
            Self::default()
        };

        // Paths in the file are relative to the file itself
        let base = config_path.parent().unwrap_or(&cwd);
        config.serve.content = base.join(&config.serve.content);

        config.apply_cli(cli, &cwd);
        config.finalize()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let config = Self::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        crate::debug!("config"; "loaded {}", path.display());
        Ok(config)
    }

    /// Apply CLI flags on top of file values.
    fn apply_cli(&mut self, cli: &Cli, cwd: &Path) {
        crate::logger::set_verbose(cli.verbose);

        if let Some(dir) = &cli.content_dir {
            self.serve.content = cwd.join(dir);
        }
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
        if cli.max_depth.is_some() {
            self.watch.max_depth = cli.max_depth;
        }
        if cli.sass {
            self.compiler.mode = CompilerMode::Direct;
        }
        if cli.sass_docker {
            self.compiler.mode = CompilerMode::Containerized;
        }
        self.serve.log_requests |= cli.log_requests;
        self.serve.log_responses |= cli.log_responses;
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate settings and resolve the canonical content root.
    fn finalize(&mut self) -> Result<(), ConfigError> {
        self.validate()?;
        self.root = self.serve.content.canonicalize().map_err(|err| {
            ConfigError::Io(self.serve.content.clone(), err)
        })?;
        Ok(())
    }

    /// Check invariants that would otherwise surface as runtime failures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.serve.content.is_dir() {
            return Err(ConfigError::Validation(format!(
                "content directory `{}` does not exist",
                self.serve.content.display()
            )));
        }
        if self.serve.port == u16::MAX {
            return Err(ConfigError::Validation(format!(
                "port {} leaves no room for the live reload port (port + 1)",
                self.serve.port
            )));
        }
        if self.watch.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.interval_ms must be greater than zero".into(),
            ));
        }
        if !self.watch.transpile.is_empty() && self.watch.transpiler.is_empty() {
            return Err(ConfigError::Validation(
                "watch.transpile is set but watch.transpiler is empty".into(),
            ));
        }
        if self.compiler.mode != CompilerMode::Disabled && self.compiler.command.is_empty() {
            return Err(ConfigError::Validation(format!(
                "compiler.mode is `{}` but compiler.command is empty",
                self.compiler.mode.label()
            )));
        }
        Ok(())
    }

    /// Canonical content root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Set the content root directly, skipping `finalize`.
    #[cfg(test)]
    pub fn set_root(&mut self, path: &Path) {
        self.serve.content = path.to_path_buf();
        self.root = path.to_path_buf();
    }
}

#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    Config::from_str(content).expect("test config should parse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.set_root(dir);
        config
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_str("[serve]\nportt = 1").is_err());
        assert!(Config::from_str("[nope]\nx = 1").is_err());
    }

    #[test]
    fn test_validate_missing_content_dir() {
        let temp = TempDir::new().unwrap();
        let config = config_for(&temp.path().join("missing"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validate_port_upper_bound() {
        let temp = TempDir::new().unwrap();
        let mut config = config_for(temp.path());
        config.serve.port = u16::MAX;
        assert!(config.validate().is_err());

        config.serve.port = u16::MAX - 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_compiler_command() {
        let temp = TempDir::new().unwrap();
        let mut config = config_for(temp.path());
        config.compiler.mode = CompilerMode::Direct;
        config.compiler.command.clear();
        assert!(config.validate().is_err());

        config.compiler.mode = CompilerMode::Disabled;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_interval() {
        let temp = TempDir::new().unwrap();
        let mut config = config_for(temp.path());
        config.watch.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("[serve]\nport = 3000\n[watch]\nmax_depth = 1");
        let cli = Cli::parse_from([
            "livegate",
            "--port",
            "4000",
            "--max-depth",
            "5",
            "--sass-docker",
            "-q",
        ]);

        config.apply_cli(&cli, temp.path());

        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.watch.max_depth, Some(5));
        assert_eq!(config.compiler.mode, CompilerMode::Containerized);
        assert!(config.serve.log_requests);
        assert!(!config.serve.log_responses);
    }

    #[test]
    fn test_cli_absent_keeps_file_values() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("[serve]\nport = 3000\n[compiler]\nmode = \"direct\"");
        let cli = Cli::parse_from(["livegate"]);

        config.apply_cli(&cli, temp.path());

        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.compiler.mode, CompilerMode::Direct);
    }

    #[test]
    fn test_finalize_canonicalizes_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("site")).unwrap();

        let mut config = Config::default();
        config.serve.content = temp.path().join("site").join(".");
        config.finalize().unwrap();

        assert_eq!(
            config.root(),
            temp.path().join("site").canonicalize().unwrap()
        );
        assert!(config.root().is_absolute());
    }
}
