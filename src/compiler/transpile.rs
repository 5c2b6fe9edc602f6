//! One-shot transpiler run (e.g. `tsc`) after a source change.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::utils::exec::Cmd;

/// Transpiler command, run from the content root.
#[derive(Debug, Clone)]
pub struct Transpiler {
    command: Vec<String>,
    root: PathBuf,
    pty: bool,
}

impl Transpiler {
    /// Runs through a PTY unless told otherwise, so the tool keeps its colors.
    pub fn new(command: &[String], root: &Path) -> Self {
        Self {
            command: command.to_vec(),
            root: root.to_path_buf(),
            pty: true,
        }
    }

    #[cfg(test)]
    pub fn pty(mut self, enable: bool) -> Self {
        self.pty = enable;
        self
    }

    pub fn display(&self) -> String {
        self.command.join(" ")
    }

    /// Run to completion. Blocks the caller for the tool's whole runtime.
    pub fn run(&self) -> Result<()> {
        let cmd = Cmd::from_slice(&self.command).cwd(&self.root).pty(self.pty);
        cmd.ensure_installed()?;
        cmd.run()?;
        Ok(())
    }
}
