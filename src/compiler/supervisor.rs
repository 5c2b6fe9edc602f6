//! Lifecycle of the long-running sass watcher.
//!
//! Start spawns and forgets; nothing watches the child until shutdown.
//! Shutdown asks politely (SIGTERM), polls a few times, then kills.
//!
//! ```text
//! direct:         sass --watch <pairs>
//! containerized:  docker run --rm -d --name <name> -v <root>:/sass <image> bash -c '...' sass <pairs>
//!                 docker logs --follow <name>      <- supervised child
//!                 docker rm -f <name>              <- at shutdown
//! ```
//!
//! `docker` is the configured container runtime.

use std::path::PathBuf;
use std::process::Child;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use super::sass_map;
use crate::config::{CompilerConfig, CompilerMode, Config};
use crate::utils::exec::{Cmd, FilterRule};
use crate::{debug, log};

/// Exit checks after the termination signal.
pub const TERMINATE_RETRIES: u32 = 5;

/// Pause between exit checks.
pub const TERMINATE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Script run inside the container; the pairs arrive as `"$@"`.
const CONTAINER_SCRIPT: &str = "npm install -g sass && cd /sass && sass --watch \"$@\"";

/// Image pull progress printed by `run` when the image is not cached.
const DOCKER_FILTER: FilterRule = FilterRule::new(&[
    "Unable to find image",
    "latest: Pulling from",
    "Digest:",
    "Status:",
]);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("compiler watcher already started")]
    AlreadyStarted,

    #[error("failed to start compiler watcher: {0}")]
    Spawn(String),
}

/// How the child went away at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited within the retry window.
    Exited,
    /// Still alive after every check; force-killed.
    Killed,
}

/// Owns the compiler child process, if one was started.
pub struct CompilerSupervisor {
    config: CompilerConfig,
    root: PathBuf,
    child: Option<Child>,
    /// `docker run` succeeded and no `docker rm` has followed yet.
    container_started: bool,
    retries: u32,
    retry_delay: Duration,
}

impl CompilerSupervisor {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.compiler.clone(),
            root: config.root().to_path_buf(),
            child: None,
            container_started: false,
            retries: TERMINATE_RETRIES,
            retry_delay: TERMINATE_RETRY_DELAY,
        }
    }

    /// Override the shutdown polling schedule.
    #[cfg(test)]
    pub fn with_retry(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Process id of the supervised child.
    #[cfg(test)]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Spawn the watcher for the configured mode. No-op when disabled.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        if self.child.is_some() || self.container_started {
            log!("sass"; "compiler watcher already started");
            return Err(SupervisorError::AlreadyStarted);
        }

        let child = match self.config.mode {
            CompilerMode::Disabled => return Ok(()),
            CompilerMode::Direct => {
                let pairs = self.pairs();
                spawn(self.direct_command(&pairs))?
            }
            CompilerMode::Containerized => {
                let pairs = self.pairs();
                let run = self.container_run_command(&pairs);
                log!("docker"; "starting container {}", self.config.container_name);
                ensure_installed(&run)?;
                run.run().map_err(|e| SupervisorError::Spawn(format!("{e:#}")))?;
                // From here on shutdown owes a `docker rm`, child or not
                self.container_started = true;
                spawn(self.container_logs_command())?
            }
        };

        log!("sass"; "watcher started ({}, pid {})", self.config.mode.label(), child.id());
        self.child = Some(child);
        Ok(())
    }

    /// Stop the child. `None` when no child was running.
    ///
    /// A started container is removed first, which also ends the log
    /// follower.
    pub fn shutdown(&mut self) -> Option<Termination> {
        if self.container_started {
            self.container_started = false;
            log!("docker"; "removing container {}", self.config.container_name);
            if let Err(e) = self.container_remove_command().run() {
                log!("docker"; "container removal failed: {:#}", e);
            }
        }

        let mut child = self.child.take()?;
        log!("sass"; "stopping watcher (pid {})", child.id());
        let outcome = terminate(&mut child, self.retries, self.retry_delay);
        debug!("sass"; "watcher {:?}", outcome);
        Some(outcome)
    }

    fn pairs(&self) -> Vec<String> {
        sass_map::load(&self.root, &self.config.map_file, &self.config.fallback_map)
    }

    /// `<command> --watch <pairs>`
    pub fn direct_command(&self, pairs: &[String]) -> Cmd {
        Cmd::from_slice(&self.config.command)
            .arg("--watch")
            .args(pairs)
            .cwd(&self.root)
    }

    pub fn container_run_command(&self, pairs: &[String]) -> Cmd {
        let volume = format!("{}:/sass", self.root.display());
        self.container_cmd()
            .args(["run", "--rm", "-d", "--name", self.config.container_name.as_str()])
            .args(["-v", volume.as_str(), self.config.container_image.as_str()])
            .args(["bash", "-c", CONTAINER_SCRIPT, "sass"])
            .args(pairs)
            .cwd(&self.root)
            .filter(&DOCKER_FILTER)
    }

    pub fn container_logs_command(&self) -> Cmd {
        self.container_cmd()
            .args(["logs", "--follow", self.config.container_name.as_str()])
    }

    pub fn container_remove_command(&self) -> Cmd {
        self.container_cmd()
            .args(["rm", "-f", self.config.container_name.as_str()])
            .filter(&DOCKER_FILTER)
    }

    fn container_cmd(&self) -> Cmd {
        Cmd::new(&self.config.container_runtime)
    }
}

impl Drop for CompilerSupervisor {
    fn drop(&mut self) {
        // Stop whatever was never shut down explicitly
        if self.child.is_some() || self.container_started {
            self.shutdown();
        }
    }
}

fn ensure_installed(cmd: &Cmd) -> Result<(), SupervisorError> {
    cmd.ensure_installed()
        .map_err(|e| SupervisorError::Spawn(format!("{e:#}")))
}

fn spawn(cmd: Cmd) -> Result<Child, SupervisorError> {
    ensure_installed(&cmd)?;
    debug!("sass"; "{}", cmd.display());
    cmd.spawn().map_err(|e| SupervisorError::Spawn(format!("{e:#}")))
}

/// SIGTERM, up to `retries` exit checks `delay` apart, then SIGKILL.
fn terminate(child: &mut Child, retries: u32, delay: Duration) -> Termination {
    request_exit(child);

    for attempt in 1..=retries {
        if has_exited(child) {
            return Termination::Exited;
        }
        log!("sass"; "waiting for exit... ({}/{})", attempt, retries);
        thread::sleep(delay);
    }
    if has_exited(child) {
        return Termination::Exited;
    }

    log!("sass"; "watcher ignored the termination signal, killing it");
    if let Err(e) = child.kill() {
        log!("sass"; "kill failed: {}", e);
    }
    let _ = child.wait();
    Termination::Killed
}

fn has_exited(child: &mut Child) -> bool {
    match child.try_wait() {
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(e) => {
            log!("sass"; "could not query watcher status: {}", e);
            false
        }
    }
}

#[cfg(unix)]
fn request_exit(child: &Child) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: plain signal delivery to our own, not yet reaped child
    if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
        log!("sass"; "SIGTERM failed: {}", std::io::Error::last_os_error());
    }
}

/// No graceful signal off unix; the retry window only waits.
#[cfg(not(unix))]
fn request_exit(_child: &Child) {}
