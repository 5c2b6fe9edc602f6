//! Polling file watcher.
//!
//! Every interval the content tree is walked and each tracked file's
//! change time is compared with the last one seen. A change may first run
//! the transpiler (synchronously, delaying the next poll), then notifies
//! the live channel.
//!
//! - `table` - [`WatcherTable`], path to last change time
//! - `classify` - [`Classifier`], extension sets and reload targets

mod classify;
mod table;

pub use classify::Classifier;
pub use table::{ChangeTime, Observation, WatcherTable};

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use jwalk::{Parallelism, WalkDir};

use crate::compiler::Transpiler;
use crate::config::Config;
use crate::core::Shutdown;
use crate::reload::LiveChannel;
use crate::{debug, log, logger};

/// Poller state. Owned by the watcher thread.
pub struct Watcher {
    root: PathBuf,
    max_depth: Option<usize>,
    classifier: Classifier,
    table: WatcherTable,
    transpiler: Transpiler,
    channel: LiveChannel,
    /// New files turned away by a full table in the last poll.
    rejected: usize,
}

impl Watcher {
    pub fn new(config: &Config, channel: LiveChannel) -> Self {
        Self {
            root: config.root().to_path_buf(),
            max_depth: config.watch.max_depth,
            classifier: Classifier::new(&config.watch),
            table: WatcherTable::new(config.watch.max_entries),
            transpiler: Transpiler::new(&config.watch.transpiler, config.root()),
            channel,
            rejected: 0,
        }
    }

    /// Replace the transpiler (non-PTY runs in tests).
    #[cfg(test)]
    pub fn with_transpiler(mut self, transpiler: Transpiler) -> Self {
        self.transpiler = transpiler;
        self
    }

    #[cfg(test)]
    pub fn table(&self) -> &WatcherTable {
        &self.table
    }

    /// One pass over the tree. Returns the targets of detected changes,
    /// in walk order.
    pub fn poll(&mut self) -> Vec<String> {
        let mut targets = Vec::new();
        let mut rejected = 0;

        for path in self.walk() {
            if !self.classifier.is_interesting(&path) {
                continue;
            }
            // Follows symlinks; vanished or non-regular entries are skipped
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }

            match self.table.observe(&path, ChangeTime::of(&meta)) {
                Ok(Observation::Changed) => targets.push(self.on_change(&path)),
                Ok(Observation::New | Observation::Unchanged) => {}
                Err(full) => {
                    debug!("watch"; "{}", full);
                    rejected += 1;
                }
            }
        }

        if rejected != self.rejected {
            if rejected > 0 {
                logger::status_warning(&format!("watch table full, {rejected} new file(s) not tracked"));
            }
            self.rejected = rejected;
        }
        targets
    }

    /// Files (and symlinks) under the root within the depth budget.
    ///
    /// Depth 0 means files directly in the root only.
    fn walk(&self) -> impl Iterator<Item = PathBuf> + use<> {
        let mut walk = WalkDir::new(&self.root)
            .skip_hidden(false)
            .follow_links(false)
            .parallelism(Parallelism::Serial);
        if let Some(depth) = self.max_depth {
            walk = walk.max_depth(depth.saturating_add(1));
        }

        walk.into_iter()
            .filter_map(Result::ok)
            .filter(|entry| !entry.file_type().is_dir())
            .map(|entry| entry.path())
    }

    fn on_change(&self, path: &Path) -> String {
        debug!("watch"; "changed: {}", self.root_relative(path).display());

        if self.classifier.needs_transpile(path) {
            log!("tsc"; "{}", self.transpiler.display());
            if let Err(e) = self.transpiler.run() {
                logger::status_error("transpile failed", &format!("{e:#}"));
            }
        }

        let target = self.classifier.target(path, &self.root);
        if self.channel.notify(&target) {
            logger::status_success(&format!("reload: {target}"));
        }
        target
    }

    fn root_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Running watcher thread.
pub struct FileWatcher {
    handle: JoinHandle<()>,
}

impl FileWatcher {
    /// Start polling every `interval` until `shutdown` is triggered.
    pub fn spawn(mut watcher: Watcher, interval: Duration, shutdown: Shutdown) -> Result<Self> {
        let handle = thread::Builder::new()
            .name("livegate-watch".into())
            .spawn(move || {
                debug!("watch"; "watching {}", watcher.root.display());
                while !shutdown.is_triggered() {
                    watcher.poll();
                    thread::sleep(interval);
                }
                debug!("watch"; "watcher stopped ({} files tracked)", watcher.table.len());
            })
            .context("Failed to spawn watcher thread")?;
        Ok(Self { handle })
    }

    /// Wait for the thread to finish its current cycle and exit.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log!("watch"; "watcher thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::channel::tests::MockPeer;
    use tempfile::TempDir;

    /// Long enough for the filesystem clock to move on.
    const TICK: Duration = Duration::from_millis(50);

    fn setup(configure: impl FnOnce(&mut Config)) -> (TempDir, Watcher, MockPeer) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("index.html"), "<body>1</body>").unwrap();
        fs::write(root.join("page2.html"), "<body>2</body>").unwrap();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/style.css"), "a {}").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let mut config = Config::default();
        config.set_root(root);
        config.watch.transpile.clear();
        configure(&mut config);

        let channel = LiveChannel::new();
        let peer = MockPeer::default();
        channel.on_open(Box::new(peer.clone()));

        let watcher = Watcher::new(&config, channel);
        (temp, watcher, peer)
    }

    fn touch(path: &Path, content: &str) {
        thread::sleep(TICK);
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_first_poll_only_records() {
        let (_temp, mut watcher, peer) = setup(|_| {});
        assert!(watcher.poll().is_empty());
        // html + html + css, the .txt is not tracked
        assert_eq!(watcher.table().len(), 3);
        assert!(peer.sent().is_empty());
    }

    #[test]
    fn test_html_change_targets_page() {
        let (temp, mut watcher, peer) = setup(|_| {});
        watcher.poll();

        touch(&temp.path().join("page2.html"), "<body>2b</body>");
        assert_eq!(watcher.poll(), ["page2.html"]);
        assert_eq!(peer.sent(), ["page2.html"]);

        // Same stamp on the next poll: no second event
        assert!(watcher.poll().is_empty());
        assert_eq!(peer.sent().len(), 1);
    }

    #[test]
    fn test_css_change_reloads_everything() {
        let (temp, mut watcher, peer) = setup(|_| {});
        watcher.poll();

        touch(&temp.path().join("css/style.css"), "a { color: red }");
        assert_eq!(watcher.poll(), ["*"]);
        assert_eq!(peer.sent(), ["*"]);
    }

    #[test]
    fn test_nested_html_target() {
        let (temp, mut watcher, _peer) = setup(|_| {});
        fs::create_dir(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/index.html"), "x").unwrap();
        watcher.poll();

        touch(&temp.path().join("docs/index.html"), "y");
        assert_eq!(watcher.poll(), ["docs/index.html"]);
    }

    #[test]
    fn test_new_file_is_not_a_change() {
        let (temp, mut watcher, peer) = setup(|_| {});
        watcher.poll();

        fs::write(temp.path().join("page3.html"), "new").unwrap();
        assert!(watcher.poll().is_empty());
        assert!(peer.sent().is_empty());
        assert_eq!(watcher.table().len(), 4);
    }

    #[test]
    fn test_depth_zero_only_root_files() {
        let (_temp, mut watcher, _peer) = setup(|config| config.watch.max_depth = Some(0));
        watcher.poll();
        // css/style.css sits one level down
        assert_eq!(watcher.table().len(), 2);
    }

    #[test]
    fn test_depth_one_includes_first_level() {
        let (temp, mut watcher, _peer) = setup(|config| config.watch.max_depth = Some(1));
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/deep.html"), "x").unwrap();
        watcher.poll();
        assert_eq!(watcher.table().len(), 3);
        assert!(watcher.table().get(&temp.path().join("a/b/deep.html")).is_none());
    }

    #[test]
    fn test_full_table_keeps_watching_known_files() {
        let (temp, mut watcher, peer) = setup(|config| {
            config.watch.max_depth = Some(0);
            config.watch.max_entries = Some(1);
        });
        watcher.poll();
        assert_eq!(watcher.table().len(), 1);

        // Whichever file got the slot still reports changes
        let tracked = ["index.html", "page2.html"]
            .into_iter()
            .find(|name| watcher.table().get(&temp.path().join(name)).is_some())
            .unwrap();
        touch(&temp.path().join(tracked), "changed");
        assert_eq!(watcher.poll(), [tracked]);
        assert_eq!(peer.sent(), [tracked]);
    }

    #[test]
    fn test_no_browser_still_detects() {
        let (temp, mut watcher, _peer) = setup(|_| {});
        watcher.channel = LiveChannel::new();
        watcher.poll();

        touch(&temp.path().join("index.html"), "z");
        assert_eq!(watcher.poll(), ["index.html"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_transpile_runs_before_notify() {
        let (temp, watcher, peer) = setup(|config| {
            config.watch.transpile = vec!["ts".into()];
        });
        fs::write(temp.path().join("app.ts"), "let a = 1").unwrap();

        let command = vec!["touch".to_string(), "app.js".to_string()];
        let mut watcher =
            watcher.with_transpiler(Transpiler::new(&command, temp.path()).pty(false));
        watcher.poll();
        assert!(!temp.path().join("app.js").exists());

        touch(&temp.path().join("app.ts"), "let a = 2");
        assert_eq!(watcher.poll(), ["*"]);
        assert!(temp.path().join("app.js").exists());
        assert_eq!(peer.sent(), ["*"]);
    }

    #[test]
    fn test_thread_stops_on_shutdown() {
        let (temp, watcher, peer) = setup(|_| {});
        let shutdown = Shutdown::new();
        let running = FileWatcher::spawn(watcher, Duration::from_millis(5), shutdown.clone())
            .unwrap();

        thread::sleep(TICK);
        touch(&temp.path().join("page2.html"), "later");

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while peer.sent().is_empty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(peer.sent(), ["page2.html"]);

        shutdown.trigger();
        running.join();
    }
}
