//! Source to destination folder pairs for the sass watcher.
//!
//! The project file holds whitespace-separated `source:dest` tokens,
//! each passed to the compiler as its own argument:
//!
//! ```text
//! scss/:css/
//! themes/dark/:css/dark/
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::log;

/// Read `map_file` under `root`, or fall back to `fallback`.
///
/// An unreadable or empty file also falls back, since the compiler
/// refuses `--watch` without pairs.
pub fn load(root: &Path, map_file: &Path, fallback: &str) -> Vec<String> {
    let path = root.join(map_file);
    match fs::read_to_string(&path) {
        Ok(content) => {
            let pairs = split_pairs(&content);
            if pairs.is_empty() {
                log!("sass"; "{} is empty, using fallback map '{}'", map_file.display(), fallback);
                return split_pairs(fallback);
            }
            pairs
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log!("sass"; "{} not found, using fallback map '{}'", map_file.display(), fallback);
            split_pairs(fallback)
        }
        Err(e) => {
            log!("sass"; "could not read {}: {}, using fallback map '{}'", path.display(), e, fallback);
            split_pairs(fallback)
        }
    }
}

fn split_pairs(content: &str) -> Vec<String> {
    content.split_whitespace().map(str::to_owned).collect()
}
