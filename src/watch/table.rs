//! Path to last-seen change time.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Filesystem change time (`ctime`) at the precision the platform reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangeTime {
    secs: i64,
    nanos: i64,
}

impl ChangeTime {
    pub const fn new(secs: i64, nanos: i64) -> Self {
        Self { secs, nanos }
    }

    #[cfg(unix)]
    pub fn of(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self::new(meta.ctime(), meta.ctime_nsec())
    }

    /// No inode change time off unix; modification time stands in.
    #[cfg(not(unix))]
    pub fn of(meta: &Metadata) -> Self {
        let since_epoch = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .unwrap_or_default();
        Self::new(since_epoch.as_secs() as i64, i64::from(since_epoch.subsec_nanos()))
    }
}

/// Rejected insert when the table is capped.
#[derive(Debug, Error)]
#[error("watcher table full ({capacity} entries), not tracking {}", path.display())]
pub struct TableFull {
    pub path: PathBuf,
    pub capacity: usize,
}

/// Result of recording one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting, now tracked.
    New,
    Unchanged,
    /// Change time differs from the stored one; stored value updated.
    Changed,
}

/// Tracked files and their last change time.
///
/// Grows without bound unless `max_entries` is set. Entries are never
/// removed: a deleted file keeps its last stamp, and if it comes back
/// with a new one that counts as a change.
#[derive(Debug, Default)]
pub struct WatcherTable {
    entries: FxHashMap<PathBuf, ChangeTime>,
    max_entries: Option<usize>,
}

impl WatcherTable {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: FxHashMap::default(),
            max_entries,
        }
    }

    /// Record `ctime` for `path`.
    ///
    /// A new path beyond the cap is rejected; existing entries are left
    /// exactly as they were.
    pub fn observe(&mut self, path: &Path, ctime: ChangeTime) -> Result<Observation, TableFull> {
        if let Some(stored) = self.entries.get_mut(path) {
            if *stored == ctime {
                return Ok(Observation::Unchanged);
            }
            *stored = ctime;
            return Ok(Observation::Changed);
        }

        if let Some(capacity) = self.max_entries
            && self.entries.len() >= capacity
        {
            return Err(TableFull {
                path: path.to_path_buf(),
                capacity,
            });
        }

        self.entries.insert(path.to_path_buf(), ctime);
        Ok(Observation::New)
    }

    #[cfg(test)]
    pub fn get(&self, path: &Path) -> Option<ChangeTime> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: ChangeTime = ChangeTime::new(100, 0);
    const T2: ChangeTime = ChangeTime::new(100, 5);

    #[test]
    fn test_one_change_per_distinct_stamp() {
        let mut table = WatcherTable::new(None);
        let path = Path::new("/site/page2.html");

        assert_eq!(table.observe(path, T1).unwrap(), Observation::New);
        assert_eq!(table.observe(path, T1).unwrap(), Observation::Unchanged);
        assert_eq!(table.observe(path, T1).unwrap(), Observation::Unchanged);

        assert_eq!(table.observe(path, T2).unwrap(), Observation::Changed);
        assert_eq!(table.observe(path, T2).unwrap(), Observation::Unchanged);
        assert_eq!(table.get(path), Some(T2));
    }

    #[test]
    fn test_going_back_in_time_is_a_change() {
        let mut table = WatcherTable::new(None);
        let path = Path::new("a.css");
        table.observe(path, T2).unwrap();
        assert_eq!(table.observe(path, T1).unwrap(), Observation::Changed);
    }

    #[test]
    fn test_uncapped_grows() {
        let mut table = WatcherTable::new(None);
        for i in 0..5000 {
            let path = PathBuf::from(format!("/site/{i}.html"));
            assert_eq!(table.observe(&path, T1).unwrap(), Observation::New);
        }
        assert_eq!(table.len(), 5000);
    }

    #[test]
    fn test_full_table_rejects_without_corruption() {
        let mut table = WatcherTable::new(Some(2));
        let a = Path::new("a.html");
        let b = Path::new("b.html");
        table.observe(a, T1).unwrap();
        table.observe(b, T2).unwrap();

        let err = table.observe(Path::new("c.html"), T1).unwrap_err();
        assert_eq!(err.capacity, 2);
        assert_eq!(err.path, Path::new("c.html"));
        assert!(err.to_string().contains("c.html"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(a), Some(T1));
        assert_eq!(table.get(b), Some(T2));
        assert_eq!(table.get(Path::new("c.html")), None);

        // Known paths still update when full
        assert_eq!(table.observe(a, T2).unwrap(), Observation::Changed);
        assert_eq!(table.get(a), Some(T2));
    }

    #[test]
    fn test_zero_capacity() {
        let mut table = WatcherTable::new(Some(0));
        assert!(table.observe(Path::new("x.ts"), T1).is_err());
        assert!(table.is_empty());
    }
}
