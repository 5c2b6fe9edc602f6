//! Which files matter, and what a change to them means.

use std::path::{Component, Path};

use crate::config::WatchConfig;
use crate::reload::FULL_RELOAD;

/// Extension sets from `[watch]`. Matching is exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct Classifier {
    extensions: Vec<String>,
    full_reload: Vec<String>,
    transpile: Vec<String>,
}

impl Classifier {
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            full_reload: config.full_reload.clone(),
            transpile: config.transpile.clone(),
        }
    }

    /// Tracked at all.
    pub fn is_interesting(&self, path: &Path) -> bool {
        has_extension_in(path, &self.extensions)
    }

    /// Run the transpiler before notifying.
    pub fn needs_transpile(&self, path: &Path) -> bool {
        has_extension_in(path, &self.transpile)
    }

    pub fn needs_full_reload(&self, path: &Path) -> bool {
        has_extension_in(path, &self.full_reload)
    }

    /// Notification target: `"*"` for full reloads, else the path
    /// relative to `root` with `/` separators and no leading slash.
    pub fn target(&self, path: &Path, root: &Path) -> String {
        if self.needs_full_reload(path) {
            return FULL_RELOAD.to_owned();
        }
        relative_target(path, root)
    }
}

fn has_extension_in(path: &Path, set: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| set.iter().any(|s| s == ext))
}

fn relative_target(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn classifier() -> Classifier {
        Classifier::new(&WatchConfig::default())
    }

    #[test]
    fn test_interesting_defaults() {
        let c = classifier();
        assert!(c.is_interesting(Path::new("/s/index.html")));
        assert!(c.is_interesting(Path::new("/s/app.ts")));
        assert!(c.is_interesting(Path::new("/s/css/style.css")));

        assert!(!c.is_interesting(Path::new("/s/style.scss")));
        assert!(!c.is_interesting(Path::new("/s/app.js")));
        assert!(!c.is_interesting(Path::new("/s/Makefile")));
        // exact match only
        assert!(!c.is_interesting(Path::new("/s/INDEX.HTML")));
        assert!(!c.is_interesting(Path::new("/s/page.htm")));
    }

    #[test]
    fn test_transpile_only_ts() {
        let c = classifier();
        assert!(c.needs_transpile(Path::new("app.ts")));
        assert!(!c.needs_transpile(Path::new("style.css")));
        assert!(!c.needs_transpile(Path::new("index.html")));
    }

    #[test]
    fn test_css_change_reloads_everything() {
        let c = classifier();
        let root = Path::new("/site");
        assert_eq!(c.target(Path::new("/site/css/style.css"), root), "*");
        assert_eq!(c.target(Path::new("/site/app.ts"), root), "*");
    }

    #[test]
    fn test_html_change_targets_page() {
        let c = classifier();
        let root = Path::new("/site");
        assert_eq!(c.target(Path::new("/site/page2.html"), root), "page2.html");
        assert_eq!(
            c.target(&PathBuf::from("/site/docs/index.html"), root),
            "docs/index.html"
        );
    }

    #[test]
    fn test_custom_sets() {
        let config = WatchConfig {
            extensions: vec!["html".into(), "js".into()],
            full_reload: vec!["js".into()],
            transpile: Vec::new(),
            ..Default::default()
        };
        let c = Classifier::new(&config);
        assert!(c.is_interesting(Path::new("a.js")));
        assert!(!c.is_interesting(Path::new("a.css")));
        assert!(!c.needs_transpile(Path::new("a.ts")));
        assert_eq!(c.target(Path::new("/r/a.js"), Path::new("/r")), "*");
    }
}
