//! Request path to filesystem resolution.
//!
//! The path is joined under the content root as-is: no percent-decoding
//! and no `..` filtering. The server trusts its single local user.

use std::fs;
use std::path::{Path, PathBuf};

/// File served for an empty path and for directory requests.
pub const INDEX_FILE: &str = "index.html";

/// Outcome of resolving a request path against the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A regular file to serve.
    Found(PathBuf),
    /// A directory requested without trailing slash; value is the `Location`.
    Redirect(String),
    NotFound,
}

/// Resolve a request path (leading slashes already stripped).
///
/// Total over filesystem state at call time. The file may still vanish
/// before it is read; the caller turns that into a 500.
pub fn resolve_path(request_path: &str, root: &Path) -> Resolved {
    let relative = if request_path.is_empty() {
        INDEX_FILE
    } else {
        request_path
    };

    let local = root.join(relative);

    // Follows symlinks: a link to a regular file is served like the file
    let Ok(meta) = fs::metadata(&local) else {
        return Resolved::NotFound;
    };

    if meta.is_file() {
        return Resolved::Found(local);
    }

    // Devices, sockets, FIFOs...
    if !meta.is_dir() {
        return Resolved::NotFound;
    }

    if !relative.ends_with('/') {
        return Resolved::Redirect(format!("{relative}/"));
    }

    let index = local.join(INDEX_FILE);
    if index.is_file() {
        Resolved::Found(index)
    } else {
        Resolved::NotFound
    }
}
