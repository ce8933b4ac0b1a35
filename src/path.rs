//! Path arithmetic over slash-separated repository paths.
//!
//! Paths are used exactly as the provider returns them: nothing here encodes
//! or decodes segments. The empty string is the repository root.

/// Parent of `path`, or `None` when `path` is already the root
pub fn parent_of(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    match path.rsplit_once('/') {
        Some((parent, _)) => Some(parent),
        None => Some(""),
    }
}

/// Number of segments, which is also the number of ascents needed to reach the root
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split('/').count()
    }
}

/// Every path from the root down to `path`, root first
pub fn ancestors(path: &str) -> Vec<&str> {
    let mut chain = vec![path];
    let mut current = path;
    while let Some(parent) = parent_of(current) {
        chain.push(parent);
        current = parent;
    }
    chain.reverse();
    chain
}
