//! Path manipulation utilities.
//!
//! This module provides utility functions for manipulating file paths, such as
//! rebasing walked paths against the search root for glob filtering.

use std::path::{Path, PathBuf};

/// Rebases a walked path against the search root.
///
/// Glob filters match against paths relative to the search root, the same way
/// the search backend applies its glob flags. This function strips `root` from
/// `path` when it is a prefix; a path outside the root is returned unchanged
/// so a filter can still be applied to it verbatim.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use exfind::paths::relative_to_root;
///
/// let path = Path::new("/data/projects/repo/src/main.rs");
/// let root = Path::new("/data/projects/repo");
/// assert_eq!(relative_to_root(path, root), PathBuf::from("src/main.rs"));
///
/// // A path the root does not contain is passed through as-is.
/// let outside = Path::new("/tmp/scratch.txt");
/// assert_eq!(relative_to_root(outside, root), PathBuf::from("/tmp/scratch.txt"));
/// ```
pub fn relative_to_root<P: AsRef<Path>, Q: AsRef<Path>>(path: P, root: Q) -> PathBuf {
    let path = path.as_ref();

    match path.strip_prefix(root.as_ref()) {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}
