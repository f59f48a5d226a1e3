//! Lexical path normalization (no filesystem access).

use std::path::{Component, Path, PathBuf};

/// Removes `.` components and resolves `..` against preceding components.
///
/// Symlinks are not followed; `..` at the root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !path.is_absolute() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
