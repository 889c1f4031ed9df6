//! path helpers
use std::path::{Component, Path, PathBuf};

/// Directory containing `path`, `.` for a bare file name
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Lexically normalize `path`: drop `.` components and fold `..` into their parent
///
/// Does not touch the file system, symlinks are not resolved.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folded = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if folded {
                    normalized.pop();
                } else if !matches!(
                    normalized.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Render a path the way it is stored inside documents
pub(crate) fn to_document_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
