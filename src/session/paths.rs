//! Source file path classification and directory listing.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::SessionConfig;

/// Return `true` if `path` names a loon source file the session should track.
///
/// The path must be absolute, carry the configured extension, not sit below a dot-prefixed
/// directory (when so configured), and not itself be a directory.
pub fn is_source_file_path(path: &Path, config: &SessionConfig) -> bool {
    path.is_absolute()
        && path.extension().is_some_and(|ext| ext == config.source_extension.as_str())
        && !(config.exclude_dot_dirs && is_under_dot_dir(path))
        && !path.is_dir()
}

fn is_under_dot_dir(path: &Path) -> bool {
    path.parent().is_some_and(|dir| {
        dir.components().any(|component| match component {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        })
    })
}

pub(crate) fn is_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

pub(crate) fn is_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_dir())
}

/// Files (not subdirectories) directly inside `dir`, sorted. An unreadable directory lists as empty.
pub(crate) fn dir_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_file(path))
        .collect();
    files.sort();
    files
}
