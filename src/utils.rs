//! Common utility functions shared across the codebase.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Render a source path for a location comment.
///
/// The path is made relative to `base_dir` when it lies underneath it, and
/// always uses `/` as separator so POT files are identical across platforms.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use i18nextract::utils::label_path;
///
/// let base = Path::new("/path/to/base");
/// assert_eq!(label_path(Path::new("/path/to/base/relpath/to/file"), Some(base)), "relpath/to/file");
/// assert_eq!(
///     label_path(Path::new("/path/to/somewhere/else/file"), Some(base)),
///     "/path/to/somewhere/else/file"
/// );
/// ```
pub fn label_path(path: &Path, base_dir: Option<&Path>) -> String {
    let relative = base_dir
        .and_then(|base| path.strip_prefix(base).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path);

    let mut label = String::new();
    for component in relative.components() {
        match component {
            Component::RootDir => label.push('/'),
            Component::CurDir => continue,
            Component::Prefix(prefix) => label.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::ParentDir | Component::Normal(_) => {
                if !label.is_empty() && !label.ends_with('/') {
                    label.push('/');
                }
                label.push_str(&component.as_os_str().to_string_lossy());
            }
        }
    }
    label
}

/// Absolute, symlink-free form of `path` so prefixes compare reliably.
///
/// Falls back to joining the working directory when `path` does not exist.
pub fn absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Build an index of line start byte offsets for O(log n) line lookups.
///
/// Line 1 starts at offset 0, line 2 starts after the first '\n', etc.
pub fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Find the 1-based line number for a byte offset using binary search.
pub fn offset_to_line(line_index: &[usize], offset: usize) -> usize {
    match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
