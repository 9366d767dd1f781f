//! Path normalization and metadata helpers.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Modification time as milliseconds since the Unix epoch.
///
/// Returns 0 when the metadata is unavailable so digests stay total.
pub fn mtime_millis(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Render a path relative to `base` with forward slashes.
///
/// Used for digest input and archive entry names, which must be
/// platform-independent.
pub fn relative_slash(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_relative_slash() {
        let base = Path::new("/project/src/sizes");
        let path = Path::new("/project/src/sizes/300x250/css/main.css");
        assert_eq!(
            relative_slash(path, base).as_deref(),
            Some("300x250/css/main.css")
        );
    }

    #[test]
    fn test_relative_slash_outside_base() {
        let base = Path::new("/project/src/sizes");
        let path = Path::new("/elsewhere/file.txt");
        assert!(relative_slash(path, base).is_none());
    }

    #[test]
    fn test_mtime_millis_missing_file() {
        assert_eq!(mtime_millis(Path::new("/nonexistent/file")), 0);
    }
}
