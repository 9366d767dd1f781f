//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under the serve root.
///
/// Directories resolve to their `index.html`. Canonicalization guards
/// against traversal through symlinks or encoded sequences.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Strip query string and surrounding slashes.
fn normalize_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_file_and_dir_index() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("300x250")).unwrap();
        fs::write(root.join("300x250/index.html"), "x").unwrap();
        fs::write(root.join("300x250/main.css"), "x").unwrap();

        let resolved = resolve_path("/300x250/main.css", root).unwrap();
        assert!(resolved.ends_with("300x250/main.css"));

        let index = resolve_path("/300x250/", root).unwrap();
        assert!(index.ends_with("300x250/index.html"));

        let index = resolve_path("/300x250?v=2", root).unwrap();
        assert!(index.ends_with("300x250/index.html"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("out");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp.path().join("secret.txt"), "x").unwrap();

        assert!(resolve_path("/../secret.txt", &root).is_none());
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(resolve_path("/nope.html", temp.path()).is_none());
    }
}
