//! Copy-newer step for images and scripts.

use anyhow::{Context, Result};
use std::path::Path;

use crate::utils::path::mtime_millis;

/// Copy `source` to `dest` when the destination is missing or older.
///
/// Returns true when a copy happened. Equal mtimes count as up to date.
pub fn copy_newer(source: &Path, dest: &Path) -> Result<bool> {
    if dest.exists() && mtime_millis(source) <= mtime_millis(dest) {
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::copy(source, dest).with_context(|| {
        format!("failed to copy {} -> {}", source.display(), dest.display())
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_copy_newer_copies_missing_dest() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.png");
        let dest = temp.path().join("out/a.png");
        fs::write(&src, "bytes").unwrap();

        assert!(copy_newer(&src, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"bytes");
    }

    #[test]
    fn test_copy_newer_skips_up_to_date_dest() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.js");
        let dest = temp.path().join("b.js");
        fs::write(&src, "x").unwrap();
        fs::write(&dest, "x").unwrap();

        // Destination strictly newer than source
        let newer = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(&dest)
            .unwrap()
            .set_modified(newer)
            .unwrap();

        assert!(!copy_newer(&src, &dest).unwrap());
    }

    #[test]
    fn test_copy_newer_overwrites_stale_dest() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.js");
        let dest = temp.path().join("b.js");
        fs::write(&dest, "old").unwrap();
        fs::write(&src, "new").unwrap();

        let newer = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(newer)
            .unwrap();

        assert!(copy_newer(&src, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }
}
