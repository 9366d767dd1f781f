//! Persistent fingerprint store: one hex-digest file per unit.
//!
//! Lives outside the output tree so a rebuilt-but-unchanged unit is still
//! recognized as unchanged after the output tree was deleted. Entries are
//! overwritten on change and never deleted; stale entries for removed
//! units are harmless.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fingerprint::TreeDigest;

pub struct FingerprintStore {
    dir: PathBuf,
}

impl FingerprintStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn entry_path(&self, unit: &str) -> PathBuf {
        self.dir.join(format!("{unit}.hash"))
    }

    /// Last recorded digest for a unit, if any.
    ///
    /// An unreadable or corrupt entry reads as absent, which only means one
    /// extra archive pass.
    pub fn load(&self, unit: &str) -> Option<TreeDigest> {
        let content = fs::read_to_string(self.entry_path(unit)).ok()?;
        TreeDigest::from_hex(&content)
    }

    /// Record a digest for a unit, creating the store directory on first use.
    pub fn save(&self, unit: &str, digest: TreeDigest) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create cache dir {}", self.dir.display()))?;
        let path = self.entry_path(unit);
        fs::write(&path, digest.to_hex())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FingerprintStore::new(&dir.path().join("zips"));

        assert!(store.load("300x250").is_none());

        let digest = TreeDigest::new([0x5a; 32]);
        store.save("300x250", digest).unwrap();
        assert_eq!(store.load("300x250"), Some(digest));

        // Overwrite
        let other = TreeDigest::new([0x07; 32]);
        store.save("300x250", other).unwrap();
        assert_eq!(store.load("300x250"), Some(other));
    }

    #[test]
    fn test_store_units_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = FingerprintStore::new(dir.path());

        store.save("a", TreeDigest::new([1; 32])).unwrap();
        assert!(store.load("b").is_none());
        assert!(store.load("a").is_some());
    }

    #[test]
    fn test_store_corrupt_entry_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = FingerprintStore::new(dir.path());
        std::fs::write(dir.path().join("bad.hash"), "garbage").unwrap();
        assert!(store.load("bad").is_none());
    }
}
