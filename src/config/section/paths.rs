//! `[paths]` section configuration.
//!
//! All paths are relative to the project root and normalized to absolute
//! form after loading.
//!
//! ```toml
//! [paths]
//! sources = "src"
//! sizes = "src/sizes"
//! global = "src/global"
//! output = "build"
//! cache = ".cache/zips"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

/// Project directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of all watched sources.
    pub sources: PathBuf,

    /// Per-unit size directories (one directory per banner size).
    pub sizes: PathBuf,

    /// Shared templates/styles plus shared assets copied into the output
    /// root.
    pub global: PathBuf,

    /// Output tree. Owned exclusively by bannerkit.
    pub output: PathBuf,

    /// Fingerprint store directory (outside the output tree so it
    /// survives output deletion).
    pub cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: PathBuf::from("src"),
            sizes: PathBuf::from("src/sizes"),
            global: PathBuf::from("src/global"),
            output: PathBuf::from("build"),
            cache: PathBuf::from(".cache/zips"),
        }
    }
}

impl PathsConfig {
    /// Normalize all paths to absolute form under `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.sources = normalize_path(&root.join(&self.sources));
        self.sizes = normalize_path(&root.join(&self.sizes));
        self.global = normalize_path(&root.join(&self.global));
        self.output = normalize_path(&root.join(&self.output));
        self.cache = normalize_path(&root.join(&self.cache));
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.sources, PathBuf::from("src"));
        assert_eq!(config.paths.sizes, PathBuf::from("src/sizes"));
        assert_eq!(config.paths.output, PathBuf::from("build"));
        assert_eq!(config.paths.cache, PathBuf::from(".cache/zips"));
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\noutput = \"dist\"\ncache = \".fingerprints\"");
        assert_eq!(config.paths.output, PathBuf::from("dist"));
        assert_eq!(config.paths.cache, PathBuf::from(".fingerprints"));
        // untouched fields keep defaults
        assert_eq!(config.paths.sizes, PathBuf::from("src/sizes"));
    }
}
