//! `clean` command: wipe the output tree and the fingerprint cache.

use anyhow::{Context, Result};

use crate::config::ProjectConfig;
use crate::log;

pub fn run_clean(config: &ProjectConfig) -> Result<()> {
    let mut removed = 0;
    for dir in [config.output_root(), config.cache_dir()] {
        if !dir.exists() {
            continue;
        }
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("failed to remove {}", dir.display()))?;
        log!("clean"; "removed {}", dir.display());
        removed += 1;
    }

    if removed == 0 {
        log!("clean"; "nothing to remove");
    }
    Ok(())
}
