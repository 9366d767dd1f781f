//! `zip` command: one archive pass over the built units.

use anyhow::{Context, Result, bail};

use crate::archive::{ArchiveCache, archive_path_for, archive_unit, write_manifest};
use crate::build;
use crate::config::ProjectConfig;
use crate::log;

/// Archive changed units (all with `force`) and refresh the size manifest.
pub fn run_zip(config: &ProjectConfig, force: bool) -> Result<()> {
    if !config.output_root().is_dir() {
        bail!(
            "output directory {} does not exist, run `bannerkit build` first",
            config.output_root().display()
        );
    }

    let units = build::list_source_units(config)?;
    let cache = ArchiveCache::new(config.cache_dir());

    let mut archived = 0;
    let mut skipped = 0;
    for unit in &units {
        let unit_dir = config.output_root().join(unit);
        if !unit_dir.is_dir() {
            log!("zip"; "{} has no build output, skipping", unit);
            continue;
        }

        let archive_path = archive_path_for(config.output_root(), unit);
        // should_archive also records the current fingerprint
        let due = cache.should_archive(unit, &unit_dir, &archive_path);
        if !due && !force {
            skipped += 1;
            continue;
        }

        let bytes = archive_unit(&unit_dir, &archive_path)
            .with_context(|| format!("failed to archive {unit}"))?;
        log!("zip"; "{}.zip ({:.1} KB)", unit, bytes as f64 / 1024.0);
        archived += 1;
    }

    write_manifest(config.output_root())?;

    if archived == 0 {
        log!("zip"; "all {} archive(s) up to date", skipped);
    } else {
        log!("zip"; "{} archived, {} unchanged", archived, skipped);
    }
    Ok(())
}
