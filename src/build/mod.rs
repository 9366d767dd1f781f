//! Build steps: full builds, fresh single-unit builds, category rebuilds.

mod assets;
mod compile;
mod listing;

pub use assets::copy_newer;
pub use compile::{MappedSource, banner_vars, compile_file, map_source, resolve_args};
pub use listing::write_listing;

use anyhow::{Context, Result};
use jwalk::WalkDir;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::core::{SourceCategory, has_private_component, is_private_name};
use crate::fingerprint::is_noise;
use crate::logger::BuildProgress;
use crate::{debug, log};

/// Outcome of building one unit.
#[derive(Debug, Default)]
pub struct UnitBuildStats {
    pub compiled: usize,
    pub copied: usize,
    pub errors: Vec<(PathBuf, String)>,
}

/// Non-private unit directory names under the sizes root, sorted.
pub fn list_source_units(config: &ProjectConfig) -> Result<Vec<String>> {
    let root = config.sizes_root();
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("failed to read {}", root.display()))?;

    let mut units: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !is_private_name(name))
        .collect();
    units.sort();
    Ok(units)
}

/// Unit directory names in the output root, sorted.
pub fn list_output_units(config: &ProjectConfig) -> Result<Vec<String>> {
    let root = config.output_root();
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("failed to read {}", root.display()))?;

    let mut units: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect();
    units.sort();
    Ok(units)
}

/// Build one unit from scratch.
///
/// The unit's output directory is removed first - a fresh build must not
/// reuse stale artifacts. Compile errors are collected, not fatal, so one
/// broken template cannot sink the rest of the unit.
pub fn build_unit(config: &ProjectConfig, unit: &str) -> Result<UnitBuildStats> {
    let source_dir = config.sizes_root().join(unit);
    let output_dir = config.output_root().join(unit);

    if output_dir.exists() {
        std::fs::remove_dir_all(&output_dir)
            .with_context(|| format!("failed to clear {}", output_dir.display()))?;
    }
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut stats = UnitBuildStats::default();

    for entry in WalkDir::new(&source_dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() || is_noise(&entry.file_name().to_string_lossy()) {
            continue;
        }
        build_one_file(config, &path, &mut stats);
    }

    Ok(stats)
}

/// Route a single source file through compile or copy-newer.
fn build_one_file(config: &ProjectConfig, path: &Path, stats: &mut UnitBuildStats) {
    let Some(category) = config.category_for(path) else {
        debug!("build"; "skipping uncategorized file: {}", path.display());
        return;
    };

    if category.is_compiled() {
        // Partials and private includes never produce output on their own
        if has_private_component(path, config.sizes_root()) {
            return;
        }
        match compile_file(config, category, path) {
            Ok(_) => stats.compiled += 1,
            Err(e) => stats.errors.push((path.to_path_buf(), format!("{e:#}"))),
        }
        return;
    }

    let Some(mapped) = map_source(config, path) else {
        return;
    };
    match copy_newer(path, &mapped.output) {
        Ok(copied) => {
            if copied {
                stats.copied += 1;
            }
        }
        Err(e) => stats.errors.push((path.to_path_buf(), format!("{e:#}"))),
    }
}

/// Copy shared global images and scripts into the output root.
///
/// Banners reference shared assets relative to the build root, so
/// `src/global/img/logo.png` lands at `build/img/logo.png`. Templates and
/// styles under the global root are compile inputs, not outputs, and are
/// never copied here.
pub fn copy_global_assets(
    config: &ProjectConfig,
    only: Option<SourceCategory>,
) -> Result<usize> {
    let root = config.global_root();
    if !root.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(root)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file()
            || is_noise(&entry.file_name().to_string_lossy())
            || has_private_component(&path, root)
        {
            continue;
        }
        let Some(category) = config.category_for(&path) else {
            continue;
        };
        if category.is_compiled() || only.is_some_and(|c| c != category) {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        if copy_newer(&path, &config.output_root().join(rel))? {
            copied += 1;
        }
    }
    Ok(copied)
}

/// Recompile or recopy every file of one category across all units.
///
/// Used when a shared global file changes: the per-file dependency is not
/// tracked, so the whole category is refreshed. Asset categories also
/// refresh the shared global copies in the output root.
pub fn rebuild_category(config: &ProjectConfig, category: SourceCategory) -> Result<usize> {
    let units = list_source_units(config)?;
    let mut rebuilt = 0;

    for unit in &units {
        let source_dir = config.sizes_root().join(unit);
        for entry in WalkDir::new(&source_dir)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !entry.file_type().is_file() || config.category_for(&path) != Some(category) {
                continue;
            }
            if category.is_compiled() {
                if has_private_component(&path, config.sizes_root()) {
                    continue;
                }
                match compile_file(config, category, &path) {
                    Ok(_) => rebuilt += 1,
                    Err(e) => log!("build"; "{:#}", e),
                }
            } else if let Some(mapped) = map_source(config, &path)
                && copy_newer(&path, &mapped.output).unwrap_or(false)
            {
                rebuilt += 1;
            }
        }
    }

    if !category.is_compiled() {
        rebuilt += copy_global_assets(config, Some(category))?;
    }

    Ok(rebuilt)
}

/// Full build: every non-private unit fresh, plus the listing page.
pub fn full_build(config: &ProjectConfig) -> Result<()> {
    if config.build.clean && config.output_root().exists() {
        std::fs::remove_dir_all(config.output_root())
            .with_context(|| format!("failed to clean {}", config.output_root().display()))?;
    }
    std::fs::create_dir_all(config.output_root())?;

    let units = list_source_units(config)?;
    let progress = BuildProgress::new(units.len());

    let mut compiled = 0;
    let mut copied = 0;
    let mut errors = Vec::new();
    for unit in &units {
        let stats = build_unit(config, unit)?;
        compiled += stats.compiled;
        copied += stats.copied;
        errors.extend(stats.errors);
        progress.tick();
    }
    progress.finish();

    copied += copy_global_assets(config, None)?;

    write_listing(config.output_root(), &config.project_name(), &units)?;

    if errors.is_empty() {
        log!("build"; "{} units, {} compiled, {} copied", units.len(), compiled, copied);
    } else {
        for (path, error) in &errors {
            log!("error"; "{}: {}", path.display(), error);
        }
        log!("build"; "{} units, {} errors", units.len(), errors.len());
    }

    Ok(())
}

/// Delete a unit's output directory and archive. Best-effort: absence is
/// not an error.
pub fn remove_unit_output(config: &ProjectConfig, unit: &str) {
    let dir = config.output_root().join(unit);
    if dir.exists()
        && let Err(e) = std::fs::remove_dir_all(&dir)
    {
        log!("watch"; "failed to remove {}: {}", dir.display(), e);
    }

    let archive = crate::archive::archive_path_for(config.output_root(), unit);
    if archive.exists()
        && let Err(e) = std::fs::remove_file(&archive)
    {
        log!("watch"; "failed to remove {}: {}", archive.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use std::fs;
    use tempfile::TempDir;

    fn make_config() -> (TempDir, ProjectConfig) {
        let temp = TempDir::new().unwrap();
        let root = crate::utils::path::normalize_path(temp.path());

        let mut config = ProjectConfig::default();
        config.root = root.clone();
        config.config_path = root.join("bannerkit.toml");
        config.paths.normalize(&root);

        fs::create_dir_all(config.sizes_root()).unwrap();
        fs::create_dir_all(config.global_root()).unwrap();
        fs::create_dir_all(config.output_root()).unwrap();
        (temp, config)
    }

    fn seed_unit(config: &ProjectConfig, unit: &str) {
        let dir = config.sizes_root().join(unit);
        fs::create_dir_all(dir.join("img")).unwrap();
        fs::write(dir.join("index.hbs"), "<html></html>").unwrap();
        fs::write(dir.join("main.scss"), "body{}").unwrap();
        fs::write(dir.join("img/logo.png"), "png").unwrap();
        fs::write(dir.join("_partial.hbs"), "partial").unwrap();
    }

    #[test]
    fn test_list_source_units_skips_private() {
        let (_temp, config) = make_config();
        for name in ["300x250", "160x600", "_wip"] {
            fs::create_dir_all(config.sizes_root().join(name)).unwrap();
        }
        fs::write(config.sizes_root().join("notes.txt"), "x").unwrap();

        let units = list_source_units(&config).unwrap();
        assert_eq!(units, vec!["160x600", "300x250"]);
    }

    #[test]
    fn test_build_unit_fresh() {
        let (_temp, config) = make_config();
        seed_unit(&config, "300x250");

        // Stale artifact from a previous build must disappear
        let out = config.output_root().join("300x250");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.html"), "old").unwrap();

        let stats = build_unit(&config, "300x250").unwrap();
        assert_eq!(stats.compiled, 2); // index.hbs + main.scss
        assert_eq!(stats.copied, 1); // logo.png
        assert!(stats.errors.is_empty());

        assert!(out.join("index.html").is_file());
        assert!(out.join("main.css").is_file());
        assert!(out.join("img/logo.png").is_file());
        assert!(!out.join("stale.html").exists());
        // Private partial produced no output
        assert!(!out.join("_partial.html").exists());
    }

    #[test]
    fn test_full_build_writes_listing() {
        let (_temp, config) = make_config();
        seed_unit(&config, "300x250");
        seed_unit(&config, "160x600");

        full_build(&config).unwrap();

        let listing = fs::read_to_string(config.output_root().join("index.html")).unwrap();
        assert!(listing.contains("300x250"));
        assert!(listing.contains("160x600"));
    }

    #[test]
    fn test_full_build_copies_global_assets() {
        let (_temp, config) = make_config();
        seed_unit(&config, "300x250");
        let global = config.global_root();
        fs::create_dir_all(global.join("img")).unwrap();
        fs::create_dir_all(global.join("plugins")).unwrap();
        fs::create_dir_all(global.join("_drafts")).unwrap();
        fs::write(global.join("img/shared.png"), "png").unwrap();
        fs::write(global.join("plugins/helper.js"), "js").unwrap();
        fs::write(global.join("_drafts/wip.png"), "png").unwrap();
        // Compile inputs stay inputs
        fs::write(global.join("reset.scss"), "body{}").unwrap();

        full_build(&config).unwrap();

        assert!(config.output_root().join("img/shared.png").is_file());
        assert!(config.output_root().join("plugins/helper.js").is_file());
        assert!(!config.output_root().join("_drafts/wip.png").exists());
        assert!(!config.output_root().join("reset.scss").exists());
    }

    #[test]
    fn test_rebuild_category_refreshes_global_assets() {
        let (_temp, config) = make_config();
        fs::create_dir_all(config.global_root().join("img")).unwrap();
        fs::write(config.global_root().join("img/shared.png"), "png").unwrap();

        let rebuilt = rebuild_category(&config, SourceCategory::Image).unwrap();
        assert_eq!(rebuilt, 1);
        assert!(config.output_root().join("img/shared.png").is_file());

        // Scripts category leaves images alone
        let rebuilt = rebuild_category(&config, SourceCategory::Script).unwrap();
        assert_eq!(rebuilt, 0);
    }

    #[test]
    fn test_rebuild_category_styles_only() {
        let (_temp, config) = make_config();
        seed_unit(&config, "300x250");
        build_unit(&config, "300x250").unwrap();

        fs::remove_file(config.output_root().join("300x250/main.css")).unwrap();
        let rebuilt = rebuild_category(&config, SourceCategory::Style).unwrap();
        assert_eq!(rebuilt, 1);
        assert!(config.output_root().join("300x250/main.css").is_file());
    }

    #[test]
    fn test_remove_unit_output() {
        let (_temp, config) = make_config();
        let out = config.output_root().join("u");
        fs::create_dir_all(&out).unwrap();
        fs::write(config.output_root().join("u.zip"), "zip").unwrap();

        remove_unit_output(&config, "u");
        assert!(!out.exists());
        assert!(!config.output_root().join("u.zip").exists());

        // Absent unit: no panic, no error
        remove_unit_output(&config, "ghost");
    }
}
