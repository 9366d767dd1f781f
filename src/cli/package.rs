//! `package` command: the two aggregate deliverable archives.

use anyhow::Result;

use crate::archive::{package_all_banners, package_whole};
use crate::config::ProjectConfig;
use crate::log;

/// Build the all-banners and whole-package archives.
///
/// Runs a regular zip pass first so every unit archive is current before
/// being bundled.
pub fn run_package(config: &ProjectConfig) -> Result<()> {
    super::zip::run_zip(config, false)?;

    let project = config.project_name();
    for path in [
        package_all_banners(config.output_root(), &project)?,
        package_whole(config.output_root(), &project)?,
    ] {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        log!("pack"; "{} ({:.1} KB)", name, size as f64 / 1024.0);
    }
    Ok(())
}
