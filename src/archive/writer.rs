//! Zip archive writing: per-unit archives and aggregate packages.

use anyhow::{Context, Result};
use jwalk::WalkDir;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::fingerprint::is_noise;
use crate::utils::path::relative_slash;

/// Location of a unit's archive: next to the unit directory in the output
/// root, named `<unit>.zip`.
pub fn archive_path_for(output_root: &Path, unit: &str) -> PathBuf {
    output_root.join(format!("{unit}.zip"))
}

fn deflate() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Write one unit directory into its archive file.
///
/// Walk order is lexically sorted; noise entries are excluded. Returns the
/// archive size in bytes.
pub fn archive_unit(unit_dir: &Path, archive_path: &Path) -> Result<u64> {
    let file = File::create(archive_path)
        .with_context(|| format!("failed to create {}", archive_path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = deflate();

    for entry in WalkDir::new(unit_dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        let Some(rel) = relative_slash(&path, unit_dir) else {
            continue;
        };
        if is_noise(&entry.file_name().to_string_lossy()) {
            continue;
        }

        if entry.file_type().is_dir() {
            writer.add_directory(rel, options)?;
        } else {
            writer.start_file(rel, options)?;
            let mut source = File::open(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            io::copy(&mut source, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(std::fs::metadata(archive_path).map(|m| m.len()).unwrap_or(0))
}

/// Aggregate archive of every per-unit archive: `<project>-all-banners.zip`.
///
/// Unit zips are stored uncompressed; they are already deflated.
pub fn package_all_banners(output_root: &Path, project: &str) -> Result<PathBuf> {
    let dest = output_root.join(format!("{project}-all-banners.zip"));
    let file = File::create(&dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut zips = unit_archives(output_root)?;
    zips.sort();

    for path in zips {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.start_file(name, options)?;
        let mut source = File::open(&path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(dest)
}

/// Aggregate archive of the entire output tree: `<project>-whole-package.zip`.
///
/// The aggregate archives themselves are excluded to keep the package from
/// nesting its own previous versions.
pub fn package_whole(output_root: &Path, project: &str) -> Result<PathBuf> {
    let dest = output_root.join(format!("{project}-whole-package.zip"));
    let skip = [
        format!("{project}-all-banners.zip"),
        format!("{project}-whole-package.zip"),
    ];

    let file = File::create(&dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = deflate();

    for entry in WalkDir::new(output_root)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        let Some(rel) = relative_slash(&path, output_root) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();
        if skip.iter().any(|s| *s == name) || name == ".DS_Store" || name == "Thumbs.db" {
            continue;
        }

        if entry.file_type().is_dir() {
            writer.add_directory(rel, options)?;
        } else {
            writer.start_file(rel, options)?;
            let mut source = File::open(&path)?;
            io::copy(&mut source, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(dest)
}

/// Archives belonging to unit directories: `<name>.zip` with a sibling
/// directory `<name>` in the output root.
fn unit_archives(output_root: &Path) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    let entries = std::fs::read_dir(output_root)
        .with_context(|| format!("failed to read {}", output_root.display()))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "zip")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            && output_root.join(stem).is_dir()
        {
            result.push(path);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn make_unit(root: &Path, unit: &str) {
        let dir = root.join(unit);
        fs::create_dir_all(dir.join("css")).unwrap();
        fs::write(dir.join("index.html"), "<html></html>").unwrap();
        fs::write(dir.join("css/main.css"), "body{}").unwrap();
    }

    #[test]
    fn test_archive_unit_contents() {
        let temp = TempDir::new().unwrap();
        make_unit(temp.path(), "300x250");
        // Noise must not land in the archive
        fs::write(temp.path().join("300x250/.DS_Store"), "junk").unwrap();

        let archive = archive_path_for(temp.path(), "300x250");
        let bytes = archive_unit(&temp.path().join("300x250"), &archive).unwrap();
        assert!(bytes > 0);

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "index.html"));
        assert!(names.iter().any(|n| n == "css/main.css"));
        assert!(!names.iter().any(|n| n.contains(".DS_Store")));
    }

    #[test]
    fn test_package_all_banners() {
        let temp = TempDir::new().unwrap();
        for unit in ["160x600", "300x250"] {
            make_unit(temp.path(), unit);
            let archive = archive_path_for(temp.path(), unit);
            archive_unit(&temp.path().join(unit), &archive).unwrap();
        }
        // A stray zip with no sibling dir is not a unit archive
        fs::write(temp.path().join("stray.zip"), "x").unwrap();

        let dest = package_all_banners(temp.path(), "campaign").unwrap();
        assert_eq!(
            dest.file_name().unwrap().to_str().unwrap(),
            "campaign-all-banners.zip"
        );

        let mut zip = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["160x600.zip", "300x250.zip"]);
    }

    #[test]
    fn test_package_whole_excludes_aggregates() {
        let temp = TempDir::new().unwrap();
        make_unit(temp.path(), "300x250");
        let _ = package_all_banners(temp.path(), "campaign").unwrap();

        let dest = package_whole(temp.path(), "campaign").unwrap();
        let mut zip = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "300x250/index.html"));
        assert!(!names.iter().any(|n| n.contains("all-banners")));
        assert!(!names.iter().any(|n| n.contains("whole-package")));
    }
}
