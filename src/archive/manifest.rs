//! Size manifest: a script-loadable asset consumed by the preview page.
//!
//! Written to the output root as `banner-sizes.js`:
//!
//! ```js
//! window.BANNER_SIZES = {"160x600.zip":10240,"300x250.zip":20480};
//! window.BANNER_SIZES_UPDATED = "2026-08-27T12:00:00Z";
//! ```
//!
//! When no unit archives exist a placeholder with an empty object is still
//! written so the preview page never 404s on the script.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const MANIFEST_FILE: &str = "banner-sizes.js";

/// Write the manifest for every unit archive in the output root.
///
/// Returns the number of archives listed. Entries are sorted by unit name;
/// insertion order is preserved in the serialized object.
pub fn write_manifest(output_root: &Path) -> Result<usize> {
    let mut entries: Vec<(String, u64)> = Vec::new();

    let read = fs::read_dir(output_root)
        .with_context(|| format!("failed to read {}", output_root.display()))?;
    for entry in read.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|e| e == "zip") {
            continue;
        }
        // Unit archives only: the stem must name a sibling unit directory
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !output_root.join(stem).is_dir() {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        entries.push((format!("{stem}.zip"), size));
    }
    entries.sort();

    let mut files = serde_json::Map::new();
    for (name, size) in &entries {
        files.insert(name.clone(), serde_json::Value::from(*size));
    }
    let json = serde_json::Value::Object(files);

    let content = format!(
        "window.BANNER_SIZES = {json};\nwindow.BANNER_SIZES_UPDATED = \"{}\";\n",
        iso_utc_now()
    );

    let dest = output_root.join(MANIFEST_FILE);
    fs::write(&dest, content).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(entries.len())
}

/// Current time as an ISO-8601 UTC timestamp (second precision).
fn iso_utc_now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_iso_utc(secs)
}

fn format_iso_utc(epoch_secs: u64) -> String {
    let days = epoch_secs / 86_400;
    let rem = epoch_secs % 86_400;
    let (year, month, day) = civil_from_days(days as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem / 60) % 60,
        rem % 60
    )
}

/// Days-since-epoch to (year, month, day), Gregorian calendar.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_lists_unit_archives_sorted() {
        let temp = TempDir::new().unwrap();
        for unit in ["300x250", "160x600"] {
            fs::create_dir_all(temp.path().join(unit)).unwrap();
            fs::write(temp.path().join(format!("{unit}.zip")), "zipbytes").unwrap();
        }
        // Not a unit archive (no sibling directory)
        fs::write(temp.path().join("campaign-all-banners.zip"), "x").unwrap();

        let count = write_manifest(temp.path()).unwrap();
        assert_eq!(count, 2);

        let content = fs::read_to_string(temp.path().join(MANIFEST_FILE)).unwrap();
        assert!(content.starts_with("window.BANNER_SIZES = {"));
        assert!(content.contains("\"160x600.zip\":8"));
        assert!(content.contains("\"300x250.zip\":8"));
        assert!(content.contains("window.BANNER_SIZES_UPDATED = \""));
        // Sorted: 160x600 before 300x250
        let a = content.find("160x600").unwrap();
        let b = content.find("300x250").unwrap();
        assert!(a < b);
        assert!(!content.contains("all-banners"));
    }

    #[test]
    fn test_manifest_placeholder_when_empty() {
        let temp = TempDir::new().unwrap();
        let count = write_manifest(temp.path()).unwrap();
        assert_eq!(count, 0);

        let content = fs::read_to_string(temp.path().join(MANIFEST_FILE)).unwrap();
        assert!(content.contains("window.BANNER_SIZES = {};"));
        assert!(content.contains("BANNER_SIZES_UPDATED"));
    }

    #[test]
    fn test_format_iso_utc() {
        assert_eq!(format_iso_utc(0), "1970-01-01T00:00:00Z");
        // 2026-08-27 00:00:00 UTC
        assert_eq!(format_iso_utc(1_787_788_800), "2026-08-27T00:00:00Z");
    }
}
