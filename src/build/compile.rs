//! Single-file compile step and source→output path mapping.
//!
//! Templates and styles run through an external command configured per
//! kind, with `$BANNER_*` variables resolved in the arguments and exported
//! to the environment. Without a command the source is copied with the
//! output extension applied.

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ProjectConfig;
use crate::core::SourceCategory;

/// Where a source file lives inside the sizes tree and where its output
/// goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSource {
    /// Unit directory name (first path component under the sizes root).
    pub unit: String,
    /// Absolute output path under the output root.
    pub output: PathBuf,
}

/// Map a source file under the sizes root to its output location.
///
/// `src/sizes/<unit>/rel` → `build/<unit>/rel`, with the extension
/// rewritten for compiled categories (`index.hbs` → `index.html`).
/// Returns None for paths outside the sizes tree or directly at its root.
pub fn map_source(config: &ProjectConfig, source: &Path) -> Option<MappedSource> {
    let rel = source.strip_prefix(config.sizes_root()).ok()?;
    let mut components = rel.components();
    let unit = components.next()?.as_os_str().to_str()?.to_string();
    let inside: PathBuf = components.collect();
    if inside.as_os_str().is_empty() {
        return None;
    }

    let mut output = config.output_root().join(&unit).join(&inside);
    if let Some(category) = config.category_for(source)
        && let Some(kind) = config.compile_kind(category)
        && !kind.output_ext.is_empty()
    {
        output.set_extension(&kind.output_ext);
    }

    Some(MappedSource { unit, output })
}

/// Build `$BANNER_*` variables for compile command execution.
pub fn banner_vars(
    config: &ProjectConfig,
    source: &Path,
    output: &Path,
    unit: &str,
) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert(
        "BANNER_ROOT".into(),
        config.get_root().display().to_string(),
    );
    vars.insert("BANNER_SOURCE".into(), source.display().to_string());
    vars.insert("BANNER_OUTPUT".into(), output.display().to_string());
    vars.insert("BANNER_UNIT".into(), unit.to_string());
    vars
}

/// Resolve `$BANNER_*` variables in command arguments.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                let pattern = format!("${}", key);
                result = result.replace(&pattern, value);
            }
            result
        })
        .collect()
}

/// Compile one template or style file into its mapped output.
///
/// Returns the output path on success. The compile command's non-zero exit
/// is an error with its stderr attached; the caller decides whether that
/// is fatal (watch mode: it is not).
pub fn compile_file(
    config: &ProjectConfig,
    category: SourceCategory,
    source: &Path,
) -> Result<PathBuf> {
    let mapped = map_source(config, source)
        .with_context(|| format!("{} is not inside the sizes tree", source.display()))?;
    let kind = config
        .compile_kind(category)
        .with_context(|| format!("{} is not a compiled category", category.label()))?;

    if let Some(parent) = mapped.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    if kind.command.is_empty() {
        std::fs::copy(source, &mapped.output).with_context(|| {
            format!(
                "failed to copy {} -> {}",
                source.display(),
                mapped.output.display()
            )
        })?;
        return Ok(mapped.output);
    }

    let vars = banner_vars(config, source, &mapped.output, &mapped.unit);
    let resolved = resolve_args(&kind.command, &vars);

    let output = Command::new(&resolved[0])
        .args(&resolved[1..])
        .current_dir(config.get_root())
        .envs(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .output()
        .with_context(|| format!("failed to run `{}`", resolved[0]))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} compile failed for {}:\n{}",
            category.label(),
            source.display(),
            stderr.trim()
        );
    }

    Ok(mapped.output)
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
        fs::create_dir_all(config.output_root()).unwrap();
        (temp, config)
    }

    #[test]
    fn test_map_source_template_extension_rewrite() {
        let (_temp, config) = make_config();
        let source = config.sizes_root().join("300x250/index.hbs");
        let mapped = map_source(&config, &source).unwrap();
        assert_eq!(mapped.unit, "300x250");
        assert_eq!(mapped.output, config.output_root().join("300x250/index.html"));
    }

    #[test]
    fn test_map_source_asset_keeps_extension() {
        let (_temp, config) = make_config();
        let source = config.sizes_root().join("300x250/img/logo.png");
        let mapped = map_source(&config, &source).unwrap();
        assert_eq!(
            mapped.output,
            config.output_root().join("300x250/img/logo.png")
        );
    }

    #[test]
    fn test_map_source_outside_sizes() {
        let (_temp, config) = make_config();
        assert!(map_source(&config, Path::new("/elsewhere/x.hbs")).is_none());
        // Direct child of the sizes root is a unit dir, not a mappable file
        assert!(map_source(&config, &config.sizes_root().join("300x250")).is_none());
    }

    #[test]
    fn test_resolve_args() {
        let mut vars = FxHashMap::default();
        vars.insert("BANNER_SOURCE".to_string(), "/a/in.scss".to_string());
        vars.insert("BANNER_OUTPUT".to_string(), "/b/out.css".to_string());

        let args = vec![
            "sass".to_string(),
            "$BANNER_SOURCE".to_string(),
            "$BANNER_OUTPUT".to_string(),
        ];
        assert_eq!(
            resolve_args(&args, &vars),
            vec!["sass", "/a/in.scss", "/b/out.css"]
        );
    }

    #[test]
    fn test_compile_file_copy_fallback() {
        let (_temp, config) = make_config();
        let source = config.sizes_root().join("300x250/index.hbs");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "<div></div>").unwrap();

        let output = compile_file(&config, SourceCategory::Template, &source).unwrap();
        assert_eq!(output, config.output_root().join("300x250/index.html"));
        assert_eq!(fs::read_to_string(output).unwrap(), "<div></div>");
    }

    #[test]
    fn test_compile_file_command_failure_is_error() {
        let (_temp, mut config) = make_config();
        config.build.styles.command = vec!["false".to_string()];

        let source = config.sizes_root().join("u/main.scss");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "body {}").unwrap();

        assert!(compile_file(&config, SourceCategory::Style, &source).is_err());
    }
}
