//! Project configuration management for `bannerkit.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                         |
//! |--------------|-------------------------------------------------|
//! | `[project]`  | Project metadata (name)                         |
//! | `[paths]`    | Directory layout (sources, sizes, output, ...)  |
//! | `[build]`    | Per-kind compile settings, skip_initial         |
//! | `[watch]`    | Debounce timings, auto_zip flag                 |
//! | `[serve]`    | Development server (port, interface, watch)     |
//! | `[upload]`   | Remote push settings                            |

pub mod section;

pub use section::{
    AssetKindConfig, BuildSectionConfig, CompileKindConfig, PathsConfig, ProjectInfoConfig,
    ServeConfig, UploadConfig, UploadTool, WatchConfig,
};

use crate::{
    cli::{Cli, Commands},
    core::SourceCategory,
    log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing bannerkit.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Project metadata
    #[serde(default)]
    pub project: ProjectInfoConfig,

    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Watch loop timings and flags
    #[serde(default)]
    pub watch: WatchConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Remote upload settings
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            cli: None,
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            project: ProjectInfoConfig::default(),
            paths: PathsConfig::default(),
            build: BuildSectionConfig::default(),
            watch: WatchConfig::default(),
            serve: ServeConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root
    /// is the config file's parent directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let (config_path, exists) = Self::resolve_config_path(cli)?;

        if !exists {
            log!(
                "error";
                "config file '{}' not found (searched upward from the current directory)",
                cli.config.display()
            );
            std::process::exit(1);
        }

        let mut config = Self::from_path(&config_path)?;

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli);

        Ok(config)
    }

    /// Resolve config file path by searching upward from cwd.
    fn resolve_config_path(cli: &Cli) -> Result<(PathBuf, bool)> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        match find_config_file(&cli.config) {
            Some(path) => Ok((path, true)),
            None => Ok((cwd.join(&cli.config), false)),
        }
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let root = crate::utils::path::normalize_path(&root);

        self.config_path = crate::utils::path::normalize_path(&self.config_path);
        self.root = root.clone();
        self.paths.normalize(&root);
        self.apply_command_options(cli);
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
            if !Self::prompt_continue()? {
                bail!("Aborted due to unknown config fields");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {}", field);
        }
        eprintln!();
    }

    /// Prompt user to continue. Returns true only if user explicitly confirms.
    fn prompt_continue() -> Result<bool> {
        use std::io::{self, Write};

        eprint!("Continue? [y/N] ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        match &cli.command {
            Commands::Build { build_args } => {
                self.build.clean = build_args.clean;
            }
            Commands::Serve {
                build_args,
                interface,
                port,
                watch,
                skip_initial,
            } => {
                self.build.clean = build_args.clean;
                Self::update_option(&mut self.watch.auto_zip, build_args.auto_zip.as_ref());
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                Self::update_option(&mut self.build.skip_initial, skip_initial.as_ref());
            }
            Commands::Zip { .. }
            | Commands::Package
            | Commands::Clean
            | Commands::Upload => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    pub fn sizes_root(&self) -> &Path {
        &self.paths.sizes
    }

    pub fn global_root(&self) -> &Path {
        &self.paths.global
    }

    pub fn output_root(&self) -> &Path {
        &self.paths.output
    }

    pub fn cache_dir(&self) -> &Path {
        &self.paths.cache
    }

    /// Effective project name, used for aggregate package file names.
    pub fn project_name(&self) -> String {
        self.project.resolved_name(&self.root)
    }

    /// Classify a source file by its extension.
    pub fn category_for(&self, path: &Path) -> Option<SourceCategory> {
        let ext = path.extension()?.to_str()?;
        if self.build.templates.matches_ext(ext) {
            Some(SourceCategory::Template)
        } else if self.build.styles.matches_ext(ext) {
            Some(SourceCategory::Style)
        } else if self.build.images.matches_ext(ext) {
            Some(SourceCategory::Image)
        } else if self.build.scripts.matches_ext(ext) {
            Some(SourceCategory::Script)
        } else {
            None
        }
    }

    /// The compile settings for a compiled category.
    pub fn compile_kind(&self, category: SourceCategory) -> Option<&CompileKindConfig> {
        match category {
            SourceCategory::Template => Some(&self.build.templates),
            SourceCategory::Style => Some(&self.build.styles),
            SourceCategory::Image | SourceCategory::Script => None,
        }
    }
}

// ============================================================================
// global handle
// ============================================================================

static CONFIG: OnceLock<Arc<ProjectConfig>> = OnceLock::new();

/// Install the global config handle. Call once from main.
pub fn init_config(config: ProjectConfig) -> Arc<ProjectConfig> {
    let config = Arc::new(config);
    let _ = CONFIG.set(Arc::clone(&config));
    config
}

/// Global config handle (panics if `init_config` was not called).
pub fn cfg() -> Arc<ProjectConfig> {
    Arc::clone(CONFIG.get().expect("config not initialized"))
}

/// Search upward from cwd for the config file.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        // Invalid TOML syntax - unclosed bracket
        let result: Result<ProjectConfig, _> = toml::from_str("[watch\nauto_zip = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_project_config_default() {
        let config = ProjectConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.serve.port, 9000);
        assert!(!config.watch.auto_zip);
        assert!(config.build.skip_initial);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[watch]\nauto_zip = true\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();

        assert!(config.watch.auto_zip);
        assert!(!ignored.is_empty());
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[project]\nname = \"x\"";
        let (_, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_category_for() {
        use crate::core::SourceCategory;
        let config = ProjectConfig::default();

        assert_eq!(
            config.category_for(Path::new("a/index.hbs")),
            Some(SourceCategory::Template)
        );
        assert_eq!(
            config.category_for(Path::new("a/main.scss")),
            Some(SourceCategory::Style)
        );
        assert_eq!(
            config.category_for(Path::new("a/logo.png")),
            Some(SourceCategory::Image)
        );
        assert_eq!(
            config.category_for(Path::new("a/anim.js")),
            Some(SourceCategory::Script)
        );
        assert_eq!(config.category_for(Path::new("a/readme.md")), None);
        assert_eq!(config.category_for(Path::new("a/noext")), None);
    }
}
