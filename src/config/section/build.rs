//! `[build]` section configuration.
//!
//! Per-kind compile settings. Templates and styles run through the
//! single-file compiler; images and scripts through the copy-newer step.
//!
//! ```toml
//! [build]
//! skip_initial = true
//!
//! [build.templates]
//! extensions = ["hbs", "html"]
//! output_ext = "html"
//! command = ["npx", "hbs-render", "$BANNER_SOURCE", "-o", "$BANNER_OUTPUT"]
//!
//! [build.styles]
//! extensions = ["scss", "css"]
//! output_ext = "css"
//! command = ["sass", "$BANNER_SOURCE", "$BANNER_OUTPUT"]
//! ```
//!
//! An empty `command` means the file is copied with the output extension
//! applied.

use serde::{Deserialize, Serialize};

/// A compiled source kind (templates, styles).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileKindConfig {
    /// File extensions belonging to this kind (without dot).
    pub extensions: Vec<String>,

    /// Extension of the produced output file (without dot).
    pub output_ext: String,

    /// External compile command with `$BANNER_*` variable substitution.
    /// Empty = copy the source with the output extension applied.
    pub command: Vec<String>,
}

impl Default for CompileKindConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            output_ext: String::new(),
            command: Vec::new(),
        }
    }
}

impl CompileKindConfig {
    fn templates_default() -> Self {
        Self {
            extensions: vec!["hbs".into(), "html".into()],
            output_ext: "html".into(),
            command: Vec::new(),
        }
    }

    fn styles_default() -> Self {
        Self {
            extensions: vec!["scss".into(), "css".into()],
            output_ext: "css".into(),
            command: Vec::new(),
        }
    }

    pub fn matches_ext(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A copied source kind (images, scripts).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetKindConfig {
    /// File extensions belonging to this kind (without dot).
    pub extensions: Vec<String>,
}

impl AssetKindConfig {
    fn images_default() -> Self {
        Self {
            extensions: vec![
                "png".into(),
                "jpg".into(),
                "jpeg".into(),
                "gif".into(),
                "svg".into(),
                "webp".into(),
            ],
        }
    }

    fn scripts_default() -> Self {
        Self {
            extensions: vec!["js".into()],
        }
    }

    pub fn matches_ext(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Skip the initial full build in serve mode when the output tree
    /// already exists.
    pub skip_initial: bool,

    /// Clean the output tree before building (CLI-only flag).
    #[serde(skip)]
    pub clean: bool,

    pub templates: CompileKindConfig,
    pub styles: CompileKindConfig,
    pub images: AssetKindConfig,
    pub scripts: AssetKindConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            skip_initial: true,
            clean: false,
            templates: CompileKindConfig::templates_default(),
            styles: CompileKindConfig::styles_default(),
            images: AssetKindConfig::images_default(),
            scripts: AssetKindConfig::scripts_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert!(config.build.skip_initial);
        assert!(config.build.templates.matches_ext("hbs"));
        assert!(config.build.templates.matches_ext("HBS"));
        assert_eq!(config.build.templates.output_ext, "html");
        assert!(config.build.styles.matches_ext("scss"));
        assert!(config.build.images.matches_ext("png"));
        assert!(config.build.scripts.matches_ext("js"));
        assert!(config.build.templates.command.is_empty());
    }

    #[test]
    fn test_build_compile_command() {
        let config = test_parse_config(
            "[build.styles]\nextensions = [\"scss\"]\noutput_ext = \"css\"\ncommand = [\"sass\", \"$BANNER_SOURCE\", \"$BANNER_OUTPUT\"]",
        );
        assert_eq!(config.build.styles.command[0], "sass");
        assert!(!config.build.styles.matches_ext("css"));
    }

    #[test]
    fn test_skip_initial_override() {
        let config = test_parse_config("[build]\nskip_initial = false");
        assert!(!config.build.skip_initial);
    }
}
