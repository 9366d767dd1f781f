//! `[project]` section configuration.
//!
//! ```toml
//! [project]
//! name = "spring-campaign"    # used for aggregate package file names
//! ```

use serde::{Deserialize, Serialize};

/// Project metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfoConfig {
    /// Project name. Defaults to the root directory name when empty.
    pub name: String,
}

impl ProjectInfoConfig {
    /// Resolve the effective project name against the project root.
    pub fn resolved_name(&self, root: &std::path::Path) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "banners".to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::Path;

    #[test]
    fn test_project_name() {
        let config = test_parse_config("[project]\nname = \"spring\"");
        assert_eq!(config.project.name, "spring");
        assert_eq!(config.project.resolved_name(Path::new("/x/y")), "spring");
    }

    #[test]
    fn test_project_name_default_from_root() {
        let config = test_parse_config("");
        assert_eq!(
            config.project.resolved_name(Path::new("/work/campaign")),
            "campaign"
        );
    }
}
