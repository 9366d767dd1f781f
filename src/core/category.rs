//! Source file categories and the private-name convention.
//!
//! A leading underscore marks a file or directory as private: partials,
//! includes, and work-in-progress units. Private entries never produce
//! output on their own.

use std::path::Path;

/// Category of a watched source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    /// Markup compiled per-file into the unit output (e.g. handlebars → html)
    Template,
    /// Stylesheets compiled per-file into the unit output (e.g. scss → css)
    Style,
    /// Copied as-is when newer than the destination
    Image,
    /// Copied as-is when newer than the destination
    Script,
}

impl SourceCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Style => "style",
            Self::Image => "image",
            Self::Script => "script",
        }
    }

    /// Compiled categories go through the single-file compiler; the rest
    /// through the copy-newer step.
    pub fn is_compiled(self) -> bool {
        matches!(self, Self::Template | Self::Style)
    }
}

/// Leading underscore marks a name as private.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_')
}

/// True if any component of `path` relative to `base` is private.
///
/// A private directory hides everything beneath it, matching the watch
/// glob exclusions of the original project layout.
pub fn has_private_component(path: &Path, base: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(base) else {
        return false;
    };
    rel.components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(is_private_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_private_name() {
        assert!(is_private_name("_partial.hbs"));
        assert!(is_private_name("_300x250"));
        assert!(!is_private_name("300x250"));
        assert!(!is_private_name("main.scss"));
    }

    #[test]
    fn test_has_private_component() {
        let base = Path::new("/p/src/sizes");
        assert!(has_private_component(
            Path::new("/p/src/sizes/300x250/_includes/head.hbs"),
            base
        ));
        assert!(has_private_component(
            Path::new("/p/src/sizes/_wip/index.hbs"),
            base
        ));
        assert!(!has_private_component(
            Path::new("/p/src/sizes/300x250/index.hbs"),
            base
        ));
    }

    #[test]
    fn test_has_private_component_outside_base() {
        let base = Path::new("/p/src/sizes");
        assert!(!has_private_component(Path::new("/elsewhere/_x"), base));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(SourceCategory::Template.label(), "template");
        assert!(SourceCategory::Style.is_compiled());
        assert!(!SourceCategory::Image.is_compiled());
    }
}
