//! Unit listing page: an index.html in the output root linking every
//! built unit, with the size manifest loaded for download links.

use anyhow::{Context, Result};
use std::path::Path;

use crate::archive::MANIFEST_FILE;

/// Write the listing page for the given unit names.
pub fn write_listing(output_root: &Path, project: &str, units: &[String]) -> Result<()> {
    let mut items = String::new();
    for unit in units {
        items.push_str(&format!(
            "    <li><a href=\"{unit}/index.html\">{unit}</a> \
<span class=\"size\" data-zip=\"{unit}.zip\"></span></li>\n"
        ));
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{project} — banner sizes</title>
  <style>
    body {{ font-family: system-ui, sans-serif; margin: 2rem; }}
    li {{ margin: 0.25rem 0; }}
    .size {{ color: #888; font-size: 0.85em; }}
  </style>
</head>
<body>
  <h1>{project}</h1>
  <ul>
{items}  </ul>
  <script src="{MANIFEST_FILE}"></script>
  <script>
    if (window.BANNER_SIZES) {{
      document.querySelectorAll('[data-zip]').forEach(function (el) {{
        var bytes = window.BANNER_SIZES[el.dataset.zip];
        if (bytes) el.textContent = '(' + (bytes / 1024).toFixed(1) + ' KB)';
      }});
    }}
  </script>
</body>
</html>
"#
    );

    let dest = output_root.join("index.html");
    std::fs::write(&dest, html)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}
