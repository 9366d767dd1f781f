//! Remote push of the output tree via an external transfer tool.

use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::config::{ProjectConfig, UploadTool};
use crate::log;

/// Push the output tree to the configured remote destination.
pub fn push_output(config: &ProjectConfig) -> Result<()> {
    let upload = &config.upload;
    if !upload.enable {
        bail!("upload is disabled, set [upload] enable = true in bannerkit.toml");
    }
    if upload.host.is_empty() {
        bail!("no upload host configured in [upload]");
    }
    if !config.output_root().is_dir() {
        bail!(
            "output directory {} does not exist, run `bannerkit build` first",
            config.output_root().display()
        );
    }

    let destination = upload.destination();
    log!("upload"; "{} -> {}", config.output_root().display(), destination);

    let mut command = Command::new(upload.tool.binary());
    match upload.tool {
        UploadTool::Rsync => {
            // Trailing slash: sync the tree's contents, not the dir itself
            let source = format!("{}/", config.output_root().display());
            command.args(["-az", "--delete"]).arg(source).arg(&destination);
        }
        UploadTool::Scp => {
            command.arg("-r").arg(config.output_root()).arg(&destination);
        }
    }

    let status = command
        .status()
        .with_context(|| format!("failed to run `{}`", upload.tool.binary()))?;
    if !status.success() {
        bail!("{} exited with {}", upload.tool.binary(), status);
    }

    log!("upload"; "done");
    Ok(())
}
