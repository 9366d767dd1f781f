//! `[upload]` section configuration.
//!
//! Remote push of the output tree via an external transfer tool.
//!
//! ```toml
//! [upload]
//! enable = true
//! tool = "rsync"              # or "scp"
//! host = "preview.example.com"
//! user = "deploy"
//! remote_dir = "/var/www/banners"
//! ```

use serde::{Deserialize, Serialize};

/// External transfer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadTool {
    #[default]
    Rsync,
    Scp,
}

impl UploadTool {
    pub fn binary(self) -> &'static str {
        match self {
            Self::Rsync => "rsync",
            Self::Scp => "scp",
        }
    }
}

/// Remote upload settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub enable: bool,
    pub tool: UploadTool,
    pub host: String,
    pub user: String,
    pub remote_dir: String,
}

impl UploadConfig {
    /// `user@host` destination prefix, or just `host` when user is empty.
    pub fn destination(&self) -> String {
        if self.user.is_empty() {
            format!("{}:{}", self.host, self.remote_dir)
        } else {
            format!("{}@{}:{}", self.user, self.host, self.remote_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UploadTool;
    use crate::config::test_parse_config;

    #[test]
    fn test_upload_defaults() {
        let config = test_parse_config("");
        assert!(!config.upload.enable);
        assert_eq!(config.upload.tool, UploadTool::Rsync);
        assert!(config.upload.host.is_empty());
    }

    #[test]
    fn test_upload_destination() {
        let config = test_parse_config(
            "[upload]\ntool = \"scp\"\nhost = \"h\"\nuser = \"u\"\nremote_dir = \"/www\"",
        );
        assert_eq!(config.upload.tool, UploadTool::Scp);
        assert_eq!(config.upload.destination(), "u@h:/www");
    }

    #[test]
    fn test_upload_destination_no_user() {
        let config = test_parse_config("[upload]\nhost = \"h\"\nremote_dir = \"/www\"");
        assert_eq!(config.upload.destination(), "h:/www");
    }
}
