//! Configuration section definitions for `bannerkit.toml`.

mod build;
mod paths;
mod project;
mod serve;
mod upload;
mod watch;

pub use build::{AssetKindConfig, BuildSectionConfig, CompileKindConfig};
pub use paths::PathsConfig;
pub use project::ProjectInfoConfig;
pub use serve::ServeConfig;
pub use upload::{UploadConfig, UploadTool};
pub use watch::WatchConfig;
