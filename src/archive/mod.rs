//! Archive decisions, zip writing and the size manifest.

mod cache;
mod manifest;
mod store;
mod writer;

pub use cache::ArchiveCache;
pub use manifest::{MANIFEST_FILE, write_manifest};
pub use store::FingerprintStore;
pub use writer::{archive_path_for, archive_unit, package_all_banners, package_whole};
