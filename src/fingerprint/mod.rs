//! Directory fingerprints for change detection.
//!
//! A fingerprint summarizes a directory's file identity - relative paths,
//! sizes and modification times - not its byte content. Two walks over an
//! untouched tree yield the same digest; any added, removed, resized or
//! touched file changes it. An external tool that rewrites a file with
//! identical bytes but a fresh mtime therefore counts as a change (known
//! limitation of the mtime approach).

use jwalk::WalkDir;
use std::path::Path;

use crate::utils::path::{mtime_millis, relative_slash};

/// A 256-bit tree digest (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeDigest([u8; 32]);

impl TreeDigest {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string (store format).
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s.trim()).ok()?;
        if bytes.len() != 32 {
            return None;
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Some(Self(arr))
    }
}

impl std::fmt::Display for TreeDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars for brevity
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Entries excluded from both traversal input and digest.
///
/// OS metadata and existing archives must not influence the decision to
/// re-archive.
pub fn is_noise(name: &str) -> bool {
    name == ".DS_Store" || name == "Thumbs.db" || name.ends_with(".zip")
}

/// Compute the fingerprint of a directory tree.
///
/// Walk order is lexically sorted, so the digest is deterministic for a
/// given tree state. Directories contribute `D:<rel>`; files contribute
/// `F:<rel>:<size>:<mtime_ms>`. A missing directory hashes to the digest
/// of an empty input (nothing to do, not an error).
pub fn tree_fingerprint(dir: &Path) -> TreeDigest {
    let mut hasher = blake3::Hasher::new();

    for entry in WalkDir::new(dir).sort(true).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        let Some(rel) = relative_slash(&path, dir) else {
            continue; // the root itself
        };

        let name = entry.file_name().to_string_lossy();
        if is_noise(&name) {
            continue;
        }

        if entry.file_type().is_dir() {
            hasher.update(format!("D:{rel}\n").as_bytes());
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let mtime = mtime_millis(&path);
            hasher.update(format!("F:{rel}:{size}:{mtime}\n").as_bytes());
        }
    }

    TreeDigest::new(*hasher.finalize().as_bytes())
}
