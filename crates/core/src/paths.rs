//! Default locations for bindpack data directories.
//!
//! | Platform | Cache Dir |
//! |----------|-----------|
//! | **macOS** | `~/Library/Caches/bindpack` |
//! | **Linux** | `~/.cache/bindpack` (XDG_CACHE_HOME) |
//!
//! `BINDPACK_CACHE_DIR` overrides the cache directory for testing and CI.

use crate::{Error, Result};
use std::path::PathBuf;

/// Get the cache directory for bindpack.
///
/// Downloaded dependencies are stored under this directory, keyed by their
/// SHA-256 checksum.
///
/// Resolution order:
/// 1. `BINDPACK_CACHE_DIR` environment variable
/// 2. Platform cache directory + `/bindpack`
///
/// # Errors
///
/// Returns an error if the cache directory cannot be determined.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BINDPACK_CACHE_DIR")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    let base = dirs::cache_dir()
        .ok_or_else(|| Error::configuration("Could not determine cache directory"))?;

    Ok(base.join("bindpack"))
}

/// Get the download directory for dependency artifacts.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be determined.
pub fn download_dir() -> Result<PathBuf> {
    Ok(cache_dir()?.join("downloads"))
}
