//! Checksum-keyed dependency cache.
//!
//! Artifacts are stored by the SHA-256 declared in their descriptor, next to
//! a copy of the descriptor itself:
//!
//! ```text
//! <root>/
//!   70b1c5.../
//!     spring-cloud-bindings-1.13.0.jar
//!   70b1c5....toml
//! ```
//!
//! Two roots are consulted: an optional read-only cache shipped with an
//! offline buildpack, then the writable download directory. A miss in both
//! downloads the artifact into the download directory, verifying the
//! checksum before the entry becomes visible.

use crate::dependency::BuildpackDependency;
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supplies the local bytes of a dependency, fetching them if necessary.
pub trait ArtifactSource {
    /// Return an open handle to the dependency's artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be located, downloaded or
    /// verified.
    fn artifact(&self, dependency: &BuildpackDependency) -> Result<File>;
}

/// Filesystem dependency cache with download-on-miss.
#[derive(Debug, Clone)]
pub struct DependencyCache {
    cache_path: Option<PathBuf>,
    download_path: PathBuf,
}

impl DependencyCache {
    /// Create a cache that downloads into `download_path`.
    #[must_use]
    pub fn new(download_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: None,
            download_path: download_path.into(),
        }
    }

    /// Consult a read-only, pre-populated cache before the download directory.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Look up a verified entry under `root`.
    fn cached(root: &Path, dependency: &BuildpackDependency, name: &str) -> Option<PathBuf> {
        let artifact = root.join(&dependency.sha256).join(name);
        let descriptor = root.join(format!("{}.toml", dependency.sha256));
        if !artifact.is_file() {
            return None;
        }

        let content = std::fs::read_to_string(&descriptor).ok()?;
        match toml::from_str::<BuildpackDependency>(&content) {
            Ok(cached) if cached.sha256 == dependency.sha256 => Some(artifact),
            Ok(_) => None,
            Err(e) => {
                debug!(?descriptor, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Download the artifact into the download directory and verify it.
    ///
    /// The entry directory is only created once the source answered, and is
    /// removed again if storing fails.
    fn download(&self, dependency: &BuildpackDependency, name: &str) -> Result<PathBuf> {
        info!(uri = %dependency.uri, "Downloading {}", dependency);
        let reader = open_uri(&dependency.uri)?;

        let dir = self.download_path.join(&dependency.sha256);
        crate::fs::ensure_dir(&dir)?;

        let stored = self.store(reader, dependency, &dir, name);
        if stored.is_err()
            && let Err(e) = std::fs::remove_dir(&dir)
        {
            debug!(?dir, error = %e, "Failed to remove download directory");
        }
        stored
    }

    /// Stream `reader` into `dir/name`, hashing as it goes.
    fn store(
        &self,
        mut reader: Box<dyn Read>,
        dependency: &BuildpackDependency,
        dir: &Path,
        name: &str,
    ) -> Result<PathBuf> {
        let dest = dir.join(name);
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(e, dir, "create"))?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 8192];

        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| Error::download(&dependency.uri, e.to_string()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            tmp.write_all(&buffer[..n])
                .map_err(|e| Error::io(e, tmp.path(), "write"))?;
        }

        let actual = hex::encode(hasher.finalize());
        if !actual.eq_ignore_ascii_case(&dependency.sha256) {
            return Err(Error::ChecksumMismatch {
                uri: dependency.uri.clone(),
                expected: dependency.sha256.clone(),
                actual,
            });
        }

        tmp.persist(&dest)
            .map_err(|e| Error::io(e.error, &dest, "rename"))?;

        let descriptor = self
            .download_path
            .join(format!("{}.toml", dependency.sha256));
        let content =
            toml::to_string(dependency).map_err(|e| Error::serialization(e.to_string()))?;
        std::fs::write(&descriptor, content).map_err(|e| Error::io(e, &descriptor, "write"))?;

        debug!(?dest, sha256 = %actual, "Stored download");
        Ok(dest)
    }
}

impl ArtifactSource for DependencyCache {
    fn artifact(&self, dependency: &BuildpackDependency) -> Result<File> {
        let name = dependency.artifact_name()?;

        let roots = self
            .cache_path
            .iter()
            .chain(std::iter::once(&self.download_path));
        for root in roots {
            if let Some(path) = Self::cached(root, dependency, name) {
                info!(path = %path.display(), "Reusing cached download");
                return File::open(&path).map_err(|e| Error::io(e, &path, "open"));
            }
        }

        let path = self.download(dependency, name)?;
        File::open(&path).map_err(|e| Error::io(e, &path, "open"))
    }
}

/// Open a byte stream for `http(s)://`, `file://` or plain path URIs.
fn open_uri(uri: &str) -> Result<Box<dyn Read>> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("bindpack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::download(uri, e.to_string()))?;

        let response = client
            .get(uri)
            .send()
            .map_err(|e| Error::download(uri, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::download(
                uri,
                format!("HTTP {}", response.status()),
            ));
        }
        return Ok(Box::new(response));
    }

    let path = uri.strip_prefix("file://").unwrap_or(uri);
    let file = File::open(path).map_err(|e| Error::download(uri, e.to_string()))?;
    Ok(Box::new(file))
}
