//! Build layers.
//!
//! A layer is a directory under the layers root that holds one discrete
//! contribution to the build output, plus a `<name>.toml` file next to it
//! recording its types and metadata:
//!
//! ```text
//! <layers>/
//!   spring-cloud-bindings/
//!     spring-cloud-bindings-1.13.0.jar
//!     profile.d/
//!       spring-cloud-bindings.sh
//!   spring-cloud-bindings.toml
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory inside a layer holding scripts sourced at launch.
pub const PROFILE_DIR: &str = "profile.d";

/// Which phases a layer is made available to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTypes {
    /// Layer is retained in the final runtime image.
    #[serde(default)]
    pub launch: bool,
    /// Layer is visible to subsequent buildpacks.
    #[serde(default)]
    pub build: bool,
    /// Layer is restored on the next build.
    #[serde(default)]
    pub cache: bool,
}

/// Scripts sourced when the container starts, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile(BTreeMap<String, String>);

impl Profile {
    /// Register a script, replacing any previous script with the same name.
    pub fn add(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.0.insert(name.into(), body.into());
    }

    /// Get a script body by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of registered scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no scripts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, body)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// A single layer being contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer name, also the directory name.
    pub name: String,
    /// Absolute path of the layer directory.
    pub path: PathBuf,
    /// Phase flags.
    pub types: LayerTypes,
    /// Launch profile scripts.
    pub profile: Profile,
    /// Metadata persisted alongside the layer, used for reuse checks.
    pub metadata: toml::Table,
}

impl Layer {
    /// Directory holding profile scripts.
    #[must_use]
    pub fn profile_dir(&self) -> PathBuf {
        self.path.join(PROFILE_DIR)
    }

    /// Empty the layer directory and forget its types, profile and metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed or recreated.
    pub fn reset(&mut self) -> Result<()> {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(e, &self.path, "remove_dir_all")),
        }
        crate::fs::ensure_dir(&self.path)?;

        self.types = LayerTypes::default();
        self.profile.clear();
        self.metadata.clear();
        debug!(layer = %self.name, "Reset layer");
        Ok(())
    }
}

/// On-disk form of `<layers>/<name>.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LayerToml {
    #[serde(default)]
    types: LayerTypes,
    #[serde(default)]
    metadata: toml::Table,
}

/// The layers root directory handed to a buildpack.
#[derive(Debug, Clone)]
pub struct Layers {
    root: PathBuf,
}

impl Layers {
    /// Create a handle over the layers root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The layers root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn toml_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.toml"))
    }

    /// Open a layer, creating its directory and loading any state persisted
    /// by a previous build.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the persisted
    /// state cannot be read.
    pub fn layer(&self, name: &str) -> Result<Layer> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::configuration(format!("Invalid layer name '{name}'")));
        }

        let path = self.root.join(name);
        crate::fs::ensure_dir(&path)?;

        let toml_path = self.toml_path(name);
        let persisted = if toml_path.exists() {
            let content = std::fs::read_to_string(&toml_path)
                .map_err(|e| Error::io(e, &toml_path, "read"))?;
            toml::from_str::<LayerToml>(&content)
                .map_err(|e| Error::serialization(format!("{}: {}", toml_path.display(), e)))?
        } else {
            LayerToml::default()
        };

        let mut layer = Layer {
            name: name.to_string(),
            path,
            types: persisted.types,
            profile: Profile::default(),
            metadata: persisted.metadata,
        };
        load_profile(&mut layer)?;

        debug!(layer = %name, path = ?layer.path, "Opened layer");
        Ok(layer)
    }

    /// Write a layer's profile scripts and `<name>.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn persist(&self, layer: &Layer) -> Result<()> {
        let profile_dir = layer.profile_dir();
        match std::fs::remove_dir_all(&profile_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(e, &profile_dir, "remove_dir_all")),
        }

        if !layer.profile.is_empty() {
            crate::fs::ensure_dir(&profile_dir)?;
            for (name, body) in layer.profile.iter() {
                let script = profile_dir.join(name);
                std::fs::write(&script, body).map_err(|e| Error::io(e, &script, "write"))?;
                make_executable(&script)?;
            }
        }

        let toml_path = self.toml_path(&layer.name);
        let content = toml::to_string(&LayerToml {
            types: layer.types,
            metadata: layer.metadata.clone(),
        })
        .map_err(|e| Error::serialization(e.to_string()))?;
        std::fs::write(&toml_path, content).map_err(|e| Error::io(e, &toml_path, "write"))?;

        debug!(layer = %layer.name, "Persisted layer");
        Ok(())
    }
}

fn load_profile(layer: &mut Layer) -> Result<()> {
    let dir = layer.profile_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(e, &dir, "read_dir")),
    };

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(e, &dir, "read_dir"))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let body = std::fs::read_to_string(&path).map_err(|e| Error::io(e, &path, "read"))?;
        layer
            .profile
            .add(entry.file_name().to_string_lossy().into_owned(), body);
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::io(e, path, "chmod"))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
