//! Dependency descriptors and version resolution.
//!
//! Dependencies are declared in the `[[metadata.dependencies]]` array of a
//! buildpack's `buildpack.toml`:
//!
//! ```toml
//! [[metadata.dependencies]]
//! id      = "spring-cloud-bindings"
//! version = "1.13.0"
//! uri     = "https://repo1.maven.org/.../spring-cloud-bindings-1.13.0.jar"
//! sha256  = "70b1c5..."
//! stacks  = ["*"]
//! ```

use crate::{Error, Result};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// License attached to a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// SPDX license type (e.g., "Apache-2.0").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// URI of the license text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A fetchable artifact declared by the buildpack.
///
/// Immutable input: identifies what to download, where from, and which
/// checksum the bytes must have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackDependency {
    /// Dependency id (e.g., "spring-cloud-bindings").
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version string.
    pub version: String,
    /// Source URI.
    pub uri: String,
    /// Hex-encoded SHA-256 of the artifact.
    pub sha256: String,
    /// Stack ids the dependency is compatible with. `*` matches any stack.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stacks: Vec<String>,
    /// Licenses of the dependency.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,
    /// CPE identifiers recorded in the build plan.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpes: Vec<String>,
    /// Package URL recorded in the build plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

impl BuildpackDependency {
    /// File name of the artifact: the last path segment of the URI.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URI has no final path segment.
    pub fn artifact_name(&self) -> Result<&str> {
        let path = self
            .uri
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        match path.rsplit('/').next() {
            Some(name) if !name.is_empty() && !name.contains(':') => Ok(name),
            _ => Err(Error::configuration(format!(
                "Dependency {} has no file name in URI '{}'",
                self.id, self.uri
            ))),
        }
    }

    /// Display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Whether this dependency can be used on the given stack.
    #[must_use]
    pub fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.is_empty() || self.stacks.iter().any(|s| s == "*" || s == stack)
    }

    /// Serialize the descriptor as a TOML table, used as layer metadata.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the descriptor cannot be encoded.
    pub fn to_table(&self) -> Result<toml::Table> {
        match toml::Value::try_from(self) {
            Ok(toml::Value::Table(table)) => Ok(table),
            Ok(_) => Err(Error::serialization(format!(
                "Dependency {} did not serialize to a table",
                self.id
            ))),
            Err(e) => Err(Error::serialization(e.to_string())),
        }
    }
}

impl std::fmt::Display for BuildpackDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.display_name(), self.version)
    }
}

/// The `[buildpack]` table of `buildpack.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackInfo {
    /// Buildpack id.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Buildpack version.
    #[serde(default)]
    pub version: Option<String>,
}

/// The `[metadata]` table of `buildpack.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackMetadata {
    /// Declared dependencies.
    #[serde(default)]
    pub dependencies: Vec<BuildpackDependency>,
}

/// Parsed `buildpack.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildpackDescriptor {
    /// Buildpack API version.
    #[serde(default)]
    pub api: Option<String>,
    /// Buildpack identity.
    pub buildpack: BuildpackInfo,
    /// Buildpack metadata.
    #[serde(default)]
    pub metadata: BuildpackMetadata,
}

impl BuildpackDescriptor {
    /// Read and parse a `buildpack.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        Self::parse(&content)
            .map_err(|e| Error::serialization(format!("{}: {}", path.display(), e)))
    }

    /// Parse `buildpack.toml` content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid descriptor.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::serialization(e.to_string()))
    }
}

/// Selects a dependency by id, version constraint and stack.
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    dependencies: Vec<BuildpackDependency>,
    stack: String,
}

impl DependencyResolver {
    /// Create a resolver over the given dependencies for a stack.
    #[must_use]
    pub fn new(dependencies: Vec<BuildpackDependency>, stack: impl Into<String>) -> Self {
        Self {
            dependencies,
            stack: stack.into(),
        }
    }

    /// Create a resolver from a parsed `buildpack.toml`.
    #[must_use]
    pub fn from_descriptor(descriptor: &BuildpackDescriptor, stack: impl Into<String>) -> Self {
        Self::new(descriptor.metadata.dependencies.clone(), stack)
    }

    /// Resolve the highest version of `id` matching `constraint`.
    ///
    /// A missing constraint, or `*`, matches any version.
    ///
    /// # Errors
    ///
    /// Returns `DependencyNotFound` when nothing matches, or a configuration
    /// error when the constraint is not a valid semver requirement.
    pub fn resolve(&self, id: &str, constraint: Option<&str>) -> Result<BuildpackDependency> {
        let constraint = constraint.map(str::trim).filter(|c| !c.is_empty());
        let requirement = match constraint {
            None | Some("*") => VersionReq::STAR,
            Some(c) => VersionReq::parse(c).map_err(|e| {
                Error::configuration(format!("Invalid version constraint '{c}': {e}"))
            })?,
        };

        let mut candidates: Vec<(Version, &BuildpackDependency)> = self
            .dependencies
            .iter()
            .filter(|d| d.id == id && d.supports_stack(&self.stack))
            .filter_map(|d| coerce_version(&d.version).map(|v| (v, d)))
            .filter(|(v, _)| requirement.matches(v))
            .collect();

        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let (version, dependency) = candidates.pop().ok_or_else(|| Error::DependencyNotFound {
            id: id.to_string(),
            constraint: constraint.unwrap_or("*").to_string(),
            stack: self.stack.clone(),
        })?;

        debug!(%id, %version, stack = %self.stack, "Resolved dependency");
        Ok(dependency.clone())
    }
}

/// Parse a version, padding missing minor/patch parts (`1.10` becomes `1.10.0`).
fn coerce_version(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches('v');
    if let Ok(v) = Version::parse(raw) {
        return Some(v);
    }

    let (core, rest) = match raw.find(['-', '+']) {
        Some(i) => raw.split_at(i),
        None => (raw, ""),
    };
    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&format!("{}{}", parts.join("."), rest)).ok()
}
