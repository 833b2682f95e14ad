//! Build plan: the dependencies a build contributed.
//!
//! Every dependency a layer contributor stages is recorded as a plan entry
//! carrying its identity and provenance (licenses, CPEs, package URL). The
//! host persists the plan next to the layers so a bill of materials can be
//! produced from it.

use crate::dependency::{BuildpackDependency, License};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the persisted plan under the layers root.
pub const PLAN_FILE: &str = "plan.toml";

/// One contributed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Dependency id.
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resolved version.
    pub version: String,
    /// Licenses of the dependency.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,
    /// CPE identifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpes: Vec<String>,
    /// Package URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

impl From<&BuildpackDependency> for PlanEntry {
    fn from(dependency: &BuildpackDependency) -> Self {
        Self {
            id: dependency.id.clone(),
            name: dependency.name.clone(),
            version: dependency.version.clone(),
            licenses: dependency.licenses.clone(),
            cpes: dependency.cpes.clone(),
            purl: dependency.purl.clone(),
        }
    }
}

/// Entries recorded during a build, keyed by dependency id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackPlan {
    /// Recorded entries, in contribution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<PlanEntry>,
}

impl BuildpackPlan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry`, replacing an existing entry with the same id.
    pub fn add(&mut self, entry: PlanEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Find the entry for a dependency id.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a plan from a TOML file.
    ///
    /// Returns `None` if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        let plan = toml::from_str(&content)
            .map_err(|e| Error::serialization(format!("Invalid plan {}: {e}", path.display())))?;
        Ok(Some(plan))
    }

    /// Write the plan to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan cannot be encoded or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::serialization(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| Error::io(e, path, "write"))
    }
}
