//! Layer contribution.
//!
//! `DependencyLayerContributor` implements the cache-check-then-populate
//! pattern: a layer whose persisted metadata matches the dependency
//! descriptor is reused untouched, otherwise the layer is emptied, the
//! artifact is fetched and a caller-supplied closure populates it.

use crate::cache::ArtifactSource;
use crate::dependency::BuildpackDependency;
use crate::layer::Layer;
use crate::plan::{BuildpackPlan, PlanEntry};
use crate::Result;
use std::fs::File;
use tracing::{debug, info};

/// Something that contributes a single layer to a build.
pub trait LayerContributor {
    /// Populate `layer` and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer cannot be contributed; the host then
    /// discards the layer.
    fn contribute(&self, layer: Layer) -> Result<Layer>;

    /// Name of the layer this contributor owns.
    fn name(&self) -> &str;
}

/// Contributes a layer holding one dependency artifact.
#[derive(Debug, Clone)]
pub struct DependencyLayerContributor<S> {
    dependency: BuildpackDependency,
    source: S,
}

impl<S: ArtifactSource> DependencyLayerContributor<S> {
    /// Create a contributor for `dependency`, fetching through `source`.
    ///
    /// The dependency is recorded in `plan`.
    #[must_use]
    pub fn new(dependency: BuildpackDependency, source: S, plan: &mut BuildpackPlan) -> Self {
        plan.add(PlanEntry::from(&dependency));
        Self { dependency, source }
    }

    /// The dependency being contributed.
    #[must_use]
    pub fn dependency(&self) -> &BuildpackDependency {
        &self.dependency
    }

    /// The artifact source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Layer name: the dependency id.
    #[must_use]
    pub fn layer_name(&self) -> &str {
        &self.dependency.id
    }

    /// Metadata a layer must carry to be reused.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the descriptor cannot be encoded.
    pub fn expected_metadata(&self) -> Result<toml::Table> {
        self.dependency.to_table()
    }

    /// Reuse `layer` if its metadata is current, otherwise reset it and run
    /// `populate` with the fetched artifact.
    ///
    /// `populate` runs at most once and never on reuse.
    ///
    /// # Errors
    ///
    /// Returns any error from resetting the layer, fetching the artifact or
    /// `populate`.
    pub fn contribute<F>(&self, mut layer: Layer, populate: F) -> Result<Layer>
    where
        F: FnOnce(File, Layer) -> Result<Layer>,
    {
        let expected = self.expected_metadata()?;

        if layer.metadata == expected {
            info!(layer = %layer.name, "Reusing cached layer {}", layer.path.display());
            return Ok(layer);
        }

        debug!(layer = %layer.name, "Layer metadata changed, contributing");
        info!(layer = %layer.name, "Contributing {}", self.dependency);
        layer.reset()?;

        let artifact = self.source.artifact(&self.dependency)?;
        let mut layer = populate(artifact, layer)?;
        layer.metadata = expected;
        Ok(layer)
    }
}
