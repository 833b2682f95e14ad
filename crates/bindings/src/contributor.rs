//! Spring Cloud Bindings layer contributor.

use bindpack_core::fs::{copy_file, ensure_dir, replace_symlink};
use bindpack_core::{
    ArtifactSource, BuildpackDependency, BuildpackPlan, DependencyLayerContributor, Error, Layer,
    LayerContributor, Result, StaticResources,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Dependency id of the bindings agent in `buildpack.toml`.
pub const DEPENDENCY_ID: &str = "spring-cloud-bindings";

/// Name the profile script is registered under.
pub const PROFILE_SCRIPT: &str = "spring-cloud-bindings.sh";

const SCRIPT_RESOURCE: &str = "/spring-cloud-bindings.sh";

/// Resources bundled with this buildpack.
pub static RESOURCES: StaticResources = StaticResources::new(&[(
    SCRIPT_RESOURCE,
    include_str!("../resources/spring-cloud-bindings.sh"),
)]);

/// Stages the bindings jar into a launch layer and links it into the
/// application's library directory.
#[derive(Debug)]
pub struct CloudBindings<S> {
    contributor: DependencyLayerContributor<S>,
    lib_dir: PathBuf,
    resources: StaticResources,
}

impl<S: ArtifactSource> CloudBindings<S> {
    /// Create a contributor linking into `lib_dir`, recording the dependency
    /// in `plan`.
    #[must_use]
    pub fn new(
        lib_dir: impl Into<PathBuf>,
        dependency: BuildpackDependency,
        source: S,
        plan: &mut BuildpackPlan,
    ) -> Self {
        Self {
            contributor: DependencyLayerContributor::new(dependency, source, plan),
            lib_dir: lib_dir.into(),
            resources: RESOURCES,
        }
    }

    /// Replace the bundled resource table.
    #[must_use]
    pub fn with_resources(mut self, resources: StaticResources) -> Self {
        self.resources = resources;
        self
    }

    /// The dependency being staged.
    #[must_use]
    pub fn dependency(&self) -> &BuildpackDependency {
        self.contributor.dependency()
    }

    /// The artifact source.
    #[must_use]
    pub fn source(&self) -> &S {
        self.contributor.source()
    }

    fn populate(
        &self,
        mut artifact: std::fs::File,
        file: &Path,
        mut layer: Layer,
    ) -> Result<Layer> {
        info!("Copying to {}", layer.path.display());
        copy_file(&mut artifact, file)?;

        let script = self.resources.get(SCRIPT_RESOURCE)?;
        layer.profile.add(PROFILE_SCRIPT, script);

        layer.types.launch = true;
        Ok(layer)
    }
}

impl<S: ArtifactSource> LayerContributor for CloudBindings<S> {
    fn contribute(&self, layer: Layer) -> Result<Layer> {
        let artifact_name = self.contributor.dependency().artifact_name()?;
        let file = layer.path.join(artifact_name);

        let layer = self
            .contributor
            .contribute(layer, |artifact, layer| self.populate(artifact, &file, layer))
            .map_err(|e| Error::contribution(self.name(), e))?;

        ensure_dir(&self.lib_dir)?;

        let target = self.lib_dir.join(artifact_name);
        let original =
            std::path::absolute(&file).map_err(|e| Error::symlink(e, &file, &target))?;
        replace_symlink(&original, &target)?;
        debug!(original = %original.display(), link = %target.display(), "Linked artifact");

        Ok(layer)
    }

    fn name(&self) -> &str {
        self.contributor.layer_name()
    }
}
