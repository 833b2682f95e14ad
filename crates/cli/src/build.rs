//! The `build` command: host side of one layer contribution.

use crate::cli::BuildArgs;
use bindpack_bindings::{CloudBindings, DEPENDENCY_ID, spring_boot_lib};
use bindpack_core::{
    BuildpackDescriptor, BuildpackPlan, DependencyCache, DependencyResolver, Layer,
    LayerContributor, Layers, PLAN_FILE, Result, paths,
};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Run the build step.
///
/// The contributed dependencies are written to `<layers>/plan.toml`.
/// Returns the contributed layer, or `None` when the contribution is
/// disabled.
///
/// # Errors
///
/// Returns an error if the dependency cannot be resolved or the layer cannot
/// be contributed or persisted.
#[instrument(skip_all, fields(layers = %args.layers_dir.display()))]
pub fn run(args: &BuildArgs) -> Result<Option<Layer>> {
    let descriptor = BuildpackDescriptor::from_path(&args.buildpack_dir.join("buildpack.toml"))?;
    info!(
        buildpack = %descriptor.buildpack.id,
        version = descriptor.buildpack.version.as_deref().unwrap_or("unknown"),
        "Building"
    );

    if args.disabled {
        info!("Spring Cloud Bindings disabled, skipping");
        return Ok(None);
    }

    let resolver = DependencyResolver::from_descriptor(&descriptor, &args.stack);
    let dependency = resolver.resolve(DEPENDENCY_ID, Some(args.version.as_str()))?;

    let mut plan = BuildpackPlan::new();
    let bindings = CloudBindings::new(
        spring_boot_lib(&args.app_dir)?,
        dependency,
        dependency_cache(args)?,
        &mut plan,
    );

    let layers = Layers::new(&args.layers_dir);
    let layer = layers.layer(bindings.name())?;
    let layer = bindings.contribute(layer)?;
    layers.persist(&layer)?;
    plan.save(&layers.root().join(PLAN_FILE))?;

    info!(layer = %layer.name, "Contributed {}", bindings.dependency());
    Ok(Some(layer))
}

fn dependency_cache(args: &BuildArgs) -> Result<DependencyCache> {
    let download = match &args.cache_dir {
        Some(dir) => dir.join("downloads"),
        None => paths::download_dir()?,
    };
    let mut cache = DependencyCache::new(download);

    let offline: Option<PathBuf> = args
        .dependency_cache
        .clone()
        .or_else(|| Some(args.buildpack_dir.join("dependencies")).filter(|p| p.is_dir()));
    if let Some(offline) = offline {
        cache = cache.with_cache_path(offline);
    }
    Ok(cache)
}
