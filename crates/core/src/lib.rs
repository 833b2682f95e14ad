//! Core building blocks for bindpack buildpacks.
//!
//! This crate provides:
//! - Dependency descriptors parsed from `buildpack.toml` and version resolution
//! - A checksum-keyed dependency cache that downloads on miss
//! - Layers with launch flags, profile scripts and persisted metadata
//! - A layer contributor that only repopulates a layer when its dependency changed
//! - A build plan recording every contributed dependency
//! - Embedded resources and file staging helpers

mod error;

pub mod cache;
pub mod contributor;
pub mod dependency;
pub mod fs;
pub mod layer;
pub mod paths;
pub mod plan;
pub mod resources;

pub use cache::{ArtifactSource, DependencyCache};
pub use contributor::{DependencyLayerContributor, LayerContributor};
pub use dependency::{BuildpackDependency, BuildpackDescriptor, DependencyResolver};
pub use error::{Error, Result};
pub use layer::{Layer, LayerTypes, Layers, Profile};
pub use plan::{BuildpackPlan, PLAN_FILE, PlanEntry};
pub use resources::StaticResources;
