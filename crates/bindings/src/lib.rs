//! Spring Cloud Bindings support for bindpack.
//!
//! Contributes the Spring Cloud Bindings jar as a launch layer, registers a
//! profile script that enables its auto-configuration at startup, and links
//! the jar into the application's `Spring-Boot-Lib` directory so the Spring
//! Boot launcher puts it on the classpath.
//!
//! # Example
//!
//! ```ignore
//! use bindpack_bindings::{CloudBindings, spring_boot_lib};
//! use bindpack_core::{BuildpackPlan, DependencyCache, LayerContributor, Layers};
//!
//! let mut plan = BuildpackPlan::new();
//! let bindings = CloudBindings::new(spring_boot_lib(app_dir)?, dependency, cache, &mut plan);
//! let layer = layers.layer(bindings.name())?;
//! let layer = bindings.contribute(layer)?;
//! layers.persist(&layer)?;
//! ```

mod contributor;
pub mod manifest;

pub use contributor::{CloudBindings, DEPENDENCY_ID, PROFILE_SCRIPT, RESOURCES};
pub use manifest::{Manifest, spring_boot_lib};
