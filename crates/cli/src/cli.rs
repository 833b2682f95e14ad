//! Command-line interface definition.
//!
//! Every option can also be supplied through the environment, so the binary
//! can be invoked directly by a buildpack lifecycle.

use crate::tracing::{LogLevel, TracingFormat};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Stage Spring Cloud Bindings into a launch layer.
#[derive(Debug, Parser)]
#[command(name = "bindpack", version, about, long_about = None)]
pub struct Cli {
    /// Log level for bindpack output.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "info",
        env = "BINDPACK_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "compact",
        env = "BINDPACK_LOG_FORMAT"
    )]
    pub log_format: TracingFormat,

    /// Explicit tracing filter directive (e.g. `bindpack_core=trace`).
    /// Takes precedence over `RUST_LOG` and `--log-level`.
    #[arg(long, global = true, env = "BINDPACK_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Contribute the Spring Cloud Bindings layer.
    Build(BuildArgs),
}

/// Options for `bindpack build`.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Layers directory provided by the lifecycle.
    #[arg(long, env = "CNB_LAYERS_DIR")]
    pub layers_dir: PathBuf,

    /// Buildpack directory containing `buildpack.toml`.
    #[arg(long, env = "CNB_BUILDPACK_DIR")]
    pub buildpack_dir: PathBuf,

    /// Stack id of the build image.
    #[arg(long, env = "CNB_STACK_ID", default_value = "io.buildpacks.stacks.jammy")]
    pub stack: String,

    /// Application directory.
    #[arg(long, env = "BINDPACK_APP_DIR", default_value = "/workspace")]
    pub app_dir: PathBuf,

    /// Directory downloads are stored in. Defaults to the user cache directory.
    #[arg(long, env = "BINDPACK_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Read-only dependency cache consulted before downloading.
    /// Defaults to `<buildpack-dir>/dependencies` when present.
    #[arg(long, env = "BINDPACK_DEPENDENCY_CACHE")]
    pub dependency_cache: Option<PathBuf>,

    /// Version constraint for the bindings dependency.
    #[arg(long, env = "BP_SPRING_CLOUD_BINDINGS_VERSION", default_value = "1")]
    pub version: String,

    /// Skip contributing the bindings layer.
    #[arg(
        long,
        env = "BP_SPRING_CLOUD_BINDINGS_DISABLED",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub disabled: bool,
}
