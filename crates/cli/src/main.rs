//! bindpack buildpack step
//!
//! Resolves the Spring Cloud Bindings dependency from `buildpack.toml`,
//! contributes it as a launch layer and links it into the application.

use bindpack::cli::{Cli, Command};
use bindpack::tracing::{TracingConfig, init_tracing};
use clap::Parser;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.log_level.into(),
        filter: cli.log_filter,
    })?;

    match cli.command {
        Command::Build(args) => {
            bindpack::build::run(&args)?;
        }
    }

    Ok(())
}
