//! Command implementations

pub mod completions;
pub mod generate;
pub mod targets;

use anyhow::Result;

use crate::cli::ProjectArgs;
use xcgen::ops::GenerateOptions;
use xcgen::util::config::{global_config_path, load_config, project_config_path, Config};

/// Merge global and project config for the description at `args.project`.
pub fn config_for(args: &ProjectArgs) -> Result<Config> {
    let root = args
        .project
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    load_config(global_config_path().as_deref(), &project_config_path(root))
}

/// Options common to every command; CLI flags win over config.
pub fn base_options(args: ProjectArgs, config: &Config) -> GenerateOptions {
    GenerateOptions {
        project_path: args.project,
        jobs: args.jobs.or(config.generate.jobs),
        target_name_mode: args.target_name_mode.or(config.generate.target_name_mode),
        ..Default::default()
    }
}
