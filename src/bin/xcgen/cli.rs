//! CLI definitions using clap.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use xcgen::core::{SchemeAutogenerationMode, TargetNameMode};

/// xcgen - Generates Xcode projects from multi-configuration build graphs
#[derive(Parser)]
#[command(name = "xcgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an Xcode project from a project description
    Generate(GenerateArgs),

    /// List the targets the generated project would contain
    Targets(TargetsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// The project description this command reads, if any.
    pub fn project_path(&self) -> Option<&Path> {
        match self {
            Commands::Generate(args) => Some(&args.project.project),
            Commands::Targets(args) => Some(&args.project.project),
            Commands::Completions(_) => None,
        }
    }
}

/// Options shared by commands that read a project description.
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to the project description
    #[arg(default_value = "project.json")]
    pub project: PathBuf,

    /// Number of worker threads
    #[arg(short, long, env = "XCGEN_JOBS")]
    pub jobs: Option<usize>,

    /// Target naming (auto, qualified, label)
    #[arg(long)]
    pub target_name_mode: Option<TargetNameMode>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Directory to write the .xcodeproj into
    #[arg(short, long, visible_alias = "output")]
    pub output_dir: Option<PathBuf>,

    /// Scheme autogeneration (none, auto, all)
    #[arg(long)]
    pub scheme_autogeneration_mode: Option<SchemeAutogenerationMode>,

    /// Run every stage without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print targets as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
