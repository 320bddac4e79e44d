//! xcgen CLI - Xcode project generation

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xcgen::ops::diagnose;
use xcgen::util::diagnostic::emit;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    let project = cli.command.project_path().map(|p| p.to_path_buf());

    if let Err(e) = run(cli, color) {
        emit(&diagnose(&e, project.as_deref()), color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("xcgen=debug")
    } else {
        EnvFilter::new("xcgen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, cli.verbose),
        Commands::Targets(args) => commands::targets::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
