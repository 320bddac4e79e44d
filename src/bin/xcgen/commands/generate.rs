//! `xcgen generate` command

use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::GenerateArgs;
use crate::commands::{base_options, config_for};
use xcgen::ops::generate;

fn spinner(message: &str) -> Option<ProgressBar> {
    if !io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

pub fn execute(args: GenerateArgs, verbose: bool) -> Result<()> {
    let config = config_for(&args.project)?;

    // Scheme mode and output dir: CLI > config > description
    let scheme_autogeneration_mode = args
        .scheme_autogeneration_mode
        .or(config.generate.scheme_autogeneration_mode);
    let output_dir = args.output_dir.or_else(|| config.generate.output_dir.clone());

    let mut opts = base_options(args.project, &config);
    opts.output_dir = output_dir;
    opts.scheme_autogeneration_mode = scheme_autogeneration_mode;
    opts.dry_run = args.dry_run;

    let pb = if verbose { None } else { spinner("Generating") };
    let result = generate(&opts);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let result = result?;

    match &result.path {
        Some(path) => eprintln!(
            "    Finished {} ({} targets, {} schemes)",
            path.display(),
            result.targets,
            result.schemes
        ),
        None => eprintln!(
            "    Checked {} targets, {} schemes (dry run)",
            result.targets, result.schemes
        ),
    }

    Ok(())
}
