//! `xcgen targets` command

use anyhow::Result;

use crate::cli::TargetsArgs;
use crate::commands::{base_options, config_for};
use xcgen::ops::describe_targets;

pub fn execute(args: TargetsArgs) -> Result<()> {
    let config = config_for(&args.project)?;
    let opts = base_options(args.project, &config);
    let targets = describe_targets(&opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    for target in &targets {
        println!(
            "{} [{}, {}] {}",
            target.name,
            target.product_type,
            target.platform.display_name(),
            target.configurations.join(", ")
        );
        for dependency in &target.dependencies {
            println!("  -> {}", dependency);
        }
    }

    Ok(())
}
