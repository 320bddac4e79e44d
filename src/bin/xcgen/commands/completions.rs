//! `xcgen completions` command

use std::io::{self, Write};

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};

/// Print the completion script for `args.shell` to stdout.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();
    clap_complete::generate(args.shell, &mut Cli::command(), "xcgen", &mut stdout);
    stdout.flush()?;
    Ok(())
}
