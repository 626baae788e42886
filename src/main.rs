//! # dry CLI
//!
//! Binary entry point for `dry`. It installs the logger, parses the command
//! line with `clap` and hands every token to the library pipeline. Any error
//! is printed by `anyhow` and turns into exit code 1.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    pkg_dry::logging::init();
    let cli = cli::Cli::parse();
    cli.execute()
}
