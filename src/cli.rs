//! CLI argument parsing and dispatch

use anyhow::{Context as _, Result};
use clap::Parser;

use pkg_dry::config::PACKAGER_ENV;
use pkg_dry::pipeline;

/// dry - descriptor inheritance in front of your package manager
///
/// Every argument is handed to the package manager, except the `--dry-*`
/// options understood by dry itself.
#[derive(Parser, Debug)]
#[command(name = "dry")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Package manager command and arguments
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

impl Cli {
    /// Run the pipeline in the current directory
    pub fn execute(self) -> Result<()> {
        let working_dir =
            std::env::current_dir().context("Unable to determine the working directory")?;
        let env_packager = std::env::var(PACKAGER_ENV).ok();
        pipeline::execute(self.args, &working_dir, env_packager)?;
        Ok(())
    }
}
