//! Implementation of the `snowbridge init` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::CommandOutput;
use crate::infrastructure::setup::{SetupPaths, create_config_dir, create_config_file};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_file: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if self.success {
            format!(
                "{}\n\nEdit {} and put secrets in .snowbridge/local.yaml or SNOWBRIDGE_* variables.",
                self.message,
                self.config_file.display()
            )
        } else {
            self.message.clone()
        }
    }
}

pub fn execute(args: InitArgs) -> Result<InitOutput> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let paths = SetupPaths::in_dir(&target_path);
    create_config_dir(&paths)?;
    let written = create_config_file(&paths, args.force)?;

    let message = match (written, args.force) {
        (false, _) => "Project already initialized. Use --force to overwrite the config file.",
        (true, true) => "Configuration reinitialized successfully.",
        (true, false) => "Configuration initialized successfully.",
    };

    Ok(InitOutput {
        success: written,
        message: message.to_string(),
        config_file: paths.config_file,
    })
}
