//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::incident::{
    ByCorrelationIdArgs, CloseArgs, CreateArgs, FindArgs, GetArgs, UpdateArgs,
};
use super::commands::init::InitArgs;
use super::commands::metadata::ChoicesArgs;

#[derive(Parser, Debug)]
#[command(name = "snowbridge")]
#[command(about = "Snowbridge - ServiceNow incident adapter", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to load instead of .snowbridge/config.yaml
    #[arg(short, long, global = true, env = "SNOWBRIDGE_CONFIG_FILE", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default .snowbridge/config.yaml
    Init(InitArgs),

    /// Show the installed scoped application
    AppInfo,

    /// Get an incident by sys_id
    Get(GetArgs),

    /// Find incidents with table query parameters
    Find(FindArgs),

    /// Get the first incident with a correlation ID
    ByCorrelationId(ByCorrelationIdArgs),

    /// Create an incident
    Create(CreateArgs),

    /// Update an incident
    Update(UpdateArgs),

    /// Close an incident by sys_id or correlation ID
    Close(CloseArgs),

    /// List the incident table columns
    Fields,

    /// List choice values for one or more fields
    Choices(ChoicesArgs),
}
