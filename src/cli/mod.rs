//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::domain::ports::IncidentService;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::http::UsageCollector;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::infrastructure::setup::build_incident_service;

use commands::{incident, init, metadata};
use output::output;
pub use types::{Cli, Commands};

/// Load configuration, initialize logging and run the parsed command
pub async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Commands::Init(args) => {
            let _logger = LoggerImpl::init(&LogConfig::default())?;
            output(&init::execute(args)?, cli.json);
            return Ok(());
        }
        other => other,
    };

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    let usage = Arc::new(UsageCollector::new());
    let service = build_incident_service(&config, Some(Arc::clone(&usage)))?;

    let result = dispatch(service.as_ref(), command, cli.json).await;

    let usage = usage.snapshot();
    debug!(
        requests = usage.requests,
        request_body_bytes = usage.request_body_bytes,
        "Connector usage"
    );
    result
}

/// Run a command against an incident service and print its output
pub async fn dispatch(service: &dyn IncidentService, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Init(args) => output(&init::execute(args)?, json),
        Commands::AppInfo => output(&metadata::app_info(service).await?, json),
        Commands::Get(args) => output(&incident::get(service, args).await?, json),
        Commands::Find(args) => output(&incident::find(service, args).await?, json),
        Commands::ByCorrelationId(args) => {
            output(&incident::by_correlation_id(service, args).await?, json);
        }
        Commands::Create(args) => output(&incident::create(service, args).await?, json),
        Commands::Update(args) => output(&incident::update(service, args).await?, json),
        Commands::Close(args) => output(&incident::close(service, args).await?, json),
        Commands::Fields => output(&metadata::fields(service).await?, json),
        Commands::Choices(args) => output(&metadata::choices(service, args).await?, json),
    }
    Ok(())
}

/// Report a failed command and exit with status 1
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
