//! rg-provision - resource group provisioning walkthrough
//!
//! This is the main entry point for the rg-provision CLI.

mod cli;

use anyhow::{Context, Result};
use cli::Cli;
use colored::Colorize;
use rg_provision::prelude::*;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    if cli.verbosity() >= 2 {
        eprintln!("rg-provision v{}", VERSION);
    }

    let exit_code = match execute(&cli).await {
        Ok(outcome) => {
            if let Some(report) = outcome.report() {
                tracing::debug!(?report, "run finished");
            }
            0
        }
        Err(err) => {
            let message = format!("Error: {:#}", err);
            if cli.no_color {
                eprintln!("{}", message);
            } else {
                eprintln!("{}", message.red());
            }
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}

/// Check credentials, wire the real collaborators and run the workflow.
///
/// Missing credentials are reported before anything else is built.
async fn execute(cli: &Cli) -> Result<RunOutcome> {
    let credentials = Credentials::from_env();
    let mut out = ConsoleSink::new(!cli.no_color);

    let missing = credentials.missing();
    if !missing.is_empty() {
        tracing::info!(?missing, "credentials incomplete; nothing to do");
        out.line(MISSING_CREDENTIALS_MESSAGE)?;
        return Ok(RunOutcome::MissingCredentials { missing });
    }

    let mut config = RunConfig::default();
    config.workflow.cleanup_on_failure = cli.cleanup_on_failure;

    let http = config
        .http
        .build_client()
        .context("Failed to build HTTP client")?;
    let authenticator = ServicePrincipalLogin::with_http_client(http.clone(), &config.azure)?;
    let endpoint = ArmEndpoint::with_http_client(http, &config.azure, &config.http)?;

    let runner = ProvisioningRunner::new(Arc::new(authenticator), Arc::new(endpoint))
        .with_settings(config.workflow);
    let mut input = StdinSource;

    Ok(runner.run(&credentials, &mut out, &mut input).await?)
}

/// Map a failure to the process exit status.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .with(env_filter)
        .init();
}
