//! `mochi`: command-line client for the Mochi flashcard API.
//!
//! Results go to stdout as JSON. Failures go to stderr as a JSON object and
//! the process exits with status 1.

mod args;
mod commands;
mod input;

use std::io::Write;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use mochi_core::{ApiError, ClientConfig, Session};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

/// Overrides the default log filter, e.g. `MOCHI_LOG=mochi_core=trace`.
const LOG_ENV: &str = "MOCHI_LOG";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                return ExitCode::FAILURE;
            }
        },
    };
    init_logging(cli.verbose);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ApiError::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ApiError> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.base_url.as_deref() {
        config = config.with_base_url(url);
    }
    let mut session = Session::new(config);
    if let Some(key) = cli.api_key {
        session.set_api_key(key);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(cli.command, &mut session, &mut out).await?;
    out.flush()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report(err: &ApiError) {
    let body = error_json(err);
    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    eprintln!("{text}");
}

/// Remote failures carry the status and the server's `errors` payload.
fn error_json(err: &ApiError) -> Value {
    match err {
        ApiError::Network { .. } => json!({
            "error": err.to_string(),
            "statusCode": 0,
            "details": Value::Null,
        }),
        ApiError::Api { status, errors, .. } => json!({
            "error": err.to_string(),
            "statusCode": status,
            "details": errors.clone().unwrap_or(Value::Null),
        }),
        _ => json!({ "error": err.to_string() }),
    }
}
