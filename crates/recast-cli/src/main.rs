//! recast - rename and re-type JSON columns into a columnar output
//!
//! Reads a JSON dataset into an in-memory DuckDB session, applies the
//! `--fields_metadata` directives as one projection, replaces the null token
//! with NULL, prints schemas and previews, and writes the result.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod config;
mod job;
mod logging;

use cli::Cli;
use config::Config;
use job::Job;

fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Run failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_logging_env();
    logging::init().context("Failed to initialize logging")?;

    // Configuration errors surface here, before anything is read or written.
    let job = Job::from_cli(&cli, &config)?;

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);
    let _guard = span.enter();

    tracing::info!(
        input = %job.input_path.display(),
        output = %job.output_path.display(),
        format = %job.output_format,
        directives = job.directives.len(),
        "Starting run"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    job.execute(&mut out)
}
