pub mod cli; // risk-triage binary commands
pub mod config;
pub mod db;
pub mod journal; // Symptom logging and history
pub mod models;
pub mod risk; // Tiered risk scoring
pub mod state;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    tracing::info!("RiskTriage starting v{}", config::APP_VERSION);

    match cli::execute(cli.command) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            if e.is_not_found() {
                ExitCode::from(3)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
