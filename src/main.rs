//! Bulk Entra ID user importer.
//!
//! Reads provisioning records from a CSV file and creates the accounts in
//! Microsoft Entra ID, assigning each newly created account to a named
//! directory role.

#![deny(clippy::all)]

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use entra_bulk_import::auth::CredentialProvider;
use entra_bulk_import::config::Config;
use entra_bulk_import::graph::GraphClient;
use entra_bulk_import::import::{BulkImporter, CancelFlag, ImportSummary, RecordFile};

#[tokio::main]
async fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("\nPlease set the following environment variables:");
            eprintln!("  AZURE_TENANT_ID=<your-tenant-id>");
            eprintln!("  AZURE_CLIENT_ID=<your-azure-ad-client-id>");
            eprintln!("  AZURE_CLIENT_SECRET=<your-azure-ad-client-secret>");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    info!("Starting {} v{}", config.app.name, env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&config).await {
        error!("Import run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

/// Sequence the run: wait for the operator, provision every record, wait again.
async fn run(config: &Config) -> Result<()> {
    let credentials = Arc::new(CredentialProvider::new(config)?);
    let graph = Arc::new(GraphClient::new(config, Arc::clone(&credentials))?);

    let source = RecordFile::open(&config.import.csv_path)
        .with_context(|| format!("Failed to read input file {}", config.import.csv_path))?;
    info!(
        "Loaded {} data lines from {}",
        source.data_line_count(),
        config.import.csv_path
    );

    // A valid credential is a pre-condition for every record; fail the run
    // up front rather than once per record.
    credentials
        .get_token()
        .await
        .context("Authentication failed")?;

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCtrl-C received, stopping after the current record.");
                cancel.cancel();
            }
        });
    }

    wait_for_operator("Press Enter to start user registration.")?;

    let importer = BulkImporter::new(graph);
    let reports = importer
        .run(source.records(), &cancel)
        .await
        .context("Authentication failed")?;

    println!("{}", ImportSummary::summarize(&reports));

    wait_for_operator("Press Enter to exit.")?;

    Ok(())
}

/// Block until the operator confirms with a key press.
fn wait_for_operator(prompt: &str) -> io::Result<()> {
    println!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
