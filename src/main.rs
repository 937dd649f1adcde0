// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;
use std::time::Instant;

use deltascan::config::constants::env;
use deltascan::{AnalyzerConfig, BalanceAnalyzer, DeltascanError};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let level = std::env::var(env::LOG_LEVEL).unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let production = std::env::var(env::ENVIRONMENT).is_ok_and(|v| v == "production");
    if production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AnalyzerConfig) -> Result<(), DeltascanError> {
    let analyzer = BalanceAnalyzer::from_config(&config)?;
    analyzer.bootstrap().await;

    let started = Instant::now();
    let cycle = analyzer.run_cycle().await;
    let elapsed = started.elapsed();

    // Keep whatever was fetched even if the cycle failed
    if let Err(e) = analyzer.shutdown().await {
        tracing::warn!(error = %e, "Failed to save block cache snapshot");
    }

    let outcome = cycle?;
    match serde_json::to_string_pretty(&outcome.result) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode result"),
    }
    println!(
        "Analyzed {} transactions in {:.2?}",
        outcome.transactions_analyzed, elapsed
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Loads .env first so LOG_LEVEL and ENV from the file reach the logger
    let config = AnalyzerConfig::from_env();
    init_logging();

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        tracing::error!("Balance analysis failed: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
