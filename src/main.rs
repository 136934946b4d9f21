// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use chrono::Local;
use dotenvy::dotenv;
use iex_frames::{compile_dataset, MarketDataClient};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = MarketDataClient::from_env();
    info!(
        endpoint = %client.config().batch_endpoint,
        policy = ?client.config().policy,
        "starting dataset compilation"
    );

    let dataset = compile_dataset(&client)
        .await
        .context("Failed to compile market cap dataset")?;

    // Create output directory if it doesn't exist
    let output_dir = PathBuf::from("output");
    std::fs::create_dir_all(&output_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output_dir.join(format!("marketcap_dataset_{}.csv", timestamp));
    dataset
        .write_csv(&csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    println!("✅ CSV file created at: {}", csv_path.display());
    Ok(())
}
