use anyhow::{anyhow, Result};
use reqwest::Client;
use std::path::Path;
use tracing::error;

use crate::config::Settings;

/// File holding the genesis transactions when running on the host network
pub const LOCAL_GENESIS_FILE: &str = "local-genesis.txt";

/// Genesis transactions for the demo ledger.
///
/// Containerised runs fetch them from the ledger browser; host runs read
/// [`LOCAL_GENESIS_FILE`]. Failures are logged and yield `None`.
pub async fn default_genesis_txns(settings: &Settings, client: &Client) -> Option<String> {
    let loaded = if settings.run_mode.is_docker() {
        fetch_genesis(client, &settings.ledger_url()).await
    } else {
        read_genesis(Path::new(LOCAL_GENESIS_FILE)).await
    };

    match loaded {
        Ok(genesis) => Some(genesis),
        Err(e) => {
            error!("Error loading genesis transactions: {}", e);
            None
        }
    }
}

/// `GET {ledger_url}/genesis`
pub async fn fetch_genesis(client: &Client, ledger_url: &str) -> Result<String> {
    let url = format!("{}/genesis", ledger_url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| anyhow!("Genesis request to {} failed: {}", url, e))?;
    response
        .text()
        .await
        .map_err(|e| anyhow!("Failed to read genesis from {}: {}", url, e))
}

pub async fn read_genesis(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))
}
