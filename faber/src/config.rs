// File: faber/src/config.rs
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Optional overrides for a demo run, read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaberConfig {
    /// First of the three consecutive ports (inbound, admin, webhooks)
    pub start_port: Option<u16>,
    pub bin_path: Option<String>,
    pub python_path: Option<String>,
    pub timing: Option<bool>,
}

impl FaberConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Ports used by one demo agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoPorts {
    pub http: u16,
    pub admin: u16,
    pub webhook: u16,
}

impl DemoPorts {
    pub fn from_start(start_port: u16) -> Result<Self> {
        let admin = start_port
            .checked_add(1)
            .ok_or_else(|| anyhow!("Start port {} too high", start_port))?;
        let webhook = start_port
            .checked_add(2)
            .ok_or_else(|| anyhow!("Start port {} too high", start_port))?;
        Ok(Self {
            http: start_port,
            admin,
            webhook,
        })
    }
}
