// File: harness/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;

use crate::constants::network;

/// Deployment mode selected by `RUNMODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Agent runs on the host network
    Host,
    /// Agent and harness run in containers reaching each other via the docker host
    Docker,
}

impl RunMode {
    pub fn is_docker(&self) -> bool {
        matches!(self, RunMode::Docker)
    }
}

/// Environment-derived defaults for every agent in a demo run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub run_mode: RunMode,
    pub internal_host: String,
    pub external_host: String,
    pub bin_path: String,
    pub python_path: String,
    /// Use the postgres wallet backend unless an agent overrides it
    pub postgres: bool,
}

impl Settings {
    /// Resolve settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let postgres = lookup("POSTGRES").is_some_and(|v| !v.is_empty());

        match lookup("RUNMODE").as_deref() {
            Some("docker") => {
                let host = lookup("DOCKERHOST")
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| network::DOCKER_HOST.to_string());
                Self {
                    run_mode: RunMode::Docker,
                    internal_host: host.clone(),
                    external_host: host,
                    bin_path: "./bin".to_string(),
                    python_path: ".".to_string(),
                    postgres,
                }
            }
            _ => Self {
                run_mode: RunMode::Host,
                internal_host: network::INTERNAL_HOST.to_string(),
                external_host: network::EXTERNAL_HOST.to_string(),
                bin_path: "../bin".to_string(),
                python_path: "..".to_string(),
                postgres,
            },
        }
    }

    /// Base URL of the ledger browser for this deployment
    pub fn ledger_url(&self) -> String {
        format!("http://{}:{}", self.external_host, network::LEDGER_PORT)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
