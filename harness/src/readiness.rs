//! Readiness detection for a freshly spawned agent
//!
//! The agent serves its API description only once startup is complete, so the
//! probe polls that document on a fixed budget rather than watching the
//! process output.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::constants::readiness;
use crate::errors::HarnessError;

/// Bounded poll loop against the admin API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            attempts: readiness::ATTEMPTS,
            interval: readiness::INTERVAL,
        }
    }
}

impl ReadinessProbe {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Poll `{admin_url}/api/docs/swagger.json` until it answers 200.
    ///
    /// Each attempt sleeps first and may take at most `interval`. Connection
    /// errors, slow answers and non-200 statuses consume an attempt. The 200
    /// body must carry the agent marker.
    pub async fn wait_ready(&self, client: &Client, admin_url: &str) -> Result<()> {
        let url = format!("{}{}", admin_url, readiness::PROBE_PATH);
        let mut body = None;

        for attempt in 1..=self.attempts {
            sleep(self.interval).await;

            match client.get(&url).timeout(self.interval).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    match response.text().await {
                        Ok(text) => {
                            debug!("Agent answered readiness probe on attempt {}", attempt);
                            body = Some(text);
                            break;
                        }
                        Err(e) => debug!("Readiness probe body unreadable: {}", e),
                    }
                }
                Ok(response) => {
                    debug!(
                        "Readiness probe attempt {}/{}: status {}",
                        attempt,
                        self.attempts,
                        response.status()
                    );
                }
                Err(e) => {
                    debug!(
                        "Readiness probe attempt {}/{} failed: {}",
                        attempt, self.attempts, e
                    );
                }
            }
        }

        match body {
            Some(text) if !text.is_empty() => {
                if text.contains(readiness::MARKER) {
                    Ok(())
                } else {
                    Err(HarnessError::UnexpectedProbeResponse.into())
                }
            }
            _ => Err(HarnessError::StartupTimeout {
                attempts: self.attempts,
            }
            .into()),
        }
    }
}
