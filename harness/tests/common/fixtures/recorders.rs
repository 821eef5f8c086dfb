//! Handlers that record what the harness hands them

use anyhow::Result;
use async_trait::async_trait;
use harness::{OutputCallback, OutputSource, WebhookHandler};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Webhook handler remembering every dispatched (topic, payload)
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, topic: &str, payload: Value) {
        self.calls.lock().unwrap().push((topic.to_string(), payload));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, topic: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p)
            .collect()
    }
}

#[async_trait]
impl WebhookHandler for RecordingHandler {
    async fn handle_connections(&self, payload: Value) -> Result<()> {
        self.record("connections", payload);
        Ok(())
    }

    async fn handle_credentials(&self, payload: Value) -> Result<()> {
        self.record("credentials", payload);
        Ok(())
    }

    async fn handle_presentations(&self, payload: Value) -> Result<()> {
        self.record("presentations", payload);
        Ok(())
    }

    async fn handle_basicmessages(&self, payload: Value) -> Result<()> {
        self.record("basicmessages", payload);
        Err(anyhow::anyhow!("basicmessages handler failure"))
    }
}

/// Output relay collecting process lines
#[derive(Clone, Default)]
pub struct OutputRecorder {
    lines: Arc<Mutex<Vec<(OutputSource, String)>>>,
}

impl OutputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> OutputCallback {
        let lines = self.lines.clone();
        Arc::new(move |source: OutputSource, line: &str| {
            lines.lock().unwrap().push((source, line.to_string()));
        })
    }

    pub fn lines(&self) -> Vec<(OutputSource, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Wait until at least `count` lines arrived or `timeout` elapsed
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.lines.lock().unwrap().len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.lines.lock().unwrap().len() >= count
    }
}
