//! Log relay for demo agents
//!
//! Harness messages and the agent process's output streams all end up in
//! `tracing`, tagged with the agent prefix so interleaved runs stay readable.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Which stream of the agent process a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

impl OutputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr => "stderr",
        }
    }
}

/// Receives every line the agent process writes
pub type OutputCallback = Arc<dyn Fn(OutputSource, &str) + Send + Sync>;

/// Column shown in front of every message of an agent
pub fn prefix_str(prefix: Option<&str>) -> Option<String> {
    prefix.map(|p| format!("{:10} |", p))
}

/// Log a harness message under an optional agent prefix
pub fn log_msg(prefix: Option<&str>, msg: &str) {
    match prefix_str(prefix) {
        Some(p) => info!("{} {}", p, msg),
        None => info!("{}", msg),
    }
}

/// Pretty-print a JSON document with an optional label
pub fn log_json(prefix: Option<&str>, label: Option<&str>, data: &Value) {
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    match label {
        Some(label) => log_msg(prefix, &format!("{}\n{}", label, pretty)),
        None => log_msg(prefix, &pretty),
    }
}

/// Relay that forwards process output into `tracing`
///
/// Stdout lines are logged at info, stderr lines at warn.
pub fn tracing_relay(prefix: Option<String>) -> OutputCallback {
    let prefix = prefix_str(prefix.as_deref()).unwrap_or_default();
    Arc::new(move |source: OutputSource, line: &str| {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        match source {
            OutputSource::Stdout => info!(source = source.as_str(), "{} {}", prefix, line),
            OutputSource::Stderr => warn!(source = source.as_str(), "{} {}", prefix, line),
        }
    })
}

/// Logs how long a scope took when dropped
pub struct LogTimer {
    label: String,
    prefix: Option<String>,
    show: bool,
    started: Instant,
}

impl LogTimer {
    pub fn new(label: impl Into<String>, prefix: Option<&str>, show: bool) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.map(str::to_string),
            show,
            started: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Drop for LogTimer {
    fn drop(&mut self) {
        if self.show {
            log_msg(
                self.prefix.as_deref(),
                &format!("{} {:.2}s", self.label, self.elapsed_secs()),
            );
        }
    }
}
