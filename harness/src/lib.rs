//! Harness for driving an external agent process in demos and tests
//!
//! A [`DemoAgent`] spawns the agent binary, waits for its admin API to come
//! up, relays the process output into the log, forwards admin calls and
//! receives the agent's webhooks.
//!
//! ```text
//! DemoAgent ── spawn ──────────▶ agent process ── stdout/stderr ──▶ output relay
//!     │                               ▲   │
//!     ├── admin GET/POST ─────────────┘   │
//!     └── webhook listener ◀── POST /webhooks/topic/{topic}/
//! ```

pub mod admin;
pub mod agent;
pub mod config;
pub mod constants;
pub mod errors;
pub mod genesis;
pub mod output;
pub mod process;
pub mod readiness;
pub mod timing;
pub mod webhooks;

pub use admin::AdminClient;
pub use agent::{AgentArg, AgentOptions, DemoAgent};
pub use config::{RunMode, Settings};
pub use errors::HarnessError;
pub use output::{OutputCallback, OutputSource};
pub use readiness::ReadinessProbe;
pub use timing::{format_timing, TimingReport};
pub use webhooks::{WebhookHandler, WebhookServer};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the `tracing` subscriber used by demo binaries
pub fn init_logging(crate_name: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("{}=info", crate_name).parse()?)
        .add_directive("harness=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}
