//! Common test data and constants

use harness::{AgentOptions, DemoAgent, ReadinessProbe, Settings};
use std::time::Duration;

/// Swagger document as served by a started agent
pub const SWAGGER_BODY: &str =
    r#"{"swagger": "2.0", "info": {"title": "Aries Cloud Agent", "version": "v1"}}"#;

/// Probe with the production attempt count but a test-friendly interval
pub fn fast_probe() -> ReadinessProbe {
    ReadinessProbe::new(10, Duration::from_millis(10))
}

/// Demo agent whose admin API is the given port on localhost
pub fn agent_on_admin_port(admin_port: u16) -> DemoAgent {
    let options = AgentOptions {
        external_host: Some("127.0.0.1".to_string()),
        prefix: Some("Test".to_string()),
        postgres: Some(false),
        ..Default::default()
    };
    DemoAgent::new("Test Agent", 0, admin_port, &Settings::default(), options)
        .with_readiness_probe(fast_probe())
}

/// Common webhook topics
pub mod topics {
    pub const CONNECTIONS: &str = "connections";
    pub const CREDENTIALS: &str = "credentials";
    pub const PRESENTATIONS: &str = "presentations";
    pub const BASICMESSAGES: &str = "basicmessages";
    pub const RESERVED: &str = "webhook";
}
