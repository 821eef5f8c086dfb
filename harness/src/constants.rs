//! Fixed values shared by the demo agent boundaries

use std::time::Duration;

/// Readiness probe constants
pub mod readiness {
    use super::Duration;

    /// Number of probe attempts before giving up
    pub const ATTEMPTS: u32 = 10;

    /// Sleep before each probe attempt
    pub const INTERVAL: Duration = Duration::from_secs(2);

    /// Admin path served once the agent has finished starting
    pub const PROBE_PATH: &str = "/api/docs/swagger.json";

    /// Text the probe body must contain
    pub const MARKER: &str = "Aries Cloud Agent";
}

/// Process lifecycle constants
pub mod process {
    use super::Duration;

    /// How long a terminated agent gets to exit
    pub const TERMINATE_TIMEOUT: Duration = Duration::from_millis(500);

    /// Agent entry point, relative to the bin path
    pub const AGENT_COMMAND: &str = "acagent";

    /// Interpreter used to launch the agent
    pub const INTERPRETER: &str = "python3";
}

/// Network defaults
pub mod network {
    pub const INTERNAL_HOST: &str = "127.0.0.1";
    pub const EXTERNAL_HOST: &str = "localhost";
    pub const DOCKER_HOST: &str = "host.docker.internal";

    /// Address the agent and webhook listeners bind to
    pub const BIND_ALL: &str = "0.0.0.0";

    /// Port of the ledger browser (registration and genesis)
    pub const LEDGER_PORT: u16 = 9000;

    /// Port of the postgres wallet backend
    pub const POSTGRES_PORT: u16 = 5432;
}

/// Wallet defaults
pub mod wallet {
    pub const DEFAULT_TYPE: &str = "indy";
    pub const SEED_PREFIX: &str = "my_seed_000000000000000000000000";
    pub const SEED_LEN: usize = 32;
    pub const POSTGRES_ACCOUNT: &str = "postgres";
    pub const POSTGRES_PASSWORD: &str = "mysecretpassword";
}

/// Timing report layout
pub mod timing {
    pub const NAME_WIDTH: usize = 35;
    pub const RULE_WIDTH: usize = 96;
}
