//! Error types raised at the harness boundaries
//!
//! Every failure the harness surfaces to a demo run is one of these variants,
//! wrapped in `anyhow::Error`. Callers that need to tell them apart can
//! `downcast_ref::<HarnessError>()`.

use std::fmt;

/// Boundary failures of a demo agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// Admin API answered outside the 2xx range
    UnexpectedStatus { status: u16 },

    /// Admin API body could not be decoded as JSON
    JsonDecode { body: String },

    /// Readiness probe never got a 200 from the admin API
    StartupTimeout { attempts: u32 },

    /// Readiness probe got a 200 that did not look like the agent
    UnexpectedProbeResponse,

    /// Agent process ignored SIGTERM for too long
    TerminateTimeout,

    /// Ledger refused the DID registration
    Registration { status: u16 },

    /// Agent process could not be started
    Spawn { program: String, reason: String },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::UnexpectedStatus { status } => {
                write!(f, "Unexpected HTTP response: {}", status)
            }
            HarnessError::JsonDecode { body } => {
                write!(f, "Error decoding JSON: {}", body)
            }
            HarnessError::StartupTimeout { attempts } => {
                write!(
                    f,
                    "Timed out waiting for agent process to start after {} attempts",
                    attempts
                )
            }
            HarnessError::UnexpectedProbeResponse => {
                write!(f, "Unexpected response from agent process")
            }
            HarnessError::TerminateTimeout => {
                write!(f, "Process did not terminate in time")
            }
            HarnessError::Registration { status } => {
                write!(f, "Error registering DID, response code {}", status)
            }
            HarnessError::Spawn { program, reason } => {
                write!(f, "Failed to spawn '{}': {}", program, reason)
            }
        }
    }
}

impl std::error::Error for HarnessError {}

/// Variant carried by an `anyhow::Error`, if it is one of ours
pub fn harness_error(err: &anyhow::Error) -> Option<&HarnessError> {
    err.downcast_ref::<HarnessError>()
}
