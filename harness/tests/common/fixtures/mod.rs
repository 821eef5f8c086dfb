//! This module provides reusable test utilities:
//! - Mock HTTP servers (admin API, ledger)
//! - Recording webhook handler and output relay
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_admin;
pub mod mock_ledger;
pub mod recorders;
pub mod test_data;

// Re-export commonly used items
pub use mock_admin::MockAdminServer;
pub use mock_ledger::MockLedgerServer;
pub use recorders::{OutputRecorder, RecordingHandler};
pub use test_data::*;
