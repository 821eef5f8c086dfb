//! Issuer demo driving one agent through schema publication, connection,
//! credential issuance and proof verification

pub mod config;
pub mod handler;
pub mod prompt;
pub mod scenario;

pub use config::{DemoPorts, FaberConfig};
pub use handler::FaberHandler;
