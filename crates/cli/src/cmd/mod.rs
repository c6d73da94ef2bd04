//! CLI command implementations

pub mod backup;
pub mod config;
pub mod hints;
pub mod scores;
pub mod snapshot;
pub mod watch;
