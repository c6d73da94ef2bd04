//! Workflow integration tests
//!
//! Each module drives one command family through the real binary.

pub mod archive;
pub mod config;
pub mod hints;
pub mod scores;
pub mod snapshot;
#[cfg(unix)]
pub mod watch;
