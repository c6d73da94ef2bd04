//! Event plumbing for ipmanten
//!
//! This crate provides:
//! - A push-based adapter over host event registration (`source`)
//! - The debounced, self-serializing action runner (`debounce`)
//! - A file system watcher that turns source-file writes into save events (`fs`)

pub mod debounce;
pub mod fs;
pub mod source;

pub use debounce::{Action, DebouncedRunner, RunnerState, Trigger};
pub use fs::{SaveEvent, SaveWatcher, WatchError};
pub use source::{Emitter, EventSource, EventStream, Registration, SourceError};
