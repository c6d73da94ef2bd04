//! Event → artifact pipelines
//!
//! - save events → archive runner (1 s cooldown)
//! - diagnostics changes → snapshot → de-dup → snapshot runner (5 s cooldown)
//!
//! Both wire a subscription on an `EventStream` into a runner trigger. The
//! two pipelines share no in-memory state.

use crate::diagnostics::{DiagnosticsStore, SnapshotDeduplicator};
use ipm_core::Reporter;
use parking_lot::Mutex;
use std::sync::Arc;
use watcher::{DebouncedRunner, EventSource, EventStream, SourceError};

/// Every save event fires the archive runner
pub fn wire_save_pipeline<E, S>(
    stream: &mut EventStream<E, S>,
    runner: &DebouncedRunner<()>,
) -> Result<(), SourceError>
where
    E: 'static,
    S: EventSource<E>,
{
    let trigger = runner.trigger_handle();
    stream.subscribe(move |_event| trigger.fire(()))
}

/// Each change re-reads the store; only a changed serialization is forwarded
pub fn wire_diagnostics_pipeline<S>(
    stream: &mut EventStream<(), S>,
    store: Arc<DiagnosticsStore>,
    runner: &DebouncedRunner<String>,
    reporter: Arc<dyn Reporter>,
) -> Result<(), SourceError>
where
    S: EventSource<()>,
{
    let trigger = runner.trigger_handle();
    let dedup = Mutex::new(SnapshotDeduplicator::new());

    stream.subscribe(move |()| {
        let json = match store.snapshot().to_json() {
            Ok(json) => json,
            Err(e) => {
                reporter.error(&e.to_string());
                return;
            }
        };

        if let Some(changed) = dedup.lock().admit(json) {
            trigger.fire(changed);
        }
    })
}
