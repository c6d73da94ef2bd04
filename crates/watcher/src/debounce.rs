//! Debounced, self-serializing action runner
//!
//! Prevents running an expensive action (spawning tar, writing snapshots) for
//! every event in a burst. State machine:
//!
//! ```text
//! Idle --trigger--> Running --done--> CoolingDown --elapsed, pending--> Running
//!                                     CoolingDown --elapsed, nothing--> Idle
//! ```
//!
//! Triggers during `Running`/`CoolingDown` overwrite a single pending slot;
//! only the most recent payload is ever run.

use async_trait::async_trait;
use ipm_core::Reporter;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Asynchronous action driven by a runner
#[async_trait]
pub trait Action<T>: Send + Sync + 'static {
    async fn run(&self, payload: T) -> anyhow::Result<()>;
}

/// Current phase of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    CoolingDown,
}

struct Shared<T> {
    pending: Mutex<Option<T>>,
    state: Mutex<RunnerState>,
    closed: AtomicBool,
}

impl<T> Shared<T> {
    fn set_state(&self, state: RunnerState) {
        *self.state.lock() = state;
    }
}

/// Cloneable handle that feeds payloads into a runner
pub struct Trigger<T> {
    shared: Arc<Shared<T>>,
    wake: mpsc::Sender<()>,
}

impl<T> Clone for Trigger<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            wake: self.wake.clone(),
        }
    }
}

impl<T> Trigger<T> {
    /// Replace the pending payload and wake the runner
    ///
    /// Never blocks. Ignored once the runner is shut down.
    pub fn fire(&self, payload: T) {
        if self.shared.closed.load(Ordering::Acquire) {
            return;
        }
        *self.shared.pending.lock() = Some(payload);
        // A full channel means a wake-up is already queued
        let _ = self.wake.try_send(());
    }
}

/// Runs an action at most once per cooldown, never concurrently with itself
pub struct DebouncedRunner<T> {
    name: String,
    trigger: Trigger<T>,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> DebouncedRunner<T> {
    /// Spawn the runner task on the current tokio runtime
    pub fn spawn<A>(
        name: impl Into<String>,
        action: A,
        cooldown: Duration,
        reporter: Arc<dyn Reporter>,
    ) -> Self
    where
        A: Action<T>,
    {
        let name = name.into();
        let (wake_tx, wake_rx) = mpsc::channel(1);
        let shared = Arc::new(Shared {
            pending: Mutex::new(None),
            state: Mutex::new(RunnerState::Idle),
            closed: AtomicBool::new(false),
        });

        let task = tokio::spawn(run_loop(
            name.clone(),
            Arc::new(action),
            cooldown,
            Arc::clone(&shared),
            wake_rx,
            reporter,
        ));

        Self {
            name,
            trigger: Trigger {
                shared,
                wake: wake_tx,
            },
            task: Some(task),
        }
    }

    pub fn trigger(&self, payload: T) {
        self.trigger.fire(payload);
    }

    /// Handle for event callbacks
    pub fn trigger_handle(&self) -> Trigger<T> {
        self.trigger.clone()
    }

    pub fn state(&self) -> RunnerState {
        *self.trigger.shared.state.lock()
    }

    pub fn has_pending(&self) -> bool {
        self.trigger.shared.pending.lock().is_some()
    }

    /// Stop accepting triggers and wait for the runner task to finish
    ///
    /// An in-flight action completes together with its cooldown; a payload
    /// that has not started yet is discarded.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(runner = %self.name, "runner task ended abnormally: {}", e);
            }
        }
    }
}

impl<T> DebouncedRunner<T> {
    fn close(&self) {
        let shared = &self.trigger.shared;
        shared.closed.store(true, Ordering::Release);
        shared.pending.lock().take();
        let _ = self.trigger.wake.try_send(());
    }
}

impl<T> Drop for DebouncedRunner<T> {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.close();
        }
    }
}

async fn run_loop<T, A>(
    name: String,
    action: Arc<A>,
    cooldown: Duration,
    shared: Arc<Shared<T>>,
    mut wake: mpsc::Receiver<()>,
    reporter: Arc<dyn Reporter>,
) where
    T: Send + 'static,
    A: Action<T>,
{
    tracing::debug!(runner = %name, ?cooldown, "runner started");

    while wake.recv().await.is_some() {
        loop {
            if shared.closed.load(Ordering::Acquire) {
                shared.set_state(RunnerState::Idle);
                tracing::debug!(runner = %name, "runner stopped");
                return;
            }

            let next = shared.pending.lock().take();
            let Some(payload) = next else {
                break;
            };

            shared.set_state(RunnerState::Running);
            invoke(&name, &action, payload, reporter.as_ref()).await;

            shared.set_state(RunnerState::CoolingDown);
            tokio::time::sleep(cooldown).await;
        }
        shared.set_state(RunnerState::Idle);
    }
}

/// Run one invocation; errors and panics end only this invocation
async fn invoke<T, A>(name: &str, action: &Arc<A>, payload: T, reporter: &dyn Reporter)
where
    T: Send + 'static,
    A: Action<T>,
{
    let action = Arc::clone(action);
    match tokio::spawn(async move { action.run(payload).await }).await {
        Ok(Ok(())) => tracing::debug!(runner = %name, "action completed"),
        Ok(Err(e)) => reporter.error(&format!("{} failed: {:#}", name, e)),
        Err(e) if e.is_panic() => reporter.error(&format!("{} panicked", name)),
        Err(e) => reporter.warn(&format!("{} was cancelled: {}", name, e)),
    }
}
