//! Push-based event sequences over host event registration
//!
//! A host exposes events as `register(callback) -> unregister`. `EventStream`
//! wraps one such source and allows a single active subscription at a time;
//! events emitted while nobody is subscribed are dropped.

use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Callback invoked for each delivered event
pub type Callback<E> = Box<dyn Fn(E) + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("event stream already has an active subscription")]
    AlreadySubscribed,
}

/// Host-side event registration primitive
pub trait EventSource<E> {
    /// Register a callback; the returned handle releases it
    fn register(&self, callback: Callback<E>) -> Registration;
}

/// Handle releasing a host registration exactly once
///
/// Released explicitly with `unregister` or implicitly on drop.
#[must_use = "dropping a Registration releases it immediately"]
pub struct Registration {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Registration {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unregister(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Push-based sequence over an event source
pub struct EventStream<E, S> {
    source: S,
    active: Option<Registration>,
    _event: PhantomData<fn(E)>,
}

impl<E, S: EventSource<E>> EventStream<E, S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            active: None,
            _event: PhantomData,
        }
    }

    /// Start delivering events to `handler`
    pub fn subscribe<F>(&mut self, handler: F) -> Result<(), SourceError>
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        if self.active.is_some() {
            return Err(SourceError::AlreadySubscribed);
        }
        self.active = Some(self.source.register(Box::new(handler)));
        Ok(())
    }

    /// Stop delivery and release the host registration
    pub fn unsubscribe(&mut self) {
        if let Some(registration) = self.active.take() {
            registration.unregister();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.active.is_some()
    }
}

struct EmitterInner<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Arc<dyn Fn(E) + Send + Sync>)>>,
}

/// In-process event source
///
/// Stands in for a host event: `emit` delivers synchronously to every
/// registered callback, in registration order.
pub struct Emitter<E> {
    inner: Arc<EmitterInner<E>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Clone> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Emitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                next_id: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Deliver an event to all current listeners
    pub fn emit(&self, event: E) {
        // Snapshot so callbacks may (un)register without deadlocking
        let listeners: Vec<_> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl<E: Clone + 'static> EventSource<E> for Emitter<E> {
    fn register(&self, callback: Callback<E>) -> Registration {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::from(callback)));

        let inner = Arc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }
}
