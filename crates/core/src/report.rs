//! Reporting sink injected into pipeline components
//!
//! Components never log through process-wide state directly; they are handed
//! a `Reporter` at construction. The default forwards to `tracing`.

use parking_lot::Mutex;

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warn,
    Error,
}

/// Sink for component-level status messages
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Reporter that emits `tracing` events tagged with a component name
#[derive(Debug, Clone, Copy)]
pub struct TracingReporter {
    component: &'static str,
}

impl TracingReporter {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(component = self.component, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(component = self.component, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(component = self.component, "{}", message);
    }
}

/// Reporter that keeps every message in memory
///
/// Used by tests and by embedders that surface messages themselves.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(ReportLevel, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages recorded so far, oldest first
    pub fn messages(&self) -> Vec<(ReportLevel, String)> {
        self.messages.lock().clone()
    }

    /// Messages recorded at the given level
    pub fn at(&self, level: ReportLevel) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: ReportLevel, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(ReportLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(ReportLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(ReportLevel::Error, message);
    }
}
