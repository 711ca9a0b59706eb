//! Logging sink used by the transfer core
//!
//! Core operations never reach for the global subscriber directly; they
//! report through an [`EventSink`]. The binary wires in [`TracingSink`],
//! tests use [`MemorySink`] to inspect what was reported.

use std::cell::RefCell;
use std::fmt;

/// Severity of a reported event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Error,
}

/// Receiver for progress and failure events
pub trait EventSink {
    fn record(&self, severity: Severity, message: fmt::Arguments<'_>);

    fn debug(&self, message: fmt::Arguments<'_>) {
        self.record(Severity::Debug, message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        self.record(Severity::Error, message);
    }
}

/// Forwards events to `tracing` under the `copia` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, severity: Severity, message: fmt::Arguments<'_>) {
        match severity {
            Severity::Debug => tracing::debug!(target: "copia", "{}", message),
            Severity::Error => tracing::error!(target: "copia", "{}", message),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _severity: Severity, _message: fmt::Arguments<'_>) {}
}

/// Keeps every event in memory, in order
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Severity, String)> {
        self.events.borrow().clone()
    }

    /// Messages recorded at error severity
    pub fn errors(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(severity, _)| *severity == Severity::Error)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// True if any message at any severity contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.events
            .borrow()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl EventSink for MemorySink {
    fn record(&self, severity: Severity, message: fmt::Arguments<'_>) {
        self.events.borrow_mut().push((severity, message.to_string()));
    }
}
