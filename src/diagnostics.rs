//! Diagnostics sink: structured events for each core operation.
//!
//! The core does not own a logging subsystem. Callers hand in a sink; the
//! default forwards events to `tracing`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

/// One completed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    /// Operation name, e.g. `generate_embeddings` or `rank`.
    pub operation: &'static str,
    pub duration: Duration,
    pub input_size: usize,
    pub output_size: usize,
}

impl DiagnosticEvent {
    pub fn new(
        operation: &'static str,
        duration: Duration,
        input_size: usize,
        output_size: usize,
    ) -> Self {
        Self {
            operation,
            duration,
            input_size,
            output_size,
        }
    }
}

/// Receives diagnostic events. Must be cheap; it is called inline.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: &DiagnosticEvent);
}

/// Emits each event as a `tracing` debug record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent) {
        debug!(
            operation = event.operation,
            duration_ms = event.duration.as_millis() as u64,
            input_size = event.input_size,
            output_size = event.output_size,
            "operation complete"
        );
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Recorded events for one operation.
    pub fn events_for(&self, operation: &str) -> Vec<DiagnosticEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.operation == operation)
            .collect()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: &DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// The sink used when a caller does not supply one.
pub fn default_sink() -> Arc<dyn DiagnosticsSink> {
    Arc::new(TracingSink)
}
