//! Fallback reporting.
//!
//! The normalizer never fails; when a field has no usable source value it
//! substitutes a fixed fallback and tells a [`NormalizeReporter`] about it.
//! The CLI wires in [`TracingReporter`]; tests use [`CollectingReporter`]
//! to assert on exactly which fields were defaulted.

use std::sync::Mutex;

use crate::models::CanonicalField;

/// A canonical field that took its fallback value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackEvent {
    /// Display identity of the record being normalized.
    pub record_id: String,
    pub field: CanonicalField,
    /// The substituted value, rendered as text.
    pub fallback: String,
}

/// Receives fallback events from the normalizer.
pub trait NormalizeReporter: Send + Sync {
    fn fallback_used(&self, event: &FallbackEvent);
}

/// Emits each fallback as a `WARN` tracing event.
pub struct TracingReporter;

impl NormalizeReporter for TracingReporter {
    fn fallback_used(&self, event: &FallbackEvent) {
        tracing::warn!(
            record = %event.record_id,
            field = %event.field,
            fallback = %event.fallback,
            "document {}: no valid {} found, using {}",
            event.record_id,
            event.field,
            event.fallback
        );
    }
}

/// Discards every event.
pub struct NoReport;

impl NormalizeReporter for NoReport {
    fn fallback_used(&self, _event: &FallbackEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<FallbackEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<FallbackEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events for one field, in order.
    pub fn for_field(&self, field: CanonicalField) -> Vec<FallbackEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.field == field)
            .collect()
    }
}

impl NormalizeReporter for CollectingReporter {
    fn fallback_used(&self, event: &FallbackEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
