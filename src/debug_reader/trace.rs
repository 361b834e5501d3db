//! Append-only audit trail of pipeline stages.

use serde::Serialize;

/// One recorded pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub step: String,
    pub details: String,
}

/// Ordered log of what the decode pipeline attempted for a single request.
///
/// Entries can only be appended. Each entry is also emitted as a debug event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DebugTrace {
    entries: Vec<TraceEntry>,
}

impl DebugTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn record(&mut self, step: impl Into<String>, details: impl Into<String>) {
        let entry = TraceEntry {
            step: step.into(),
            details: details.into(),
        };
        tracing::debug!(step = %entry.step, details = %entry.details, "Debug reader step");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Steps recorded under the given name, in order.
    pub fn details_for<'a>(&'a self, step: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.step == step)
            .map(|e| e.details.as_str())
    }
}
