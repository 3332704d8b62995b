//! In-memory event sink that keeps every record, for tests and audits.

use crate::events::{EventRecord, LedgerEvent};
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;

/// Append-only log of emitted events.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    records: Mutex<Vec<EventRecord>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record so far.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().clone()
    }

    /// Snapshot of the bare events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.records.lock().iter().map(|r| r.event.clone()).collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// The most recent record.
    #[must_use]
    pub fn last(&self) -> Option<EventRecord> {
        self.records.lock().last().cloned()
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<EventRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl EventSink for InMemoryEventLog {
    fn emit(&self, record: EventRecord) {
        self.records.lock().push(record);
    }
}
