//! Outbound (Driven) ports for the cash transfer ledger.

use crate::domain::value_objects::Timestamp;
use crate::events::EventRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Receives every event the ledger emits, in emission order.
///
/// Called while the ledger lock is held, so implementations must not call
/// back into the ledger and should return quickly.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, record: EventRecord);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, record: EventRecord) {
        (**self).emit(record);
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _record: EventRecord) {}
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    /// Creates a clock reading `initial`.
    #[must_use]
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the clock to `time`.
    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        let source = SystemTimeSource;
        let now = source.now();

        // Should be a reasonable timestamp (after year 2020)
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn test_manual_time_source() {
        let clock = Arc::new(ManualTimeSource::new(1_000));
        assert_eq!(clock.now(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now(), 1_500);

        clock.set(42);
        assert_eq!(TimeSource::now(&clock), 42);
    }
}
