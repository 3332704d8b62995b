//! # Broadcast Event Sink
//!
//! Fans ledger events out to any number of async subscribers.

use crate::events::EventRecord;
use crate::ports::outbound::EventSink;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Event sink backed by `tokio::sync::broadcast`.
///
/// Slow subscribers that fall more than `capacity` events behind observe
/// `RecvError::Lagged` and skip ahead; the ledger itself never blocks.
pub struct BroadcastEventSink {
    sender: broadcast::Sender<EventRecord>,
    events_published: AtomicU64,
    capacity: usize,
}

impl BroadcastEventSink {
    /// Create a sink with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a sink with the given capacity.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero. `CashTransferConfig::validate` rejects that.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to every event emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events handed to the sink, delivered or not.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, record: EventRecord) {
        let topic = record.topic();
        let sequence = record.sequence;
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(record) {
            Ok(receivers) => {
                debug!(topic, sequence, receivers, "Event published");
            }
            Err(_) => {
                // No subscribers; the ledger state is still authoritative.
                debug!(topic, sequence, "Event dropped (no receivers)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::RequestId;
    use crate::events::LedgerEvent;

    fn record(sequence: u64) -> EventRecord {
        EventRecord::new(sequence, 0, LedgerEvent::RequestApproved { id: RequestId(1) })
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let sink = BroadcastEventSink::new();
        sink.emit(record(1));
        assert_eq!(sink.events_published(), 1);
        assert_eq!(sink.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_events_in_order() {
        let sink = BroadcastEventSink::with_capacity(16);
        let mut first = sink.subscribe();
        let mut second = sink.subscribe();
        assert_eq!(sink.subscriber_count(), 2);

        for seq in 1..=3 {
            sink.emit(record(seq));
        }

        for rx in [&mut first, &mut second] {
            for expected in 1..=3 {
                assert_eq!(rx.recv().await.unwrap().sequence, expected);
            }
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let sink = BroadcastEventSink::with_capacity(2);
        let mut rx = sink.subscribe();
        for seq in 1..=5 {
            sink.emit(record(seq));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(rx.recv().await.unwrap().sequence, 4);
    }
}
