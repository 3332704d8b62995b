//! # Adapters Layer (Outer Hexagon)
//!
//! - `event_log`: recording sink for tests and audits
//! - `broadcast`: `tokio::sync::broadcast` fan-out sink
//! - `command`: JSON command codec driving `CashTransferApi`

pub mod broadcast;
pub mod command;
pub mod event_log;

pub use broadcast::{BroadcastEventSink, DEFAULT_CHANNEL_CAPACITY};
pub use command::{dispatch, handle_line, Command, CommandResponse, Payload};
pub use event_log::InMemoryEventLog;
