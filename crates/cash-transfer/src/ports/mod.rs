//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Port (Inbound)**: `CashTransferApi`
//! - **Driven Ports (Outbound)**: `EventSink`, `TimeSource`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
