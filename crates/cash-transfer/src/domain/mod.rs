//! # Domain Layer (Inner Hexagon)
//!
//! Pure ledger logic: identities, records, status machines and the
//! authorization gate. No I/O, no locking, no clocks; callers pass `now`.

pub mod authorization;
pub mod entities;
pub mod fund_ledger;
pub mod invariants;
pub mod registry;
pub mod value_objects;
pub mod voucher_ledger;

pub use authorization::*;
pub use entities::*;
pub use fund_ledger::*;
pub use invariants::*;
pub use registry::*;
pub use value_objects::*;
pub use voucher_ledger::*;
