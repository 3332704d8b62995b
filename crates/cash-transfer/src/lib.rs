//! # Cash Transfer - Fund Request & Voucher Ledger
//!
//! An owner whitelists partners. Partners raise fund requests that the owner
//! approves, rejects or expires, and issue vouchers that only the named
//! beneficiary may claim and any merchant may then reimburse.
//!
//! ## Lifecycles
//!
//! ```text
//! FundRequest:  [PENDING] ──approve──→ [EXECUTED]
//!                   ├──────reject───→ [REJECTED]
//!                   └──expire/sweep─→ [EXPIRED]
//!
//! Voucher:      [VALID] ──claim──→ [REDEEMED] ──reimburse──→ [REIMBURSED]
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Ids are sequential from 1, counters only move on success | `domain/fund_ledger.rs`, `domain/voucher_ledger.rs` |
//! | Terminal statuses never change | `domain/entities.rs` - `can_transition_to()`, `next()` |
//! | Checks run before any write | `domain/authorization.rs` - `AuthorizationGate` |
//! | No zero identities stored | `domain/invariants.rs` - `check_no_zero_identities()` |
//! | Event order matches mutation order | `service.rs` - `mutate()` |
//!
//! ## Authorization
//!
//! | Operation | Caller |
//! |-----------|--------|
//! | `add_partner`, `remove_partner` | owner |
//! | `approve_request`, `reject_request`, `expire_request` | owner |
//! | `ask_fund`, `create_voucher` | partner |
//! | `claim_voucher` | that voucher's beneficiary |
//! | `reimburse_voucher` | anyone |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cash_transfer::prelude::*;
//!
//! let ledger = create_test_service(owner);
//! ledger.add_partner(owner, partner)?;
//! let id = ledger.ask_fund(partner, "Rent".into(), Amount::from(500))?;
//! ledger.approve_request(owner, id)?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{FundRequest, FundRequestStatus, Voucher, VoucherStatus};

    // Value objects
    pub use crate::domain::value_objects::{Address, Amount, RequestId, Timestamp, VoucherId, U256};

    // Access control
    pub use crate::domain::authorization::{Operation, Policy, Role};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::CashTransferApi;
    pub use crate::ports::outbound::{
        EventSink, ManualTimeSource, NoopEventSink, SystemTimeSource, TimeSource,
    };

    // Adapters
    pub use crate::adapters::{
        dispatch, handle_line, BroadcastEventSink, Command, CommandResponse, InMemoryEventLog,
    };

    // Events
    pub use crate::events::{topics, EventRecord, LedgerEvent};

    // Errors
    pub use crate::errors::{AddressParseError, ConfigError, ErrorKind, LedgerError};

    // Service
    pub use crate::config::CashTransferConfig;
    pub use crate::service::{create_test_service, CashTransferService, ServiceStats};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
