//! # Event Schema
//!
//! Every successful mutation emits exactly one [`LedgerEvent`], wrapped in an
//! [`EventRecord`] envelope carrying a unique id and a gap-free sequence
//! number. Failed operations and idempotent partner no-ops emit nothing.
//!
//! | Event | Topic |
//! |-------|-------|
//! | `PartnerAdded` | `cash_transfer.partner.added` |
//! | `PartnerRemoved` | `cash_transfer.partner.removed` |
//! | `FundRequested` | `cash_transfer.request.created` |
//! | `RequestApproved` | `cash_transfer.request.approved` |
//! | `RequestRejected` | `cash_transfer.request.rejected` |
//! | `RequestExpired` | `cash_transfer.request.expired` |
//! | `VoucherCreated` | `cash_transfer.voucher.created` |
//! | `VoucherClaimed` | `cash_transfer.voucher.claimed` |
//! | `VoucherReimbursed` | `cash_transfer.voucher.reimbursed` |

use crate::domain::value_objects::{
    decimal_amount, Address, Amount, RequestId, Timestamp, VoucherId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// LEDGER EVENTS
// =============================================================================

/// A state change on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    /// Owner whitelisted a partner.
    PartnerAdded {
        /// Newly whitelisted identity.
        partner: Address,
    },
    /// Owner revoked a partner.
    PartnerRemoved {
        /// Revoked identity.
        partner: Address,
    },
    /// Partner created a fund request.
    FundRequested {
        /// New request id.
        id: RequestId,
        /// Requesting partner.
        partner: Address,
        /// Request label.
        title: String,
        /// Requested amount.
        #[serde(with = "decimal_amount")]
        amount: Amount,
    },
    /// Owner approved a request.
    RequestApproved {
        /// Approved request.
        id: RequestId,
    },
    /// Owner rejected a request.
    RequestRejected {
        /// Rejected request.
        id: RequestId,
    },
    /// A pending request timed out, by owner call or sweep.
    RequestExpired {
        /// Expired request.
        id: RequestId,
    },
    /// Partner issued a voucher.
    VoucherCreated {
        /// New voucher id.
        id: VoucherId,
        /// Issuing partner.
        partner: Address,
        /// Identity entitled to claim.
        beneficiary: Address,
        /// Credit amount.
        #[serde(with = "decimal_amount")]
        amount: Amount,
    },
    /// Beneficiary redeemed a voucher.
    VoucherClaimed {
        /// Claimed voucher.
        id: VoucherId,
        /// Claiming beneficiary.
        beneficiary: Address,
    },
    /// A merchant settled a redeemed voucher.
    VoucherReimbursed {
        /// Settled voucher.
        id: VoucherId,
        /// Settling caller.
        merchant: Address,
    },
}

impl LedgerEvent {
    /// Dotted topic this event is published under.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::PartnerAdded { .. } => topics::PARTNER_ADDED,
            Self::PartnerRemoved { .. } => topics::PARTNER_REMOVED,
            Self::FundRequested { .. } => topics::REQUEST_CREATED,
            Self::RequestApproved { .. } => topics::REQUEST_APPROVED,
            Self::RequestRejected { .. } => topics::REQUEST_REJECTED,
            Self::RequestExpired { .. } => topics::REQUEST_EXPIRED,
            Self::VoucherCreated { .. } => topics::VOUCHER_CREATED,
            Self::VoucherClaimed { .. } => topics::VOUCHER_CLAIMED,
            Self::VoucherReimbursed { .. } => topics::VOUCHER_REIMBURSED,
        }
    }
}

/// Envelope delivered to event sinks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique id for deduplication downstream.
    pub event_id: Uuid,
    /// Position in the ledger's event stream, starting at 1.
    pub sequence: u64,
    /// Emission time (ms).
    pub emitted_at: Timestamp,
    /// The event itself.
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Wraps `event` with a fresh v4 id.
    #[must_use]
    pub fn new(sequence: u64, emitted_at: Timestamp, event: LedgerEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            sequence,
            emitted_at,
            event,
        }
    }

    /// Shorthand for `self.event.topic()`.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        self.event.topic()
    }
}

// =============================================================================
// EVENT TOPICS
// =============================================================================

/// Topic strings for published ledger events.
pub mod topics {
    /// Partner whitelisted.
    pub const PARTNER_ADDED: &str = "cash_transfer.partner.added";

    /// Partner revoked.
    pub const PARTNER_REMOVED: &str = "cash_transfer.partner.removed";

    /// Fund request created.
    pub const REQUEST_CREATED: &str = "cash_transfer.request.created";

    /// Fund request approved.
    pub const REQUEST_APPROVED: &str = "cash_transfer.request.approved";

    /// Fund request rejected.
    pub const REQUEST_REJECTED: &str = "cash_transfer.request.rejected";

    /// Fund request expired.
    pub const REQUEST_EXPIRED: &str = "cash_transfer.request.expired";

    /// Voucher issued.
    pub const VOUCHER_CREATED: &str = "cash_transfer.voucher.created";

    /// Voucher redeemed.
    pub const VOUCHER_CLAIMED: &str = "cash_transfer.voucher.claimed";

    /// Voucher settled.
    pub const VOUCHER_REIMBURSED: &str = "cash_transfer.voucher.reimbursed";
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        let event = LedgerEvent::FundRequested {
            id: RequestId(1),
            partner: Address::repeat_byte(0xaa),
            title: "Rent".into(),
            amount: Amount::from(500),
        };
        assert_eq!(event.topic(), "cash_transfer.request.created");
        assert_eq!(
            LedgerEvent::VoucherReimbursed {
                id: VoucherId(1),
                merchant: Address::repeat_byte(0xcc),
            }
            .topic(),
            topics::VOUCHER_REIMBURSED
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::VoucherCreated {
            id: VoucherId(3),
            partner: Address::repeat_byte(0x11),
            beneficiary: Address::repeat_byte(0x22),
            amount: Amount::from(100),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "VoucherCreated");
        assert_eq!(json["id"], 3);
        assert_eq!(json["amount"], "100");
        assert_eq!(
            json["beneficiary"],
            "0x2222222222222222222222222222222222222222"
        );

        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_record_ids_unique() {
        let a = EventRecord::new(1, 0, LedgerEvent::RequestApproved { id: RequestId(1) });
        let b = EventRecord::new(2, 0, LedgerEvent::RequestApproved { id: RequestId(1) });
        assert_ne!(a.event_id, b.event_id);
        assert_eq!(a.topic(), topics::REQUEST_APPROVED);
    }
}
