//! # Domain Invariants
//!
//! Structural invariants of the ledger state. The service re-checks them in
//! debug builds after every successful mutation.
//!
//! - Counters equal the number of stored records.
//! - Ids are exactly `1..=counter`, with each record stored under its own id.
//! - No zero address is ever whitelisted or stored as partner/beneficiary.

use super::fund_ledger::FundRequestLedger;
use super::registry::AccessRegistry;
use super::voucher_ledger::VoucherLedger;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Request ids are `1..=counter` with no gaps.
#[must_use]
pub fn check_request_ids_contiguous(requests: &FundRequestLedger) -> bool {
    let mut expected = 1;
    for request in requests.iter() {
        if request.id.get() != expected {
            return false;
        }
        expected += 1;
    }
    expected - 1 == requests.counter()
}

/// Voucher ids are `1..=counter` with no gaps.
#[must_use]
pub fn check_voucher_ids_contiguous(vouchers: &VoucherLedger) -> bool {
    let mut expected = 1;
    for voucher in vouchers.iter() {
        if voucher.id.get() != expected {
            return false;
        }
        expected += 1;
    }
    expected - 1 == vouchers.counter()
}

/// The whitelist and every stored identity are non-zero.
#[must_use]
pub fn check_no_zero_identities(
    registry: &AccessRegistry,
    requests: &FundRequestLedger,
    vouchers: &VoucherLedger,
) -> bool {
    registry.partners().iter().all(|p| !p.is_zero())
        && requests.iter().all(|r| !r.partner.is_zero())
        && vouchers
            .iter()
            .all(|v| !v.partner.is_zero() && !v.beneficiary.is_zero())
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    registry: &AccessRegistry,
    requests: &FundRequestLedger,
    vouchers: &VoucherLedger,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_request_ids_contiguous(requests) {
        violations.push(InvariantViolation::RequestIdsNotContiguous {
            counter: requests.counter(),
            stored: requests.iter().count(),
        });
    }

    if !check_voucher_ids_contiguous(vouchers) {
        violations.push(InvariantViolation::VoucherIdsNotContiguous {
            counter: vouchers.counter(),
            stored: vouchers.iter().count(),
        });
    }

    if !check_no_zero_identities(registry, requests, vouchers) {
        violations.push(InvariantViolation::ZeroIdentityStored);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Request store does not hold exactly ids `1..=counter`.
    RequestIdsNotContiguous { counter: u64, stored: usize },
    /// Voucher store does not hold exactly ids `1..=counter`.
    VoucherIdsNotContiguous { counter: u64, stored: usize },
    /// A zero address was whitelisted or stored on a record.
    ZeroIdentityStored,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestIdsNotContiguous { counter, stored } => {
                write!(f, "request ids not contiguous: counter {counter}, {stored} stored")
            }
            Self::VoucherIdsNotContiguous { counter, stored } => {
                write!(f, "voucher ids not contiguous: counter {counter}, {stored} stored")
            }
            Self::ZeroIdentityStored => write!(f, "zero address stored as an identity"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
