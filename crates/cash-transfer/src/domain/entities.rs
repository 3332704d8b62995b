//! Core domain entities: fund requests, vouchers and their status machines.

use super::value_objects::{decimal_amount, Address, Amount, RequestId, Timestamp, VoucherId};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// FUND REQUEST
// =============================================================================

/// Lifecycle of a fund request.
///
/// ```text
///            ┌──approve──→ [EXECUTED]
///            │
/// [PENDING] ─┼──reject───→ [REJECTED]
///            │
///            └──expire───→ [EXPIRED]
/// ```
///
/// Every state except `Pending` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundRequestStatus {
    /// Awaiting an owner decision.
    #[default]
    Pending,
    /// Approved by the owner; funds committed.
    Executed,
    /// Declined by the owner.
    Rejected,
    /// Timed out before a decision was made.
    Expired,
}

impl FundRequestStatus {
    /// Returns true for `Executed`, `Rejected` and `Expired`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if `next` is reachable from `self` in one step.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Pending && next.is_terminal()
    }

    /// Upper-case name used in events and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Executed => "EXECUTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for FundRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partner's request for the owner to release funds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRequest {
    /// Sequential identifier, starting at 1.
    pub id: RequestId,
    /// Free-form label supplied by the partner.
    pub title: String,
    /// Requested amount.
    #[serde(with = "decimal_amount")]
    pub amount: Amount,
    /// Partner that created the request. Never changes.
    pub partner: Address,
    /// Current lifecycle status.
    pub status: FundRequestStatus,
    /// Creation time (ms), used by the expiry policy.
    pub created_at: Timestamp,
}

impl FundRequest {
    /// Creates a new pending request.
    #[must_use]
    pub fn new(
        id: RequestId,
        title: String,
        amount: Amount,
        partner: Address,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            title,
            amount,
            partner,
            status: FundRequestStatus::Pending,
            created_at,
        }
    }

    /// Returns true while the request awaits a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == FundRequestStatus::Pending
    }

    /// Returns true once `ttl_ms` has elapsed since creation.
    #[must_use]
    pub fn is_past_ttl(&self, now: Timestamp, ttl_ms: u64) -> bool {
        now.saturating_sub(self.created_at) >= ttl_ms
    }
}

// =============================================================================
// VOUCHER
// =============================================================================

/// Lifecycle of a voucher.
///
/// ```text
/// [VALID] ──claim (beneficiary)──→ [REDEEMED] ──reimburse (any)──→ [REIMBURSED]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// Issued and not yet claimed.
    #[default]
    Valid,
    /// Claimed by the beneficiary.
    Redeemed,
    /// Settled by a merchant. Terminal.
    Reimbursed,
}

impl VoucherStatus {
    /// The only status reachable from `self`, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Valid => Some(Self::Redeemed),
            Self::Redeemed => Some(Self::Reimbursed),
            Self::Reimbursed => None,
        }
    }

    /// Returns true for `Reimbursed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Upper-case name used in events and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Redeemed => "REDEEMED",
            Self::Reimbursed => "REIMBURSED",
        }
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A redeemable credit issued by a partner to a beneficiary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Sequential identifier, starting at 1.
    pub id: VoucherId,
    /// Credit amount.
    #[serde(with = "decimal_amount")]
    pub amount: Amount,
    /// Issuing partner. Never changes.
    pub partner: Address,
    /// Only identity allowed to claim this voucher. Never changes.
    pub beneficiary: Address,
    /// Current lifecycle status.
    pub status: VoucherStatus,
    /// Creation time (ms).
    pub created_at: Timestamp,
}

impl Voucher {
    /// Creates a new valid voucher.
    #[must_use]
    pub fn new(
        id: VoucherId,
        amount: Amount,
        partner: Address,
        beneficiary: Address,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            amount,
            partner,
            beneficiary,
            status: VoucherStatus::Valid,
            created_at,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
