//! # Authorization Gate
//!
//! One policy table for every mutating operation, consulted by the registry
//! and both ledgers before they touch any state.
//!
//! | Operation | Policy |
//! |-----------|--------|
//! | `addPartner`, `removePartner` | owner |
//! | `approveRequest`, `rejectRequest`, `expireRequest` | owner |
//! | `askFund`, `createVoucher` | partner (membership at call time) |
//! | `claimVoucher` | stored beneficiary of that voucher |
//! | `reimburseVoucher` | anyone |
//!
//! `reimburseVoucher` is deliberately open: any settling merchant may
//! reimburse a redeemed voucher. Restricting it to a merchant role would be
//! a new `Policy` variant plus a registry set.

use super::entities::Voucher;
use super::registry::AccessRegistry;
use super::value_objects::{Address, VoucherId};
use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a caller was required to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The registry owner.
    Owner,
    /// Any whitelisted partner.
    Partner,
    /// The beneficiary of one specific voucher.
    Beneficiary(VoucherId),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.write_str("the owner"),
            Self::Partner => f.write_str("a partner"),
            Self::Beneficiary(id) => write!(f, "the beneficiary of {id}"),
        }
    }
}

/// Who may invoke an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Caller must be the owner.
    OwnerOnly,
    /// Caller must be whitelisted.
    PartnerOnly,
    /// Caller must equal the record's beneficiary.
    BeneficiaryOnly,
    /// No caller restriction.
    Open,
}

/// Every state-changing operation of the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Whitelist a partner.
    AddPartner,
    /// Revoke a partner for future operations.
    RemovePartner,
    /// Create a fund request.
    AskFund,
    /// Move a pending request to `EXECUTED`.
    ApproveRequest,
    /// Move a pending request to `REJECTED`.
    RejectRequest,
    /// Move a pending request to `EXPIRED`.
    ExpireRequest,
    /// Issue a voucher.
    CreateVoucher,
    /// Redeem a voucher.
    ClaimVoucher,
    /// Settle a redeemed voucher.
    ReimburseVoucher,
}

impl Operation {
    /// All operations, in table order.
    pub const ALL: [Self; 9] = [
        Self::AddPartner,
        Self::RemovePartner,
        Self::AskFund,
        Self::ApproveRequest,
        Self::RejectRequest,
        Self::ExpireRequest,
        Self::CreateVoucher,
        Self::ClaimVoucher,
        Self::ReimburseVoucher,
    ];

    /// The caller policy for this operation.
    #[must_use]
    pub const fn policy(self) -> Policy {
        match self {
            Self::AddPartner
            | Self::RemovePartner
            | Self::ApproveRequest
            | Self::RejectRequest
            | Self::ExpireRequest => Policy::OwnerOnly,
            Self::AskFund | Self::CreateVoucher => Policy::PartnerOnly,
            Self::ClaimVoucher => Policy::BeneficiaryOnly,
            Self::ReimburseVoucher => Policy::Open,
        }
    }

    /// Operation name as exposed on the command interface.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddPartner => "addPartner",
            Self::RemovePartner => "removePartner",
            Self::AskFund => "askFund",
            Self::ApproveRequest => "approveRequest",
            Self::RejectRequest => "rejectRequest",
            Self::ExpireRequest => "expireRequest",
            Self::CreateVoucher => "createVoucher",
            Self::ClaimVoucher => "claimVoucher",
            Self::ReimburseVoucher => "reimburseVoucher",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only view over the registry that answers "may `caller` do `op`?".
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate<'a> {
    registry: &'a AccessRegistry,
}

impl<'a> AuthorizationGate<'a> {
    /// Creates a gate backed by `registry`.
    #[must_use]
    pub fn new(registry: &'a AccessRegistry) -> Self {
        Self { registry }
    }

    /// Checks an operation whose policy does not depend on a record.
    ///
    /// Beneficiary-only operations fail closed here; use
    /// [`authorize_voucher`](Self::authorize_voucher) for them.
    ///
    /// # Errors
    ///
    /// `Unauthorized` naming the role the caller lacked.
    pub fn authorize(&self, caller: Address, op: Operation) -> Result<(), LedgerError> {
        self.check(caller, op, None)
    }

    /// Checks an operation against a specific voucher.
    ///
    /// # Errors
    ///
    /// `Unauthorized` naming the role the caller lacked.
    pub fn authorize_voucher(
        &self,
        caller: Address,
        op: Operation,
        voucher: &Voucher,
    ) -> Result<(), LedgerError> {
        self.check(caller, op, Some(voucher))
    }

    fn check(
        &self,
        caller: Address,
        op: Operation,
        voucher: Option<&Voucher>,
    ) -> Result<(), LedgerError> {
        let required = match op.policy() {
            Policy::Open => return Ok(()),
            Policy::OwnerOnly if self.registry.is_owner(caller) => return Ok(()),
            Policy::OwnerOnly => Role::Owner,
            Policy::PartnerOnly if self.registry.is_partner(caller) => return Ok(()),
            Policy::PartnerOnly => Role::Partner,
            Policy::BeneficiaryOnly => match voucher {
                Some(v) if v.beneficiary == caller => return Ok(()),
                Some(v) => Role::Beneficiary(v.id),
                // Id 0 never names a record.
                None => Role::Beneficiary(VoucherId(0)),
            },
        };
        Err(LedgerError::Unauthorized { caller, required })
    }
}

// =============================================================================
// TESTS
// =============================================================================
