//! # Driving Port (API - Inbound)
//!
//! The full operation surface of the ledger. The command adapter and the
//! binary drive the ledger only through this trait.

use crate::domain::entities::{FundRequest, Voucher};
use crate::domain::value_objects::{Address, Amount, RequestId, VoucherId};
use crate::errors::LedgerError;

/// Primary API of the cash transfer ledger.
///
/// Every mutating call takes the caller identity explicitly. A call that
/// returns an error has changed nothing and emitted no event.
///
/// ## Usage
///
/// ```ignore
/// api.add_partner(owner, partner)?;
/// let id = api.ask_fund(partner, "Rent".into(), Amount::from(500))?;
/// api.approve_request(owner, id)?;
/// ```
pub trait CashTransferApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Access registry
    // -------------------------------------------------------------------------

    /// The privileged identity fixed at construction.
    fn owner(&self) -> Address;

    /// Whitelists `identity`. Owner only; idempotent.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `InvalidArgument` for the zero address.
    fn add_partner(&self, caller: Address, identity: Address) -> Result<(), LedgerError>;

    /// Revokes `identity` for future operations. Owner only; idempotent.
    ///
    /// # Errors
    ///
    /// `Unauthorized`.
    fn remove_partner(&self, caller: Address, identity: Address) -> Result<(), LedgerError>;

    /// Returns true if `identity` is currently whitelisted.
    fn is_partner(&self, identity: Address) -> bool;

    /// Sorted snapshot of the whitelist.
    fn partners(&self) -> Vec<Address>;

    // -------------------------------------------------------------------------
    // Fund requests
    // -------------------------------------------------------------------------

    /// Creates a pending fund request. Partner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `InvalidArgument` for an oversized title.
    fn ask_fund(
        &self,
        caller: Address,
        title: String,
        amount: Amount,
    ) -> Result<RequestId, LedgerError>;

    /// Approves a pending request. Owner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `InvalidState`.
    fn approve_request(&self, caller: Address, id: RequestId) -> Result<(), LedgerError>;

    /// Rejects a pending request. Owner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `InvalidState`.
    fn reject_request(&self, caller: Address, id: RequestId) -> Result<(), LedgerError>;

    /// Expires a pending request. Owner only; honours the configured TTL.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `InvalidState` (including a TTL that has
    /// not yet elapsed).
    fn expire_request(&self, caller: Address, id: RequestId) -> Result<(), LedgerError>;

    /// Expires every pending request past its TTL. Returns their ids in
    /// ascending order; empty when no TTL is configured.
    fn sweep_expired_requests(&self) -> Vec<RequestId>;

    /// Reads a request.
    ///
    /// # Errors
    ///
    /// `NotFound`.
    fn get_request(&self, id: RequestId) -> Result<FundRequest, LedgerError>;

    /// Requests created by `partner`, in id order.
    fn requests_by_partner(&self, partner: Address) -> Vec<FundRequest>;

    /// Number of requests ever created.
    fn request_counter(&self) -> u64;

    // -------------------------------------------------------------------------
    // Vouchers
    // -------------------------------------------------------------------------

    /// Issues a voucher to `beneficiary`. Partner only.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `InvalidArgument` for a zero beneficiary.
    fn create_voucher(
        &self,
        caller: Address,
        beneficiary: Address,
        amount: Amount,
    ) -> Result<VoucherId, LedgerError>;

    /// Redeems a valid voucher. Only its beneficiary may call.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized`, `InvalidState`.
    fn claim_voucher(&self, caller: Address, id: VoucherId) -> Result<(), LedgerError>;

    /// Settles a redeemed voucher. Open to any caller, recorded as the
    /// merchant on the emitted event.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState`.
    fn reimburse_voucher(&self, caller: Address, id: VoucherId) -> Result<(), LedgerError>;

    /// Reads a voucher.
    ///
    /// # Errors
    ///
    /// `NotFound`.
    fn get_voucher(&self, id: VoucherId) -> Result<Voucher, LedgerError>;

    /// Vouchers issued to `beneficiary`, in id order.
    fn vouchers_by_beneficiary(&self, beneficiary: Address) -> Vec<Voucher>;

    /// Number of vouchers ever created.
    fn voucher_counter(&self) -> u64;
}
