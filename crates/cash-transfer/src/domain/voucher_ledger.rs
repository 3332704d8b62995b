//! # Voucher Ledger
//!
//! Stores vouchers by sequential id (separate from fund request ids) and
//! advances them strictly `VALID → REDEEMED → REIMBURSED`.

use super::authorization::{AuthorizationGate, Operation};
use super::entities::{Voucher, VoucherStatus};
use super::value_objects::{Address, Amount, Timestamp, VoucherId};
use crate::errors::LedgerError;
use std::collections::BTreeMap;

/// In-memory authoritative store of vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherLedger {
    vouchers: BTreeMap<VoucherId, Voucher>,
    counter: u64,
}

impl VoucherLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total vouchers ever created. Also the id of the newest one.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Looks up a voucher.
    ///
    /// # Errors
    ///
    /// `NotFound` if no voucher has this id.
    pub fn get(&self, id: VoucherId) -> Result<&Voucher, LedgerError> {
        self.vouchers
            .get(&id)
            .ok_or(LedgerError::VoucherNotFound(id))
    }

    /// Iterates all vouchers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Voucher> {
        self.vouchers.values()
    }

    /// Vouchers issued to `beneficiary`, in id order.
    #[must_use]
    pub fn by_beneficiary(&self, beneficiary: Address) -> Vec<Voucher> {
        self.vouchers
            .values()
            .filter(|v| v.beneficiary == beneficiary)
            .cloned()
            .collect()
    }

    /// Issues a voucher from `caller` to `beneficiary`.
    ///
    /// The beneficiary may be the issuing partner itself.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not a partner, `InvalidArgument` for a
    /// zero beneficiary.
    pub fn create(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        beneficiary: Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<&Voucher, LedgerError> {
        gate.authorize(caller, Operation::CreateVoucher)?;
        if beneficiary.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "beneficiary must not be the zero address".into(),
            ));
        }

        self.counter += 1;
        let id = VoucherId(self.counter);
        let voucher = Voucher::new(id, amount, caller, beneficiary, now);
        Ok(&*self.vouchers.entry(id).or_insert(voucher))
    }

    /// Beneficiary redeems a valid voucher.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Unauthorized` unless `caller` is this voucher's
    /// beneficiary, `InvalidState` unless `VALID`.
    pub fn claim(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        id: VoucherId,
    ) -> Result<&Voucher, LedgerError> {
        let voucher = self.get(id)?;
        gate.authorize_voucher(caller, Operation::ClaimVoucher, voucher)?;
        self.advance(id, VoucherStatus::Valid)
    }

    /// Any caller settles a redeemed voucher.
    ///
    /// # Errors
    ///
    /// `NotFound`, or `InvalidState` unless `REDEEMED`.
    pub fn reimburse(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        id: VoucherId,
    ) -> Result<&Voucher, LedgerError> {
        gate.authorize(caller, Operation::ReimburseVoucher)?;
        self.advance(id, VoucherStatus::Redeemed)
    }

    /// Moves the voucher one stage forward if it is currently at `from`.
    fn advance(&mut self, id: VoucherId, from: VoucherStatus) -> Result<&Voucher, LedgerError> {
        let voucher = self
            .vouchers
            .get_mut(&id)
            .ok_or(LedgerError::VoucherNotFound(id))?;
        let next = match from.next() {
            Some(next) if voucher.status == from => next,
            _ => {
                return Err(LedgerError::InvalidVoucherState {
                    id,
                    status: voucher.status,
                    expected: from,
                })
            }
        };
        voucher.status = next;
        Ok(&*voucher)
    }
}

// =============================================================================
// TESTS
// =============================================================================
