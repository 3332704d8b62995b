//! # Access Registry
//!
//! Holds the owner identity (fixed at construction) and the partner
//! whitelist. Owner checks for the mutating calls go through
//! [`AuthorizationGate`](super::authorization::AuthorizationGate).

use super::authorization::{AuthorizationGate, Operation};
use super::value_objects::Address;
use crate::errors::LedgerError;
use std::collections::BTreeSet;

/// Owner identity plus the set of whitelisted partners.
#[derive(Debug, Clone)]
pub struct AccessRegistry {
    owner: Address,
    partners: BTreeSet<Address>,
}

impl AccessRegistry {
    /// Creates a registry with no partners.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            partners: BTreeSet::new(),
        }
    }

    /// The privileged identity.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Returns true if `identity` is the owner.
    #[must_use]
    pub fn is_owner(&self, identity: Address) -> bool {
        identity == self.owner
    }

    /// Returns true if `identity` is currently whitelisted.
    #[must_use]
    pub fn is_partner(&self, identity: Address) -> bool {
        self.partners.contains(&identity)
    }

    /// Sorted snapshot of the whitelist.
    #[must_use]
    pub fn partners(&self) -> Vec<Address> {
        self.partners.iter().copied().collect()
    }

    /// Number of whitelisted partners.
    #[must_use]
    pub fn partner_count(&self) -> usize {
        self.partners.len()
    }

    /// Whitelists `identity`. Owner only.
    ///
    /// Returns `Ok(false)` when the identity was already a partner.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the owner, `InvalidArgument` for
    /// the zero address.
    pub fn add_partner(&mut self, caller: Address, identity: Address) -> Result<bool, LedgerError> {
        AuthorizationGate::new(self).authorize(caller, Operation::AddPartner)?;
        if identity.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "partner must not be the zero address".into(),
            ));
        }
        Ok(self.partners.insert(identity))
    }

    /// Removes `identity` from the whitelist. Owner only.
    ///
    /// Only future `ask_fund` / `create_voucher` calls are affected; records
    /// the partner already created stay as they are.
    ///
    /// Returns `Ok(false)` when the identity was not a partner.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the owner.
    pub fn remove_partner(
        &mut self,
        caller: Address,
        identity: Address,
    ) -> Result<bool, LedgerError> {
        AuthorizationGate::new(self).authorize(caller, Operation::RemovePartner)?;
        Ok(self.partners.remove(&identity))
    }
}

// =============================================================================
// TESTS
// =============================================================================
