//! # Fund Request Ledger
//!
//! Stores fund requests by sequential id and drives them through
//! `PENDING → EXECUTED | REJECTED | EXPIRED`.
//!
//! Every operation validates caller, existence and status before it writes,
//! so a returned error means nothing changed. The counter is bumped only
//! after all checks pass, which keeps ids gap-free.

use super::authorization::{AuthorizationGate, Operation};
use super::entities::{FundRequest, FundRequestStatus};
use super::value_objects::{Address, Amount, RequestId, Timestamp};
use crate::errors::LedgerError;
use std::collections::BTreeMap;

/// Default upper bound on title length, in bytes.
pub const DEFAULT_MAX_TITLE_LEN: usize = 256;

/// Tunables for the fund request ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundRequestPolicy {
    /// Longest accepted title, in bytes.
    pub max_title_len: usize,
    /// Time a request must stay pending before it may expire.
    /// `None` lets the owner expire at any time and disables the sweep.
    pub ttl_ms: Option<u64>,
}

impl Default for FundRequestPolicy {
    fn default() -> Self {
        Self {
            max_title_len: DEFAULT_MAX_TITLE_LEN,
            ttl_ms: None,
        }
    }
}

/// In-memory authoritative store of fund requests.
#[derive(Debug, Clone, Default)]
pub struct FundRequestLedger {
    policy: FundRequestPolicy,
    requests: BTreeMap<RequestId, FundRequest>,
    counter: u64,
}

impl FundRequestLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(policy: FundRequestPolicy) -> Self {
        Self {
            policy,
            requests: BTreeMap::new(),
            counter: 0,
        }
    }

    /// Active policy.
    #[must_use]
    pub fn policy(&self) -> &FundRequestPolicy {
        &self.policy
    }

    /// Total requests ever created. Also the id of the newest one.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Looks up a request.
    ///
    /// # Errors
    ///
    /// `NotFound` if no request has this id.
    pub fn get(&self, id: RequestId) -> Result<&FundRequest, LedgerError> {
        self.requests
            .get(&id)
            .ok_or(LedgerError::RequestNotFound(id))
    }

    /// Iterates all requests in id order.
    pub fn iter(&self) -> impl Iterator<Item = &FundRequest> {
        self.requests.values()
    }

    /// Requests created by `partner`, in id order.
    #[must_use]
    pub fn by_partner(&self, partner: Address) -> Vec<FundRequest> {
        self.requests
            .values()
            .filter(|r| r.partner == partner)
            .cloned()
            .collect()
    }

    /// Creates a pending request owned by `caller`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not a partner, `InvalidArgument` if the
    /// title exceeds the policy limit.
    pub fn ask_fund(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        title: String,
        amount: Amount,
        now: Timestamp,
    ) -> Result<&FundRequest, LedgerError> {
        gate.authorize(caller, Operation::AskFund)?;
        if title.len() > self.policy.max_title_len {
            return Err(LedgerError::InvalidArgument(format!(
                "title is {} bytes, limit is {}",
                title.len(),
                self.policy.max_title_len
            )));
        }

        self.counter += 1;
        let id = RequestId(self.counter);
        let request = FundRequest::new(id, title, amount, caller, now);
        Ok(&*self.requests.entry(id).or_insert(request))
    }

    /// Owner approves a pending request.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, or `InvalidState` if not pending.
    pub fn approve(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        id: RequestId,
    ) -> Result<&FundRequest, LedgerError> {
        gate.authorize(caller, Operation::ApproveRequest)?;
        self.settle(id, FundRequestStatus::Executed)
    }

    /// Owner rejects a pending request.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, or `InvalidState` if not pending.
    pub fn reject(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        id: RequestId,
    ) -> Result<&FundRequest, LedgerError> {
        gate.authorize(caller, Operation::RejectRequest)?;
        self.settle(id, FundRequestStatus::Rejected)
    }

    /// Owner expires a pending request.
    ///
    /// With a TTL configured, the request must have been pending for at
    /// least that long.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NotFound`, `InvalidState` if not pending or the TTL
    /// has not elapsed.
    pub fn expire(
        &mut self,
        gate: &AuthorizationGate<'_>,
        caller: Address,
        id: RequestId,
        now: Timestamp,
    ) -> Result<&FundRequest, LedgerError> {
        gate.authorize(caller, Operation::ExpireRequest)?;
        let request = self.get(id)?;
        Self::ensure_pending(request)?;
        if let Some(ttl) = self.policy.ttl_ms {
            if !request.is_past_ttl(now, ttl) {
                let age = now.saturating_sub(request.created_at);
                return Err(LedgerError::ExpiryWindowOpen {
                    id,
                    remaining_ms: ttl - age,
                });
            }
        }
        self.settle(id, FundRequestStatus::Expired)
    }

    /// Expires every pending request older than the TTL.
    ///
    /// Returns the expired ids in ascending order. No-op without a TTL.
    pub fn sweep_expired(&mut self, now: Timestamp) -> Vec<RequestId> {
        let Some(ttl) = self.policy.ttl_ms else {
            return Vec::new();
        };
        let mut expired = Vec::new();
        for request in self.requests.values_mut() {
            if request.is_pending() && request.is_past_ttl(now, ttl) {
                request.status = FundRequestStatus::Expired;
                expired.push(request.id);
            }
        }
        expired
    }

    fn ensure_pending(request: &FundRequest) -> Result<(), LedgerError> {
        if request.is_pending() {
            Ok(())
        } else {
            Err(LedgerError::InvalidRequestState {
                id: request.id,
                status: request.status,
                expected: FundRequestStatus::Pending,
            })
        }
    }

    fn settle(
        &mut self,
        id: RequestId,
        target: FundRequestStatus,
    ) -> Result<&FundRequest, LedgerError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(LedgerError::RequestNotFound(id))?;
        Self::ensure_pending(request)?;
        debug_assert!(request.status.can_transition_to(target));
        request.status = target;
        Ok(&*request)
    }
}

// =============================================================================
// TESTS
// =============================================================================
