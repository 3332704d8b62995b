//! # Cash Transfer Service
//!
//! Single-writer ledger service. The registry, both ledgers and the event
//! sequence live behind one `parking_lot::Mutex`; every operation runs to
//! completion while holding it, and events are handed to the sink before the
//! lock is released, so event order always matches mutation order.

use crate::adapters::event_log::InMemoryEventLog;
use crate::config::CashTransferConfig;
use crate::domain::authorization::AuthorizationGate;
use crate::domain::entities::{FundRequest, Voucher};
use crate::domain::fund_ledger::{FundRequestLedger, FundRequestPolicy};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::registry::AccessRegistry;
use crate::domain::value_objects::{Address, Amount, RequestId, Timestamp, VoucherId};
use crate::domain::voucher_ledger::VoucherLedger;
use crate::errors::LedgerError;
use crate::events::{EventRecord, LedgerEvent};
use crate::ports::inbound::CashTransferApi;
use crate::ports::outbound::{EventSink, ManualTimeSource, SystemTimeSource, TimeSource};

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

/// Statistics for the cash transfer service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Mutating calls that succeeded (idempotent no-ops included).
    pub operations_succeeded: u64,
    /// Mutating calls rejected with an error.
    pub operations_rejected: u64,
    /// Events handed to the sink.
    pub events_emitted: u64,
    /// Requests expired by the maintenance sweep.
    pub requests_swept: u64,
}

/// Everything guarded by the ledger lock.
#[derive(Debug)]
struct LedgerState {
    registry: AccessRegistry,
    requests: FundRequestLedger,
    vouchers: VoucherLedger,
    next_sequence: u64,
    stats: ServiceStats,
}

impl LedgerState {
    fn check_invariants(&self) -> InvariantCheckResult {
        check_all_invariants(&self.registry, &self.requests, &self.vouchers)
    }
}

/// The cash transfer ledger.
///
/// `E` receives every emitted event; `T` stamps records and events.
pub struct CashTransferService<E: EventSink, T: TimeSource = SystemTimeSource> {
    /// Ledger state.
    state: Mutex<LedgerState>,
    /// Event sink.
    sink: E,
    /// Clock.
    clock: T,
}

impl<E: EventSink, T: TimeSource> CashTransferService<E, T> {
    /// Creates an empty ledger owned by `config.owner`.
    pub fn new(config: &CashTransferConfig, sink: E, clock: T) -> Self {
        Self::with_policy(config.owner, config.fund_request_policy(), sink, clock)
    }

    /// Creates an empty ledger with an explicit request policy.
    pub fn with_policy(owner: Address, policy: FundRequestPolicy, sink: E, clock: T) -> Self {
        info!(%owner, ttl_ms = ?policy.ttl_ms, "Cash transfer ledger created");
        Self {
            state: Mutex::new(LedgerState {
                registry: AccessRegistry::new(owner),
                requests: FundRequestLedger::new(policy),
                vouchers: VoucherLedger::new(),
                next_sequence: 1,
                stats: ServiceStats::default(),
            }),
            sink,
            clock,
        }
    }

    /// Get current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.state.lock().stats.clone()
    }

    /// The event sink.
    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// The clock.
    pub fn clock(&self) -> &T {
        &self.clock
    }

    /// Re-checks every structural invariant of the current state.
    pub fn check_invariants(&self) -> InvariantCheckResult {
        self.state.lock().check_invariants()
    }

    /// Runs one mutation under the lock.
    ///
    /// On success the returned events are sequenced and emitted in order
    /// before the lock is released. On failure nothing is emitted.
    fn mutate<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut LedgerState, Timestamp) -> Result<(R, Vec<LedgerEvent>), LedgerError>,
    ) -> Result<R, LedgerError> {
        let mut state = self.state.lock();
        let now = self.clock.now();

        match f(&mut *state, now) {
            Ok((value, events)) => {
                for event in events {
                    let record = EventRecord::new(state.next_sequence, now, event);
                    state.next_sequence += 1;
                    state.stats.events_emitted += 1;
                    self.sink.emit(record);
                }
                state.stats.operations_succeeded += 1;
                debug_assert!(
                    state.check_invariants().is_valid(),
                    "invariant violated after {op}: {:?}",
                    state.check_invariants()
                );
                Ok(value)
            }
            Err(err) => {
                state.stats.operations_rejected += 1;
                warn!(op, kind = %err.kind(), error = %err, "Operation rejected");
                Err(err)
            }
        }
    }
}

/// Create a service with an in-memory event log and a manual clock at 0 (for testing).
#[must_use]
pub fn create_test_service(owner: Address) -> CashTransferService<InMemoryEventLog, ManualTimeSource> {
    CashTransferService::new(
        &CashTransferConfig::new(owner),
        InMemoryEventLog::new(),
        ManualTimeSource::new(0),
    )
}

// =============================================================================
// CashTransferApi Implementation
// =============================================================================

impl<E: EventSink, T: TimeSource> CashTransferApi for CashTransferService<E, T> {
    fn owner(&self) -> Address {
        self.state.lock().registry.owner()
    }

    #[instrument(skip(self))]
    fn add_partner(&self, caller: Address, identity: Address) -> Result<(), LedgerError> {
        let added = self.mutate("addPartner", |state, _| {
            let added = state.registry.add_partner(caller, identity)?;
            let events = if added {
                vec![LedgerEvent::PartnerAdded { partner: identity }]
            } else {
                Vec::new()
            };
            Ok((added, events))
        })?;
        if added {
            info!("Partner added");
        } else {
            debug!("Already a partner");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove_partner(&self, caller: Address, identity: Address) -> Result<(), LedgerError> {
        let removed = self.mutate("removePartner", |state, _| {
            let removed = state.registry.remove_partner(caller, identity)?;
            let events = if removed {
                vec![LedgerEvent::PartnerRemoved { partner: identity }]
            } else {
                Vec::new()
            };
            Ok((removed, events))
        })?;
        if removed {
            info!("Partner removed");
        } else {
            debug!("Not a partner");
        }
        Ok(())
    }

    fn is_partner(&self, identity: Address) -> bool {
        self.state.lock().registry.is_partner(identity)
    }

    fn partners(&self) -> Vec<Address> {
        self.state.lock().registry.partners()
    }

    #[instrument(skip(self, title), fields(title_len = title.len()))]
    fn ask_fund(
        &self,
        caller: Address,
        title: String,
        amount: Amount,
    ) -> Result<RequestId, LedgerError> {
        let id = self.mutate("askFund", |state, now| {
            let gate = AuthorizationGate::new(&state.registry);
            let request = state.requests.ask_fund(&gate, caller, title, amount, now)?;
            let event = LedgerEvent::FundRequested {
                id: request.id,
                partner: request.partner,
                title: request.title.clone(),
                amount: request.amount,
            };
            Ok((request.id, vec![event]))
        })?;
        info!(%id, "Fund requested");
        Ok(id)
    }

    #[instrument(skip(self))]
    fn approve_request(&self, caller: Address, id: RequestId) -> Result<(), LedgerError> {
        self.mutate("approveRequest", |state, _| {
            let gate = AuthorizationGate::new(&state.registry);
            state.requests.approve(&gate, caller, id)?;
            Ok(((), vec![LedgerEvent::RequestApproved { id }]))
        })?;
        info!("Request approved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn reject_request(&self, caller: Address, id: RequestId) -> Result<(), LedgerError> {
        self.mutate("rejectRequest", |state, _| {
            let gate = AuthorizationGate::new(&state.registry);
            state.requests.reject(&gate, caller, id)?;
            Ok(((), vec![LedgerEvent::RequestRejected { id }]))
        })?;
        info!("Request rejected");
        Ok(())
    }

    #[instrument(skip(self))]
    fn expire_request(&self, caller: Address, id: RequestId) -> Result<(), LedgerError> {
        self.mutate("expireRequest", |state, now| {
            let gate = AuthorizationGate::new(&state.registry);
            state.requests.expire(&gate, caller, id, now)?;
            Ok(((), vec![LedgerEvent::RequestExpired { id }]))
        })?;
        info!("Request expired");
        Ok(())
    }

    #[instrument(skip(self))]
    fn sweep_expired_requests(&self) -> Vec<RequestId> {
        let result = self.mutate("sweepExpiredRequests", |state, now| {
            let expired = state.requests.sweep_expired(now);
            state.stats.requests_swept += expired.len() as u64;
            let events = expired
                .iter()
                .map(|&id| LedgerEvent::RequestExpired { id })
                .collect();
            Ok((expired, events))
        });
        // The sweep has no failure path.
        let expired = result.unwrap_or_default();
        if !expired.is_empty() {
            info!(count = expired.len(), "Expired stale requests");
        }
        expired
    }

    fn get_request(&self, id: RequestId) -> Result<FundRequest, LedgerError> {
        debug!(%id, "get_request");
        self.state.lock().requests.get(id).cloned()
    }

    fn requests_by_partner(&self, partner: Address) -> Vec<FundRequest> {
        self.state.lock().requests.by_partner(partner)
    }

    fn request_counter(&self) -> u64 {
        self.state.lock().requests.counter()
    }

    #[instrument(skip(self))]
    fn create_voucher(
        &self,
        caller: Address,
        beneficiary: Address,
        amount: Amount,
    ) -> Result<VoucherId, LedgerError> {
        let id = self.mutate("createVoucher", |state, now| {
            let gate = AuthorizationGate::new(&state.registry);
            let voucher = state
                .vouchers
                .create(&gate, caller, beneficiary, amount, now)?;
            let event = LedgerEvent::VoucherCreated {
                id: voucher.id,
                partner: voucher.partner,
                beneficiary: voucher.beneficiary,
                amount: voucher.amount,
            };
            Ok((voucher.id, vec![event]))
        })?;
        info!(%id, "Voucher created");
        Ok(id)
    }

    #[instrument(skip(self))]
    fn claim_voucher(&self, caller: Address, id: VoucherId) -> Result<(), LedgerError> {
        self.mutate("claimVoucher", |state, _| {
            let gate = AuthorizationGate::new(&state.registry);
            state.vouchers.claim(&gate, caller, id)?;
            let event = LedgerEvent::VoucherClaimed {
                id,
                beneficiary: caller,
            };
            Ok(((), vec![event]))
        })?;
        info!("Voucher claimed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn reimburse_voucher(&self, caller: Address, id: VoucherId) -> Result<(), LedgerError> {
        self.mutate("reimburseVoucher", |state, _| {
            let gate = AuthorizationGate::new(&state.registry);
            state.vouchers.reimburse(&gate, caller, id)?;
            let event = LedgerEvent::VoucherReimbursed {
                id,
                merchant: caller,
            };
            Ok(((), vec![event]))
        })?;
        info!("Voucher reimbursed");
        Ok(())
    }

    fn get_voucher(&self, id: VoucherId) -> Result<Voucher, LedgerError> {
        debug!(%id, "get_voucher");
        self.state.lock().vouchers.get(id).cloned()
    }

    fn vouchers_by_beneficiary(&self, beneficiary: Address) -> Vec<Voucher> {
        self.state.lock().vouchers.by_beneficiary(beneficiary)
    }

    fn voucher_counter(&self) -> u64 {
        self.state.lock().vouchers.counter()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FundRequestStatus, VoucherStatus};
    use crate::errors::ErrorKind;

    const OWNER: Address = Address::repeat_byte(0x01);
    const PARTNER: Address = Address::repeat_byte(0x02);
    const BENEFICIARY: Address = Address::repeat_byte(0x03);
    const MERCHANT: Address = Address::repeat_byte(0x04);

    #[test]
    fn test_create_service() {
        let service = create_test_service(OWNER);
        assert_eq!(service.owner(), OWNER);
        assert_eq!(service.request_counter(), 0);
        assert_eq!(service.voucher_counter(), 0);
        assert_eq!(service.stats(), ServiceStats::default());
        assert!(service.sink().is_empty());
    }

    #[test]
    fn test_ask_fund_emits_event() {
        let service = create_test_service(OWNER);
        service.add_partner(OWNER, PARTNER).unwrap();
        service.clock().set(1_234);

        let id = service
            .ask_fund(PARTNER, "Rent".into(), Amount::from(500))
            .unwrap();
        assert_eq!(id, RequestId(1));
        assert_eq!(service.get_request(id).unwrap().created_at, 1_234);

        let record = service.sink().last().unwrap();
        assert_eq!(record.sequence, 2);
        assert_eq!(record.emitted_at, 1_234);
        assert_eq!(
            record.event,
            LedgerEvent::FundRequested {
                id,
                partner: PARTNER,
                title: "Rent".into(),
                amount: Amount::from(500),
            }
        );
    }

    #[test]
    fn test_idempotent_partner_calls_emit_nothing() {
        let service = create_test_service(OWNER);
        service.add_partner(OWNER, PARTNER).unwrap();
        service.add_partner(OWNER, PARTNER).unwrap();
        service.remove_partner(OWNER, MERCHANT).unwrap();

        assert_eq!(
            service.sink().events(),
            vec![LedgerEvent::PartnerAdded { partner: PARTNER }]
        );
        assert_eq!(service.stats().operations_succeeded, 3);
    }

    #[test]
    fn test_rejections_counted_and_silent() {
        let service = create_test_service(OWNER);
        let err = service
            .ask_fund(PARTNER, "x".into(), Amount::from(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = service.approve_request(OWNER, RequestId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stats = service.stats();
        assert_eq!(stats.operations_rejected, 2);
        assert_eq!(stats.events_emitted, 0);
        assert!(service.sink().is_empty());
        assert!(service.check_invariants().is_valid());
    }

    #[test]
    fn test_voucher_events_carry_identities() {
        let service = create_test_service(OWNER);
        service.add_partner(OWNER, PARTNER).unwrap();
        let id = service
            .create_voucher(PARTNER, BENEFICIARY, Amount::from(100))
            .unwrap();
        service.claim_voucher(BENEFICIARY, id).unwrap();
        service.reimburse_voucher(MERCHANT, id).unwrap();

        let events = service.sink().events();
        assert_eq!(
            events[events.len() - 2..],
            [
                LedgerEvent::VoucherClaimed {
                    id,
                    beneficiary: BENEFICIARY
                },
                LedgerEvent::VoucherReimbursed {
                    id,
                    merchant: MERCHANT
                },
            ]
        );
        assert_eq!(
            service.get_voucher(id).unwrap().status,
            VoucherStatus::Reimbursed
        );
    }

    #[test]
    fn test_sweep_with_ttl() {
        let service = CashTransferService::new(
            &CashTransferConfig::new(OWNER).with_request_ttl_ms(1_000),
            InMemoryEventLog::new(),
            ManualTimeSource::new(0),
        );
        service.add_partner(OWNER, PARTNER).unwrap();
        let old = service
            .ask_fund(PARTNER, "old".into(), Amount::from(1))
            .unwrap();
        service.clock().set(600);
        let fresh = service
            .ask_fund(PARTNER, "fresh".into(), Amount::from(1))
            .unwrap();

        service.clock().set(1_000);
        assert_eq!(service.sweep_expired_requests(), vec![old]);
        assert_eq!(
            service.get_request(old).unwrap().status,
            FundRequestStatus::Expired
        );
        assert_eq!(
            service.get_request(fresh).unwrap().status,
            FundRequestStatus::Pending
        );
        assert_eq!(
            service.sink().last().unwrap().event,
            LedgerEvent::RequestExpired { id: old }
        );
        assert_eq!(service.stats().requests_swept, 1);
    }

    #[test]
    fn test_sweep_without_ttl_is_noop() {
        let service = create_test_service(OWNER);
        service.add_partner(OWNER, PARTNER).unwrap();
        service
            .ask_fund(PARTNER, "r".into(), Amount::from(1))
            .unwrap();
        service.clock().set(u64::MAX);

        assert!(service.sweep_expired_requests().is_empty());
        assert_eq!(service.sink().len(), 2);
    }
}
