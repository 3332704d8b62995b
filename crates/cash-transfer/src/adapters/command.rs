//! # JSON Command Adapter
//!
//! Line-oriented JSON codec that drives any [`CashTransferApi`].
//!
//! ```text
//! → {"op":"askFund","caller":"0x…","title":"Rent","amount":"500"}
//! ← {"status":"ok","payload":{"requestId":1}}
//! → {"op":"approveRequest","caller":"0x…","id":9}
//! ← {"status":"error","kind":"NotFound","message":"request #9 not found"}
//! ```
//!
//! Amounts are decimal strings (plain JSON integers are accepted too).

use crate::domain::entities::{FundRequest, Voucher};
use crate::domain::value_objects::{decimal_amount, Address, Amount, RequestId, VoucherId};
use crate::errors::{ErrorKind, LedgerError};
use crate::ports::inbound::CashTransferApi;
use serde::{Deserialize, Serialize};

// =============================================================================
// COMMANDS
// =============================================================================

/// One call against the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    /// Read the owner identity.
    Owner,
    /// Whitelist a partner.
    AddPartner {
        caller: Address,
        identity: Address,
    },
    /// Revoke a partner.
    RemovePartner {
        caller: Address,
        identity: Address,
    },
    /// Whitelist lookup.
    IsPartner {
        identity: Address,
    },
    /// Whitelist snapshot.
    Partners,
    /// Create a fund request.
    AskFund {
        caller: Address,
        title: String,
        #[serde(with = "decimal_amount")]
        amount: Amount,
    },
    /// Approve a pending request.
    ApproveRequest {
        caller: Address,
        id: RequestId,
    },
    /// Reject a pending request.
    RejectRequest {
        caller: Address,
        id: RequestId,
    },
    /// Expire a pending request.
    ExpireRequest {
        caller: Address,
        id: RequestId,
    },
    /// Expire every request past its TTL.
    SweepExpiredRequests,
    /// Read a request.
    GetRequest {
        id: RequestId,
    },
    /// Requests created by one partner.
    RequestsByPartner {
        partner: Address,
    },
    /// Number of requests ever created.
    RequestCounter,
    /// Issue a voucher.
    CreateVoucher {
        caller: Address,
        beneficiary: Address,
        #[serde(with = "decimal_amount")]
        amount: Amount,
    },
    /// Redeem a voucher.
    ClaimVoucher {
        caller: Address,
        id: VoucherId,
    },
    /// Settle a redeemed voucher.
    ReimburseVoucher {
        caller: Address,
        id: VoucherId,
    },
    /// Read a voucher.
    GetVoucher {
        id: VoucherId,
    },
    /// Vouchers issued to one beneficiary.
    VouchersByBeneficiary {
        beneficiary: Address,
    },
    /// Number of vouchers ever created.
    VoucherCounter,
}

impl Command {
    /// Parses one JSON command.
    ///
    /// # Errors
    ///
    /// Malformed JSON, unknown `op`, missing fields or a bad address/amount.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// The `op` tag, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::AddPartner { .. } => "addPartner",
            Self::RemovePartner { .. } => "removePartner",
            Self::IsPartner { .. } => "isPartner",
            Self::Partners => "partners",
            Self::AskFund { .. } => "askFund",
            Self::ApproveRequest { .. } => "approveRequest",
            Self::RejectRequest { .. } => "rejectRequest",
            Self::ExpireRequest { .. } => "expireRequest",
            Self::SweepExpiredRequests => "sweepExpiredRequests",
            Self::GetRequest { .. } => "getRequest",
            Self::RequestsByPartner { .. } => "requestsByPartner",
            Self::RequestCounter => "requestCounter",
            Self::CreateVoucher { .. } => "createVoucher",
            Self::ClaimVoucher { .. } => "claimVoucher",
            Self::ReimburseVoucher { .. } => "reimburseVoucher",
            Self::GetVoucher { .. } => "getVoucher",
            Self::VouchersByBeneficiary { .. } => "vouchersByBeneficiary",
            Self::VoucherCounter => "voucherCounter",
        }
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Successful result body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum Payload {
    Owner { owner: Address },
    IsPartner {
        #[serde(rename = "isPartner")]
        is_partner: bool,
    },
    Partners { partners: Vec<Address> },
    RequestId {
        #[serde(rename = "requestId")]
        request_id: RequestId,
    },
    Request { request: FundRequest },
    Requests { requests: Vec<FundRequest> },
    Expired { expired: Vec<RequestId> },
    VoucherId {
        #[serde(rename = "voucherId")]
        voucher_id: VoucherId,
    },
    Voucher { voucher: Voucher },
    Vouchers { vouchers: Vec<Voucher> },
    Counter { counter: u64 },
}

/// Reply to one command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandResponse {
    /// The command succeeded.
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Payload>,
    },
    /// The command failed; nothing changed.
    Error { kind: ErrorKind, message: String },
}

impl CommandResponse {
    /// Response for a line that did not parse as a command.
    #[must_use]
    pub fn malformed(err: &serde_json::Error) -> Self {
        Self::Error {
            kind: ErrorKind::InvalidArgument,
            message: format!("malformed command: {err}"),
        }
    }

    /// Returns true for `Ok`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Serializes to a single JSON line.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"error","kind":"InvalidArgument","message":"{e}"}}"#)
        })
    }
}

impl From<LedgerError> for CommandResponse {
    fn from(err: LedgerError) -> Self {
        Self::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Runs one command against `api`.
pub fn dispatch<A: CashTransferApi + ?Sized>(api: &A, command: Command) -> CommandResponse {
    match execute(api, command) {
        Ok(payload) => CommandResponse::Ok { payload },
        Err(err) => err.into(),
    }
}

/// Parses and runs one JSON line.
pub fn handle_line<A: CashTransferApi + ?Sized>(api: &A, line: &str) -> CommandResponse {
    match Command::parse(line) {
        Ok(command) => dispatch(api, command),
        Err(err) => CommandResponse::malformed(&err),
    }
}

fn execute<A: CashTransferApi + ?Sized>(
    api: &A,
    command: Command,
) -> Result<Option<Payload>, LedgerError> {
    let payload = match command {
        Command::Owner => Payload::Owner { owner: api.owner() },
        Command::AddPartner { caller, identity } => {
            api.add_partner(caller, identity)?;
            return Ok(None);
        }
        Command::RemovePartner { caller, identity } => {
            api.remove_partner(caller, identity)?;
            return Ok(None);
        }
        Command::IsPartner { identity } => Payload::IsPartner {
            is_partner: api.is_partner(identity),
        },
        Command::Partners => Payload::Partners {
            partners: api.partners(),
        },
        Command::AskFund {
            caller,
            title,
            amount,
        } => Payload::RequestId {
            request_id: api.ask_fund(caller, title, amount)?,
        },
        Command::ApproveRequest { caller, id } => {
            api.approve_request(caller, id)?;
            return Ok(None);
        }
        Command::RejectRequest { caller, id } => {
            api.reject_request(caller, id)?;
            return Ok(None);
        }
        Command::ExpireRequest { caller, id } => {
            api.expire_request(caller, id)?;
            return Ok(None);
        }
        Command::SweepExpiredRequests => Payload::Expired {
            expired: api.sweep_expired_requests(),
        },
        Command::GetRequest { id } => Payload::Request {
            request: api.get_request(id)?,
        },
        Command::RequestsByPartner { partner } => Payload::Requests {
            requests: api.requests_by_partner(partner),
        },
        Command::RequestCounter => Payload::Counter {
            counter: api.request_counter(),
        },
        Command::CreateVoucher {
            caller,
            beneficiary,
            amount,
        } => Payload::VoucherId {
            voucher_id: api.create_voucher(caller, beneficiary, amount)?,
        },
        Command::ClaimVoucher { caller, id } => {
            api.claim_voucher(caller, id)?;
            return Ok(None);
        }
        Command::ReimburseVoucher { caller, id } => {
            api.reimburse_voucher(caller, id)?;
            return Ok(None);
        }
        Command::GetVoucher { id } => Payload::Voucher {
            voucher: api.get_voucher(id)?,
        },
        Command::VouchersByBeneficiary { beneficiary } => Payload::Vouchers {
            vouchers: api.vouchers_by_beneficiary(beneficiary),
        },
        Command::VoucherCounter => Payload::Counter {
            counter: api.voucher_counter(),
        },
    };
    Ok(Some(payload))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::create_test_service;
    use serde_json::{json, Value};

    const OWNER: &str = "0x1111111111111111111111111111111111111111";
    const PARTNER: &str = "0x2222222222222222222222222222222222222222";
    const BENEFICIARY: &str = "0x3333333333333333333333333333333333333333";

    fn run(api: &dyn CashTransferApi, value: Value) -> Value {
        serde_json::from_str(&handle_line(api, &value.to_string()).to_json_line()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        let cmd = Command::parse(&format!(
            r#"{{"op":"askFund","caller":"{PARTNER}","title":"Rent","amount":"500"}}"#
        ))
        .unwrap();
        assert_eq!(
            cmd,
            Command::AskFund {
                caller: PARTNER.parse().unwrap(),
                title: "Rent".into(),
                amount: Amount::from(500),
            }
        );
        assert_eq!(cmd.name(), "askFund");

        let cmd = Command::parse(r#"{"op":"voucherCounter"}"#).unwrap();
        assert_eq!(cmd, Command::VoucherCounter);
    }

    #[test]
    fn test_malformed_lines() {
        let service = create_test_service(OWNER.parse().unwrap());
        for line in [
            "not json",
            r#"{"op":"mintMoney"}"#,
            r#"{"op":"getRequest"}"#,
            r#"{"op":"isPartner","identity":"0x12"}"#,
        ] {
            match handle_line(&service, line) {
                CommandResponse::Error { kind, message } => {
                    assert_eq!(kind, ErrorKind::InvalidArgument);
                    assert!(message.starts_with("malformed command"));
                }
                other => panic!("expected error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_fund_request_flow() {
        let service = create_test_service(OWNER.parse().unwrap());

        let reply = run(
            &service,
            json!({"op": "addPartner", "caller": OWNER, "identity": PARTNER}),
        );
        assert_eq!(reply, json!({"status": "ok"}));

        let reply = run(
            &service,
            json!({"op": "askFund", "caller": PARTNER, "title": "Rent", "amount": 500}),
        );
        assert_eq!(reply, json!({"status": "ok", "payload": {"requestId": 1}}));

        let reply = run(
            &service,
            json!({"op": "approveRequest", "caller": OWNER, "id": 1}),
        );
        assert_eq!(reply["status"], "ok");

        let reply = run(&service, json!({"op": "getRequest", "id": 1}));
        let request = &reply["payload"]["request"];
        assert_eq!(request["status"], "EXECUTED");
        assert_eq!(request["amount"], "500");
        assert_eq!(request["partner"], PARTNER);

        let reply = run(
            &service,
            json!({"op": "rejectRequest", "caller": OWNER, "id": 1}),
        );
        assert_eq!(reply["status"], "error");
        assert_eq!(reply["kind"], "InvalidState");
    }

    #[test]
    fn test_voucher_flow() {
        let service = create_test_service(OWNER.parse().unwrap());
        run(
            &service,
            json!({"op": "addPartner", "caller": OWNER, "identity": PARTNER}),
        );

        let reply = run(
            &service,
            json!({"op": "createVoucher", "caller": PARTNER, "beneficiary": BENEFICIARY, "amount": "100"}),
        );
        assert_eq!(reply["payload"]["voucherId"], 1);

        let reply = run(
            &service,
            json!({"op": "claimVoucher", "caller": PARTNER, "id": 1}),
        );
        assert_eq!(reply["kind"], "Unauthorized");

        let reply = run(
            &service,
            json!({"op": "claimVoucher", "caller": BENEFICIARY, "id": 1}),
        );
        assert_eq!(reply["status"], "ok");

        let reply = run(
            &service,
            json!({"op": "reimburseVoucher", "caller": OWNER, "id": 1}),
        );
        assert_eq!(reply["status"], "ok");

        let reply = run(
            &service,
            json!({"op": "vouchersByBeneficiary", "beneficiary": BENEFICIARY}),
        );
        assert_eq!(reply["payload"]["vouchers"][0]["status"], "REIMBURSED");

        let reply = run(&service, json!({"op": "voucherCounter"}));
        assert_eq!(reply["payload"]["counter"], 1);
    }

    #[test]
    fn test_not_found_kind() {
        let service = create_test_service(OWNER.parse().unwrap());
        let reply = run(&service, json!({"op": "getVoucher", "id": 9}));
        assert_eq!(
            reply,
            json!({"status": "error", "kind": "NotFound", "message": "voucher #9 not found"})
        );
    }
}
