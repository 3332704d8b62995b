//! # Error Types
//!
//! All error types for the cash transfer ledger.

use crate::domain::authorization::Role;
use crate::domain::entities::{FundRequestStatus, VoucherStatus};
use crate::domain::value_objects::{Address, RequestId, VoucherId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors returned by ledger and registry operations.
///
/// A failed operation never changes state, so every error is safe to retry
/// once the caller has fixed the precondition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller lacks the role or identity the operation requires.
    #[error("unauthorized: {caller} is not {required}")]
    Unauthorized { caller: Address, required: Role },

    /// No fund request with this id.
    #[error("{0} not found")]
    RequestNotFound(RequestId),

    /// No voucher with this id.
    #[error("{0} not found")]
    VoucherNotFound(VoucherId),

    /// Fund request is not in the status the operation needs.
    #[error("invalid state: {id} is {status}, expected {expected}")]
    InvalidRequestState {
        id: RequestId,
        status: FundRequestStatus,
        expected: FundRequestStatus,
    },

    /// Voucher is not in the status the operation needs.
    #[error("invalid state: {id} is {status}, expected {expected}")]
    InvalidVoucherState {
        id: VoucherId,
        status: VoucherStatus,
        expected: VoucherStatus,
    },

    /// Expiry requested before the configured TTL elapsed.
    #[error("invalid state: {id} cannot expire for another {remaining_ms}ms")]
    ExpiryWindowOpen { id: RequestId, remaining_ms: u64 },

    /// Malformed argument (zero address, oversized title).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl LedgerError {
    /// Coarse classification of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::RequestNotFound(_) | Self::VoucherNotFound(_) => ErrorKind::NotFound,
            Self::InvalidRequestState { .. }
            | Self::InvalidVoucherState { .. }
            | Self::ExpiryWindowOpen { .. } => ErrorKind::InvalidState,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// The four error classes callers are expected to branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Wrong caller.
    Unauthorized,
    /// Unknown id.
    NotFound,
    /// Operation not valid for the record's current status.
    InvalidState,
    /// Bad input.
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "NotFound",
            Self::InvalidState => "InvalidState",
            Self::InvalidArgument => "InvalidArgument",
        };
        f.write_str(name)
    }
}

// =============================================================================
// PARSE / CONFIG ERRORS
// =============================================================================

/// Errors from parsing a hex address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Wrong number of hex digits (after stripping `0x`).
    #[error("address must be 40 hex digits, got {0}")]
    InvalidLength(usize),

    /// Non-hex characters.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Owner address was not provided.
    #[error("owner address is not set (set CT_OWNER_ADDRESS)")]
    MissingOwner,

    /// Owner address is the zero address.
    #[error("owner address must not be the zero address")]
    ZeroOwner,

    /// Owner address could not be parsed.
    #[error("invalid owner address: {0}")]
    InvalidOwner(#[from] AddressParseError),

    /// A numeric setting could not be parsed or is out of range.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

// =============================================================================
// TESTS
// =============================================================================
