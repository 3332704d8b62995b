//! Ledger configuration from environment variables.

use crate::adapters::broadcast::DEFAULT_CHANNEL_CAPACITY;
use crate::domain::fund_ledger::{FundRequestPolicy, DEFAULT_MAX_TITLE_LEN};
use crate::domain::value_objects::Address;
use crate::errors::ConfigError;
use std::env;

/// Configuration for a cash transfer ledger node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashTransferConfig {
    /// Privileged identity, fixed for the lifetime of the ledger
    pub owner: Address,

    /// Minimum age before a pending request may expire (None: no TTL)
    pub request_ttl_ms: Option<u64>,

    /// Longest accepted fund request title, in bytes
    pub max_title_len: usize,

    /// Capacity of the broadcast event channel
    pub event_channel_capacity: usize,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
}

impl CashTransferConfig {
    /// Configuration with defaults for everything but the owner.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            request_ttl_ms: None,
            max_title_len: DEFAULT_MAX_TITLE_LEN,
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_level: "info".to_string(),
        }
    }

    /// Sets the request TTL.
    #[must_use]
    pub fn with_request_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.request_ttl_ms = Some(ttl_ms);
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CT_OWNER_ADDRESS`: Owner address, 0x-prefixed hex (required)
    /// - `CT_REQUEST_TTL_MS`: Request TTL in ms (default: none)
    /// - `CT_MAX_TITLE_LEN`: Title limit in bytes (default: 256)
    /// - `CT_EVENT_CHANNEL_CAPACITY`: Broadcast capacity (default: 1000)
    /// - `CT_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    ///
    /// # Errors
    ///
    /// Missing or malformed owner, unparsable numbers, or values rejected by
    /// [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let owner = lookup("CT_OWNER_ADDRESS").ok_or(ConfigError::MissingOwner)?;
        let mut config = Self::new(Address::from_hex(owner.trim())?);

        if let Some(raw) = lookup("CT_REQUEST_TTL_MS") {
            let ttl = parse_number::<u64>("CT_REQUEST_TTL_MS", &raw)?;
            if ttl == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "CT_REQUEST_TTL_MS",
                    value: raw,
                });
            }
            config.request_ttl_ms = Some(ttl);
        }
        if let Some(raw) = lookup("CT_MAX_TITLE_LEN") {
            config.max_title_len = parse_number("CT_MAX_TITLE_LEN", &raw)?;
        }
        if let Some(raw) = lookup("CT_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = parse_number("CT_EVENT_CHANNEL_CAPACITY", &raw)?;
        }
        if let Some(level) = lookup("CT_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// `ZeroOwner`, or `InvalidValue` for a zero channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::ZeroOwner);
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CT_EVENT_CHANNEL_CAPACITY",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Fund request ledger tunables derived from this config.
    #[must_use]
    pub fn fund_request_policy(&self) -> FundRequestPolicy {
        FundRequestPolicy {
            max_title_len: self.max_title_len,
            ttl_ms: self.request_ttl_ms,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const OWNER: &str = "0xAbCd000000000000000000000000000000000001";

    fn load(vars: &[(&str, &str)]) -> Result<CashTransferConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CashTransferConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CT_OWNER_ADDRESS", OWNER)]).unwrap();
        assert_eq!(config.owner, OWNER.parse::<Address>().unwrap());
        assert_eq!(config.request_ttl_ms, None);
        assert_eq!(config.max_title_len, 256);
        assert_eq!(config.event_channel_capacity, 1000);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_all_values() {
        let config = load(&[
            ("CT_OWNER_ADDRESS", OWNER),
            ("CT_REQUEST_TTL_MS", "60000"),
            ("CT_MAX_TITLE_LEN", "32"),
            ("CT_EVENT_CHANNEL_CAPACITY", "8"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.request_ttl_ms, Some(60_000));
        assert_eq!(config.event_channel_capacity, 8);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.fund_request_policy(),
            FundRequestPolicy {
                max_title_len: 32,
                ttl_ms: Some(60_000),
            }
        );
    }

    #[test]
    fn test_log_level_precedence() {
        let config = load(&[
            ("CT_OWNER_ADDRESS", OWNER),
            ("CT_LOG_LEVEL", "warn"),
            ("RUST_LOG", "trace"),
        ])
        .unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_owner_errors() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingOwner)));
        assert!(matches!(
            load(&[("CT_OWNER_ADDRESS", "0x1234")]),
            Err(ConfigError::InvalidOwner(_))
        ));
        assert!(matches!(
            load(&[(
                "CT_OWNER_ADDRESS",
                "0x0000000000000000000000000000000000000000"
            )]),
            Err(ConfigError::ZeroOwner)
        ));
    }

    #[test]
    fn test_bad_numbers() {
        for (key, value) in [
            ("CT_REQUEST_TTL_MS", "soon"),
            ("CT_REQUEST_TTL_MS", "0"),
            ("CT_MAX_TITLE_LEN", "-1"),
            ("CT_EVENT_CHANNEL_CAPACITY", "0"),
        ] {
            let err = load(&[("CT_OWNER_ADDRESS", OWNER), (key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: k, .. } if k == key),
                "{key}={value}: {err}"
            );
        }
    }
}
