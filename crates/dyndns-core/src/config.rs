//! Configuration types for the dyndns system
//!
//! This module defines all configuration structures consumed by the engine.
//! Configuration is owned by the caller and passed in for the duration of
//! one reconciliation cycle; the engine never persists it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Default public IPv4 echo sources
///
/// Each endpoint returns a plain-text (or HTML) body containing the
/// caller's public IPv4 address.
pub const DEFAULT_IPV4_SOURCES: &[&str] = &[
    "http://www.3322.org/dyndns/getip",
    "https://ifconfig.me/ip",
    "https://api.ip.sb/ip",
];

/// DNS record type managed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Wire representation used by provider APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(crate::Error::config(format!(
                "Unsupported record type: {other}"
            ))),
        }
    }
}

/// One desired DNS record under a parent domain
///
/// Identity key within an account = (parent domain, subdomain, record type).
/// Duplicates are rejected by [`SyncConfig::validate`] before a cycle runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSpec {
    /// Subdomain label (e.g., "home", "www", "@")
    pub subdomain: String,

    /// Record type (A for IPv4, AAAA for IPv6)
    pub record_type: RecordType,

    /// Provider-specific routing line selector
    #[serde(default = "default_line")]
    pub line: String,

    /// Whether this record is reconciled; disabled records still produce a
    /// skip result, they are never silently omitted
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RecordSpec {
    /// Create a new record spec with the default line, enabled
    pub fn new(subdomain: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            subdomain: subdomain.into(),
            record_type,
            line: default_line(),
            enabled: true,
        }
    }

    /// Set the routing line
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = line.into();
        self
    }

    /// Enable or disable the record
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A parent domain and its ordered record specs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Parent domain name (e.g., "example.com")
    pub name: String,

    /// Records under this domain, reconciled in this order
    pub records: Vec<RecordSpec>,
}

impl DomainSpec {
    /// Create a new domain spec
    pub fn new(name: impl Into<String>, records: Vec<RecordSpec>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Credential pair used to construct a provider client
///
/// Opaque to the engine beyond serving as the client-cache key.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountCredentials {
    /// Display identifier for logs
    pub id: String,

    /// Provider access key id
    pub secret_id: String,

    /// Provider access key secret
    pub secret_key: String,
}

impl AccountCredentials {
    /// Create a new credential pair
    pub fn new(
        id: impl Into<String>,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Client-cache key for this credential pair
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.secret_id, self.secret_key)
    }
}

// Custom Debug implementation that hides the secret key
impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("id", &self.id)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

/// One provider account: credentials plus the domains it manages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSpec {
    /// Credential pair for the provider client
    pub credentials: AccountCredentials,

    /// Domains in configuration order
    pub domains: Vec<DomainSpec>,
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Accounts in configuration order
    pub accounts: Vec<AccountSpec>,

    /// HTTP echo endpoints for public IPv4 discovery
    #[serde(default = "default_ipv4_sources")]
    pub ipv4_sources: Vec<String>,

    /// Minutes between reconciliation cycles in continuous mode
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u64,

    /// Capacity of the per-cycle result channel
    #[serde(default = "default_result_channel_capacity")]
    pub result_channel_capacity: usize,
}

impl SyncConfig {
    /// Create a configuration for the given accounts with defaults
    pub fn new(accounts: Vec<AccountSpec>) -> Self {
        Self {
            accounts,
            ipv4_sources: default_ipv4_sources(),
            interval_mins: default_interval_mins(),
            result_channel_capacity: default_result_channel_capacity(),
        }
    }

    /// Validate the configuration
    ///
    /// An empty account list is valid (a cycle then yields an empty result
    /// list), but duplicate record identities and nonsense intervals are
    /// configuration errors.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_mins == 0 {
            return Err(crate::Error::config("Update interval must be > 0 minutes"));
        }

        if self.ipv4_sources.is_empty() {
            return Err(crate::Error::config(
                "At least one IPv4 echo source is required",
            ));
        }

        if self.result_channel_capacity == 0 {
            return Err(crate::Error::config("Result channel capacity must be > 0"));
        }

        for account in &self.accounts {
            if account.credentials.secret_id.is_empty()
                || account.credentials.secret_key.is_empty()
            {
                return Err(crate::Error::config(format!(
                    "Account '{}' has empty credentials",
                    account.credentials.id
                )));
            }

            let mut seen: HashSet<(&str, &str, RecordType)> = HashSet::new();
            for domain in &account.domains {
                if domain.name.is_empty() {
                    return Err(crate::Error::config(format!(
                        "Account '{}' has a domain with an empty name",
                        account.credentials.id
                    )));
                }

                for record in &domain.records {
                    if record.subdomain.is_empty() {
                        return Err(crate::Error::config(format!(
                            "Domain '{}' has a record with an empty subdomain",
                            domain.name
                        )));
                    }

                    let key = (
                        domain.name.as_str(),
                        record.subdomain.as_str(),
                        record.record_type,
                    );
                    if !seen.insert(key) {
                        return Err(crate::Error::config(format!(
                            "Duplicate record {}.{} ({}) in account '{}'",
                            record.subdomain,
                            domain.name,
                            record.record_type,
                            account.credentials.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

fn default_line() -> String {
    "default".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_ipv4_sources() -> Vec<String> {
    DEFAULT_IPV4_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_interval_mins() -> u64 {
    5
}

fn default_result_channel_capacity() -> usize {
    16
}
