// # DNS Provider Trait
//
// Defines the narrow interface the reconciler uses to query and mutate
// records at a remote DNS provider.
//
// ## Implementations
//
// - Tencent Cloud DNSPod: `dyndns-provider-dnspod` crate
// - Future: Cloudflare, Aliyun, Huaweicloud, etc.
//
// Implementations are thin API bindings. They perform single-shot calls and
// propagate failures; the reconciler owns the decision tree and converts
// errors into per-record results. A provider must never retry, cache, or
// decide whether a mutation is needed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{AccountCredentials, RecordType};
use crate::error::Result;

/// A DNS record as it currently exists at the provider
///
/// Transient snapshot returned by [`DnsProvider::list_records`]; the engine
/// never stores it beyond the current reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Provider-assigned record id
    pub id: String,
    /// Subdomain label (provider calls this the record name)
    pub name: String,
    /// Record type as the provider reports it ("A", "AAAA", ...)
    pub record_type: String,
    /// Current record value
    pub value: String,
    /// Routing line selector
    pub line: String,
}

/// Trait for DNS provider implementations
///
/// The four operations map one-to-one onto the provider's record API.
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List existing records for (domain, subdomain)
    ///
    /// Implementations should map a provider "no records" error onto
    /// [`crate::Error::NotFound`]; the reconciler treats that the same as an
    /// empty listing.
    async fn list_records(&self, domain: &str, subdomain: &str) -> Result<Vec<RemoteRecord>>;

    /// Create a record, returning the provider-assigned record id
    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
        line: &str,
        value: &str,
    ) -> Result<String>;

    /// Update an existing record's value in place
    async fn modify_record(
        &self,
        record_id: &str,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
        line: &str,
        value: &str,
    ) -> Result<()>;

    /// Delete a record by id
    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS provider clients from credentials
///
/// The orchestrator's [`crate::ClientCache`] calls this once per distinct
/// credential pair; the returned client is shared across cycles.
pub trait DnsProviderFactory: Send + Sync {
    /// Create a provider client for the given credential pair
    fn create(&self, credentials: &AccountCredentials) -> Result<Arc<dyn DnsProvider>>;
}
