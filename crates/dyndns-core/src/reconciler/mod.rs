//! Record reconciler
//!
//! Given one desired record spec and a resolved IP, the reconciler queries
//! the provider, decides the required action, and executes it:
//!
//! - record absent remotely → create
//! - record present with mismatched type → delete, then create (non-atomic)
//! - record present, value already equal → no-op, zero mutation calls
//! - record present, value differs → modify in place
//!
//! The reconciler is infallible at its boundary: every outcome, including
//! provider failures, becomes an [`UpdateResult`] for the record. The
//! mismatched-type recreate is deliberately not rolled back on a partial
//! failure; the next cycle self-heals through the create path.

use tracing::{info, warn};

use crate::config::RecordSpec;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, RemoteRecord};

/// Sentinel IP reported for records skipped because they are disabled
pub const DISABLED_SENTINEL_IP: &str = "127.0.0.1";

/// Outcome of reconciling one record spec
///
/// Created fresh each cycle, returned up the call chain, never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    /// Whether the record is in the desired state after this step
    pub success: bool,
    /// Human-readable outcome; provider error text verbatim on failure
    pub message: String,
    /// The IP involved, or a sentinel/empty string when none applies
    pub ip: String,
    /// Parent domain name
    pub domain: String,
    /// Subdomain label
    pub subdomain: String,
}

impl UpdateResult {
    fn ok(message: impl Into<String>, ip: &str, domain: &str, subdomain: &str) -> Self {
        Self {
            success: true,
            message: message.into(),
            ip: ip.to_string(),
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
        }
    }

    fn failed(message: impl Into<String>, ip: &str, domain: &str, subdomain: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            ip: ip.to_string(),
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
        }
    }
}

/// Reconcile one record spec against the provider
///
/// `ip` is the address resolved for the record's type, or None if discovery
/// failed this cycle. Never returns an error; sibling records are isolated
/// from each other's failures.
pub async fn reconcile_record(
    provider: &dyn DnsProvider,
    domain: &str,
    spec: &RecordSpec,
    ip: Option<&str>,
) -> UpdateResult {
    if !spec.enabled {
        info!(
            "record {}.{} is disabled, skipping",
            spec.subdomain, domain
        );
        return UpdateResult::failed(
            "record disabled",
            DISABLED_SENTINEL_IP,
            domain,
            &spec.subdomain,
        );
    }

    let Some(ip) = ip else {
        warn!(
            "no {} address available for {}.{}",
            spec.record_type, spec.subdomain, domain
        );
        return UpdateResult::failed(
            format!("{} address unavailable", spec.record_type),
            "",
            domain,
            &spec.subdomain,
        );
    };

    match reconcile_inner(provider, domain, spec, ip).await {
        Ok(result) => result,
        Err(e) => {
            warn!(
                "reconciliation failed for {}.{}: {}",
                spec.subdomain, domain, e
            );
            UpdateResult::failed(e.to_string(), ip, domain, &spec.subdomain)
        }
    }
}

async fn reconcile_inner(
    provider: &dyn DnsProvider,
    domain: &str,
    spec: &RecordSpec,
    ip: &str,
) -> Result<UpdateResult> {
    let records = match provider.list_records(domain, &spec.subdomain).await {
        Ok(records) => records,
        // Race-tolerant: a record deleted by a concurrent cycle is the same
        // as one that never existed.
        Err(Error::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    match select_existing(&records, spec) {
        None => create_record(provider, domain, spec, ip).await,
        Some(existing) if existing.record_type != spec.record_type.as_str() => {
            info!(
                "record type mismatch for {}.{} ({} -> {}), recreating",
                spec.subdomain, domain, existing.record_type, spec.record_type
            );
            provider.delete_record(domain, &existing.id).await?;
            create_record(provider, domain, spec, ip).await
        }
        Some(existing) if existing.value == ip => Ok(UpdateResult::ok(
            "already up to date",
            ip,
            domain,
            &spec.subdomain,
        )),
        Some(existing) => {
            info!("updating record {}.{} -> {}", spec.subdomain, domain, ip);
            provider
                .modify_record(
                    &existing.id,
                    domain,
                    &spec.subdomain,
                    spec.record_type,
                    &spec.line,
                    ip,
                )
                .await?;
            Ok(UpdateResult::ok(
                "record updated",
                ip,
                domain,
                &spec.subdomain,
            ))
        }
    }
}

/// Pick the canonical existing record for a spec
///
/// Among records whose name matches the subdomain, the first whose type
/// matches the spec wins; if none match by type, the first name match is
/// returned and triggers the recreate path.
fn select_existing<'a>(records: &'a [RemoteRecord], spec: &RecordSpec) -> Option<&'a RemoteRecord> {
    let named: Vec<&RemoteRecord> = records
        .iter()
        .filter(|r| r.name == spec.subdomain)
        .collect();
    named
        .iter()
        .find(|r| r.record_type == spec.record_type.as_str())
        .copied()
        .or_else(|| named.first().copied())
}

async fn create_record(
    provider: &dyn DnsProvider,
    domain: &str,
    spec: &RecordSpec,
    ip: &str,
) -> Result<UpdateResult> {
    info!(
        "creating record {}.{} ({}) -> {}",
        spec.subdomain, domain, spec.record_type, ip
    );
    provider
        .create_record(domain, &spec.subdomain, spec.record_type, &spec.line, ip)
        .await?;
    Ok(UpdateResult::ok(
        "record created",
        ip,
        domain,
        &spec.subdomain,
    ))
}
