//! Contract tests for shutdown behavior
//!
//! Cancellation is only observed between records: an in-flight record
//! always completes (including both halves of a recreate), and the partial
//! result list of an interrupted cycle is still delivered.

mod common;

use std::sync::Arc;

use common::{Call, MockDnsProvider, SharedProviderFactory, StaticIpResolver};
use dyndns_core::config::{
    AccountCredentials, AccountSpec, DomainSpec, RecordSpec, RecordType, SyncConfig,
};
use dyndns_core::orchestrator::UpdateOrchestrator;
use tokio::sync::watch;

fn single_account_config(records: Vec<RecordSpec>) -> SyncConfig {
    SyncConfig::new(vec![AccountSpec {
        credentials: AccountCredentials::new("acct", "sid", "skey"),
        domains: vec![DomainSpec::new("example.com", records)],
    }])
}

#[tokio::test]
async fn pre_cancelled_run_processes_no_records() {
    let provider = MockDnsProvider::new();
    let resolver = StaticIpResolver::new(Some("198.51.100.9"), None);
    let config = single_account_config(vec![RecordSpec::new("home", RecordType::A)]);

    let (orchestrator, mut rx) = UpdateOrchestrator::new(
        SharedProviderFactory::new(provider.clone()),
        resolver,
        config,
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let orchestrator = Arc::new(orchestrator);
    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run(shutdown_rx).await }
    });
    task.await.unwrap();

    // The interrupted cycle still delivers its (empty) result list
    let results = rx.recv().await.unwrap();
    assert!(results.is_empty());
    assert_eq!(provider.count(Call::Create), 0);
}

#[tokio::test]
async fn cancellation_stops_at_next_record_boundary() {
    let provider = MockDnsProvider::new();
    let resolver = StaticIpResolver::new(Some("198.51.100.9"), None);
    let config = single_account_config(vec![
        RecordSpec::new("home", RecordType::A),
        RecordSpec::new("www", RecordType::A),
        RecordSpec::new("nas", RecordType::A),
    ]);

    let (orchestrator, mut rx) = UpdateOrchestrator::new(
        SharedProviderFactory::new(provider.clone()),
        resolver,
        config,
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    // Shutdown lands while the first record is being created
    provider.trigger_shutdown_after(Call::Create, shutdown_tx);

    let orchestrator = Arc::new(orchestrator);
    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run(shutdown_rx).await }
    });
    task.await.unwrap();

    // First record finished, the remaining two were never visited
    let results = rx.recv().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].subdomain, "home");
    assert_eq!(provider.count(Call::Create), 1);
}

#[tokio::test]
async fn recreate_sequence_never_split_by_shutdown() {
    let provider = MockDnsProvider::new();
    provider.seed("example.com", "home", "AAAA", "2001:db8::1");
    let resolver = StaticIpResolver::new(Some("198.51.100.9"), None);
    let config = single_account_config(vec![
        RecordSpec::new("home", RecordType::A),
        RecordSpec::new("www", RecordType::A),
    ]);

    let (orchestrator, mut rx) = UpdateOrchestrator::new(
        SharedProviderFactory::new(provider.clone()),
        resolver,
        config,
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    // Shutdown lands between the delete and the create of a recreate
    provider.trigger_shutdown_after(Call::Delete, shutdown_tx);

    let orchestrator = Arc::new(orchestrator);
    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run(shutdown_rx).await }
    });
    task.await.unwrap();

    // The create half still ran; only the following record was skipped
    assert_eq!(
        provider.call_sequence(),
        vec![Call::List, Call::Delete, Call::Create]
    );
    let results = rx.recv().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(provider.remote_records("example.com")[0].record_type, "A");
}
