//! Test doubles and common utilities for engine contract tests
//!
//! The mock provider keeps an in-memory record table and logs every call,
//! so tests can assert both the exact provider traffic and the remote state
//! left behind by a reconciliation.

use async_trait::async_trait;
use dyndns_core::config::{AccountCredentials, RecordType};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsProvider, DnsProviderFactory, IpResolver, RemoteRecord};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;

/// One provider API call, for asserting traffic and ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    List,
    Create,
    Modify,
    Delete,
}

/// A scriptable in-memory DNS provider
pub struct MockDnsProvider {
    /// (domain, record) rows currently "remote"
    records: Mutex<Vec<(String, RemoteRecord)>>,
    /// Every API call in order
    calls: Mutex<Vec<Call>>,
    /// Next record id to hand out
    next_id: AtomicUsize,
    /// Subdomain whose create calls fail, if any
    fail_create_for: Mutex<Option<String>>,
    /// When set, list_records returns the provider's "no records" error
    list_not_found: AtomicBool,
    /// Shutdown sender fired after the given call, for cancellation tests
    shutdown_on: Mutex<Option<(Call, watch::Sender<bool>)>>,
}

impl MockDnsProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            fail_create_for: Mutex::new(None),
            list_not_found: AtomicBool::new(false),
            shutdown_on: Mutex::new(None),
        })
    }

    /// Seed an existing remote record
    pub fn seed(&self, domain: &str, name: &str, record_type: &str, value: &str) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.records.lock().unwrap().push((
            domain.to_string(),
            RemoteRecord {
                id,
                name: name.to_string(),
                record_type: record_type.to_string(),
                value: value.to_string(),
                line: "default".to_string(),
            },
        ));
    }

    /// Make create calls for the given subdomain fail
    pub fn fail_create_for(&self, subdomain: &str) {
        *self.fail_create_for.lock().unwrap() = Some(subdomain.to_string());
    }

    /// Clear the create failure injection
    pub fn clear_create_failure(&self) {
        *self.fail_create_for.lock().unwrap() = None;
    }

    /// Make list_records surface the provider's "no records" error
    pub fn set_list_not_found(&self, on: bool) {
        self.list_not_found.store(on, Ordering::SeqCst);
    }

    /// Fire the shutdown watch right after the next call of the given kind
    pub fn trigger_shutdown_after(&self, call: Call, tx: watch::Sender<bool>) {
        *self.shutdown_on.lock().unwrap() = Some((call, tx));
    }

    /// All calls in order
    pub fn call_sequence(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls of one kind
    pub fn count(&self, call: Call) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    /// Number of mutation calls (everything but list)
    pub fn mutation_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c != Call::List)
            .count()
    }

    /// Snapshot of the remote records for a domain
    pub fn remote_records(&self, domain: &str) -> Vec<RemoteRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, _)| d == domain)
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        let guard = self.shutdown_on.lock().unwrap();
        if let Some((trigger, tx)) = guard.as_ref() {
            if *trigger == call {
                let _ = tx.send(true);
            }
        }
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str, subdomain: &str) -> Result<Vec<RemoteRecord>> {
        self.log(Call::List);

        if self.list_not_found.load(Ordering::SeqCst) {
            return Err(Error::not_found(format!("{subdomain}.{domain}")));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, r)| d == domain && r.name == subdomain)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
        line: &str,
        value: &str,
    ) -> Result<String> {
        self.log(Call::Create);

        if self.fail_create_for.lock().unwrap().as_deref() == Some(subdomain) {
            return Err(Error::provider("mock", "create rejected by provider"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.records.lock().unwrap().push((
            domain.to_string(),
            RemoteRecord {
                id: id.clone(),
                name: subdomain.to_string(),
                record_type: record_type.as_str().to_string(),
                value: value.to_string(),
                line: line.to_string(),
            },
        ));
        Ok(id)
    }

    async fn modify_record(
        &self,
        record_id: &str,
        _domain: &str,
        _subdomain: &str,
        _record_type: RecordType,
        _line: &str,
        value: &str,
    ) -> Result<()> {
        self.log(Call::Modify);

        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|(_, r)| r.id == record_id) {
            Some((_, record)) => {
                record.value = value.to_string();
                Ok(())
            }
            None => Err(Error::not_found(record_id)),
        }
    }

    async fn delete_record(&self, _domain: &str, record_id: &str) -> Result<()> {
        self.log(Call::Delete);

        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|(_, r)| r.id != record_id);
        if records.len() == before {
            return Err(Error::not_found(record_id));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out one shared mock provider regardless of credentials
pub struct SharedProviderFactory {
    provider: Arc<MockDnsProvider>,
}

impl SharedProviderFactory {
    pub fn new(provider: Arc<MockDnsProvider>) -> Box<Self> {
        Box::new(Self { provider })
    }
}

impl DnsProviderFactory for SharedProviderFactory {
    fn create(&self, _credentials: &AccountCredentials) -> Result<Arc<dyn DnsProvider>> {
        Ok(Arc::clone(&self.provider) as Arc<dyn DnsProvider>)
    }
}

/// An IP resolver returning fixed addresses, counting calls
pub struct StaticIpResolver {
    v4: Option<String>,
    v6: Option<String>,
    v4_calls: AtomicUsize,
    v6_calls: AtomicUsize,
}

impl StaticIpResolver {
    pub fn new(v4: Option<&str>, v6: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            v4: v4.map(str::to_string),
            v6: v6.map(str::to_string),
            v4_calls: AtomicUsize::new(0),
            v6_calls: AtomicUsize::new(0),
        })
    }

    pub fn v4_calls(&self) -> usize {
        self.v4_calls.load(Ordering::SeqCst)
    }

    pub fn v6_calls(&self) -> usize {
        self.v6_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpResolver for StaticIpResolver {
    async fn resolve_v4(&self) -> Option<String> {
        self.v4_calls.fetch_add(1, Ordering::SeqCst);
        self.v4.clone()
    }

    async fn resolve_v6(&self) -> Option<String> {
        self.v6_calls.fetch_add(1, Ordering::SeqCst);
        self.v6.clone()
    }
}
