//! Update orchestrator
//!
//! Drives one full reconciliation cycle: for each configured account it
//! resolves IPv4 and IPv6 once, walks the account's domains and records in
//! configuration order, invokes the reconciler per record, and aggregates
//! the per-record results. Processing is strictly sequential; provider APIs
//! are rate-limited per credential pair and sequential cycles keep result
//! ordering deterministic for log correlation.
//!
//! ## Lifecycle
//!
//! 1. Create with [`UpdateOrchestrator::new()`], which also yields the
//!    receiver the collaborator (UI/logger) consumes cycle results from
//! 2. One-shot: call [`UpdateOrchestrator::run_cycle()`]
//! 3. Continuous: call [`UpdateOrchestrator::run()`] with a shutdown watch;
//!    the loop sleeps `interval_mins` between cycles until cancelled
//!
//! ## Cancellation
//!
//! Cancellation is observed at record boundaries only. A record mid-flight
//! always completes, so a delete+create recreate sequence is never split by
//! shutdown; the partial result list for an interrupted cycle is still
//! delivered.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::cache::ClientCache;
use crate::config::{RecordType, SyncConfig};
use crate::error::Result;
use crate::reconciler::{UpdateResult, reconcile_record};
use crate::traits::{DnsProviderFactory, IpResolver};

/// Orchestrates reconciliation cycles over all configured accounts
pub struct UpdateOrchestrator {
    /// Per-credential provider client cache
    clients: ClientCache,

    /// IP discovery implementation, queried once per account per cycle
    resolver: Arc<dyn IpResolver>,

    /// Engine configuration, immutable for the orchestrator's lifetime
    config: SyncConfig,

    /// Sender delivering each cycle's result list to the collaborator
    results_tx: mpsc::Sender<Vec<UpdateResult>>,
}

impl UpdateOrchestrator {
    /// Create a new orchestrator
    ///
    /// Returns the orchestrator and the receiver yielding one result list
    /// per completed cycle.
    pub fn new(
        factory: Box<dyn DnsProviderFactory>,
        resolver: Arc<dyn IpResolver>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<Vec<UpdateResult>>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.result_channel_capacity);

        let orchestrator = Self {
            clients: ClientCache::new(factory),
            resolver,
            config,
            results_tx: tx,
        };

        Ok((orchestrator, rx))
    }

    /// Run a single reconciliation cycle and return its results
    ///
    /// Results are returned directly and not sent over the channel; one-shot
    /// callers consume them in place.
    pub async fn run_cycle(&self) -> Vec<UpdateResult> {
        self.cycle(None).await
    }

    /// Run continuously until the shutdown watch flips to true
    ///
    /// Each cycle's results are delivered over the channel returned by
    /// [`UpdateOrchestrator::new()`].
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            "starting update loop, interval {} minute(s)",
            self.config.interval_mins
        );

        loop {
            let results = self.cycle(Some(&shutdown_rx)).await;
            self.deliver(results);

            if *shutdown_rx.borrow() {
                break;
            }

            let interval = Duration::from_secs(self.config.interval_mins * 60);
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("update loop stopped");
    }

    /// One pass over all accounts, cancel-aware at record boundaries
    async fn cycle(&self, shutdown: Option<&watch::Receiver<bool>>) -> Vec<UpdateResult> {
        let mut results = Vec::new();

        'accounts: for account in &self.config.accounts {
            info!(account = %account.credentials.id, "processing account");

            let provider = match self.clients.get_or_create(&account.credentials) {
                Ok(provider) => provider,
                Err(e) => {
                    warn!(
                        account = %account.credentials.id,
                        "failed to construct provider client: {e}"
                    );
                    // The account's records are still accounted for, one
                    // failure result each.
                    for domain in &account.domains {
                        for spec in &domain.records {
                            results.push(UpdateResult {
                                success: false,
                                message: e.to_string(),
                                ip: String::new(),
                                domain: domain.name.clone(),
                                subdomain: spec.subdomain.clone(),
                            });
                        }
                    }
                    continue;
                }
            };

            // Resolved once per account, shared across its records, bounding
            // external discovery calls to O(accounts).
            let ipv4 = self.resolver.resolve_v4().await;
            let ipv6 = self.resolver.resolve_v6().await;
            debug!(?ipv4, ?ipv6, "resolved addresses");

            for domain in &account.domains {
                for spec in &domain.records {
                    if is_cancelled(shutdown) {
                        info!("shutdown requested, stopping cycle at record boundary");
                        break 'accounts;
                    }

                    let ip = match spec.record_type {
                        RecordType::A => ipv4.as_deref(),
                        RecordType::Aaaa => ipv6.as_deref(),
                    };

                    let result =
                        reconcile_record(provider.as_ref(), &domain.name, spec, ip).await;
                    info!(
                        "result: {}.{} -> {} ({})",
                        result.subdomain, result.domain, result.ip, result.message
                    );
                    results.push(result);
                }
            }
        }

        results
    }

    /// Hand a cycle's results to the collaborator
    fn deliver(&self, results: Vec<UpdateResult>) {
        if self.results_tx.try_send(results).is_err() {
            warn!("result channel full or closed, dropping cycle results");
        }
    }
}

fn is_cancelled(shutdown: Option<&watch::Receiver<bool>>) -> bool {
    shutdown.is_some_and(|rx| *rx.borrow())
}
