// # dyndns-core
//
// Core library for the dyndns record reconciliation engine.
//
// ## Architecture Overview
//
// This library keeps remote DNS A/AAAA records in sync with the machine's
// current addresses:
//
// - **IpResolver**: Trait for discovering the current public IPv4 / global
//   IPv6 address (implemented by `dyndns-ip`)
// - **DnsProvider**: Trait over the remote provider's record API
//   (implemented by `dyndns-provider-dnspod`)
// - **reconciler**: Per-record decision tree (create / recreate / modify /
//   no-op), tolerant of partial failures
// - **UpdateOrchestrator**: Sequential cycle driver with scheduling and
//   cancellation
// - **ClientCache**: Per-credential provider client cache
//
// ## Design Principles
//
// 1. **One result per record**: every visited record spec yields exactly one
//    `UpdateResult`; no failure aborts sibling records
// 2. **Pure per cycle**: the engine is a function of (configuration, current
//    network state); no state persists between cycles
// 3. **Eventual consistency**: the remote provider is the sole source of
//    truth; a failed cycle is repaired by the next one, never by in-cycle
//    retries

pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use cache::ClientCache;
pub use config::{
    AccountCredentials, AccountSpec, DEFAULT_IPV4_SOURCES, DomainSpec, RecordSpec, RecordType,
    SyncConfig,
};
pub use error::{Error, Result};
pub use orchestrator::UpdateOrchestrator;
pub use reconciler::{DISABLED_SENTINEL_IP, UpdateResult, reconcile_record};
pub use traits::{DnsProvider, DnsProviderFactory, IpResolver, RemoteRecord};
