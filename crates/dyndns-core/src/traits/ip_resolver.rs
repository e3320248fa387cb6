// # IP Resolver Trait
//
// Defines the interface for discovering the machine's current addresses.
//
// ## Implementations
//
// - HTTP echo + interface scan: `dyndns-ip` crate
//
// Both methods return `Option<String>` rather than `Result`: every source
// failure is already logged inside the implementation, and exhaustion is an
// expected condition the reconciler turns into a per-record failure result,
// not a process fault. Addresses stay as strings end to end because the
// IPv4 extraction deliberately does not validate octet ranges.

use async_trait::async_trait;

/// Trait for IP discovery implementations
///
/// Each call is independent and idempotent; implementations perform network
/// or interface I/O only and mutate no shared state. The orchestrator calls
/// each method once per account per cycle.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Discover the current public IPv4 address, or None if every source failed
    async fn resolve_v4(&self) -> Option<String>;

    /// Discover a usable global IPv6 address from local interfaces, or None
    async fn resolve_v6(&self) -> Option<String>;
}
