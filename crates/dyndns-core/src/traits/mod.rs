//! Core traits for the dyndns system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpResolver`]: Discover the machine's current public IPv4 / global IPv6 address
//! - [`DnsProvider`]: Query and mutate DNS records via provider APIs

pub mod dns_provider;
pub mod ip_resolver;

pub use dns_provider::{DnsProvider, DnsProviderFactory, RemoteRecord};
pub use ip_resolver::IpResolver;
