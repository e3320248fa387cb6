// # dyndns-ip
//
// Address discovery for the dyndns engine.
//
// ## IPv4
//
// Public IPv4 is discovered through HTTP echo services. The configured
// sources are tried in shuffled order with a randomized browser User-Agent
// (some echo services answer differently, or not at all, to non-browser
// clients), and the first IPv4-looking token in a response body wins. The
// HTTP transport is pinned to IPv4 so a dual-stack host cannot receive an
// IPv6 answer from a dual-stack echo service.
//
// ## IPv6
//
// Global IPv6 is read from local interfaces via `getifaddrs`; no network
// traffic is involved. Link-local, loopback, unspecified and zoned
// addresses are filtered out and the first remaining address wins.

mod ifaces;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use dyndns_core::config::DEFAULT_IPV4_SOURCES;
use dyndns_core::traits::IpResolver;
use rand::seq::{IndexedRandom, SliceRandom};
use regex::Regex;
use tracing::{debug, error, warn};

pub use ifaces::interface_addresses;

/// Per-request timeout against echo services
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Browser User-Agent pool for echo requests
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

// Deliberately loose (no octet range check): echo services return
// well-formed addresses and the looseness keeps extraction robust against
// HTML wrapping.
static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("static pattern compiles")
});

/// Discovers the machine's public IPv4 and global IPv6 addresses
pub struct PublicIpResolver {
    /// HTTP echo endpoints, tried in shuffled order each resolve
    sources: Vec<String>,

    /// HTTP client bound to the IPv4 unspecified address
    client: reqwest::Client,
}

impl PublicIpResolver {
    /// Create a resolver over the given echo sources
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            // Binding the local address to 0.0.0.0 forces IPv4 transport,
            // so the echo service sees (and reports) our IPv4 address.
            client: reqwest::Client::builder()
                .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a resolver over the default echo sources
    pub fn with_default_sources() -> Self {
        Self::new(DEFAULT_IPV4_SOURCES.iter().map(|s| s.to_string()).collect())
    }

    async fn fetch_from(&self, source: &str) -> Result<String, reqwest::Error> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let response = self
            .client
            .get(source)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?
            .error_for_status()?;

        response.text().await
    }
}

#[async_trait]
impl IpResolver for PublicIpResolver {
    async fn resolve_v4(&self) -> Option<String> {
        let sources = {
            let mut sources = self.sources.clone();
            sources.shuffle(&mut rand::rng());
            sources
        };

        for source in &sources {
            match self.fetch_from(source).await {
                Ok(body) => {
                    if let Some(ip) = extract_ipv4(&body) {
                        debug!(source, ip, "public IPv4 resolved");
                        return Some(ip);
                    }
                    warn!(source, "echo response contained no IPv4 address");
                }
                Err(e) => {
                    warn!(source, "echo request failed: {e}");
                }
            }
        }

        error!("all {} IPv4 echo sources exhausted", sources.len());
        None
    }

    async fn resolve_v6(&self) -> Option<String> {
        let addresses = ifaces::interface_addresses();
        let selected = select_global_ipv6(&addresses);
        match &selected {
            Some(ip) => debug!(ip, "global IPv6 selected"),
            None => warn!(
                "no global IPv6 among {} interface addresses",
                addresses.len()
            ),
        }
        selected
    }
}

/// Extract the first IPv4-looking token from an echo response body
pub fn extract_ipv4(body: &str) -> Option<String> {
    IPV4_RE.find(body).map(|m| m.as_str().to_string())
}

/// Pick the first globally routable IPv6 address from interface addresses
///
/// Rejects link-local (`fe80:`), unspecified/loopback (`::` prefix),
/// `::1`-suffixed and zoned (`%`) addresses.
pub fn select_global_ipv6(addresses: &[String]) -> Option<String> {
    addresses
        .iter()
        .find(|a| {
            !a.starts_with("fe80:")
                && !a.starts_with("::")
                && !a.ends_with("::1")
                && !a.contains('%')
        })
        .cloned()
}
