// # dyndnsd - Dynamic DNS Daemon
//
// Thin integration layer wiring the engine together:
// 1. Read configuration from environment variables
// 2. Initialize tracing and the tokio runtime
// 3. Build the DNSPod factory, the IP resolver and the orchestrator
// 4. Run one cycle (one-shot) or the continuous update loop
//
// All reconciliation logic lives in dyndns-core; the daemon never inspects
// individual records beyond logging results.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DYNDNS_SECRET_ID`: DNSPod API secret id (required)
// - `DYNDNS_SECRET_KEY`: DNSPod API secret key (required)
// - `DYNDNS_DOMAIN`: Parent domain to manage (required)
// - `DYNDNS_RECORDS`: Comma-separated record specs `sub:TYPE[:line]`
//   (required), e.g. `home:A,home:AAAA,nas:A:telecom`
// - `DYNDNS_IP_SOURCES`: Comma-separated IPv4 echo URLs (optional)
// - `DYNDNS_INTERVAL_MINS`: Minutes between cycles (default 5)
// - `DYNDNS_ONESHOT`: Run a single cycle and exit (`1` or `true`)
// - `DYNDNS_LOG_LEVEL`: trace | debug | info | warn | error (default info)
//
// ## Example
//
// ```bash
// export DYNDNS_SECRET_ID=AKIDxxxxxxxx
// export DYNDNS_SECRET_KEY=xxxxxxxx
// export DYNDNS_DOMAIN=example.com
// export DYNDNS_RECORDS=home:A,home:AAAA
//
// dyndnsd
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use dyndns_core::{
    AccountCredentials, AccountSpec, DomainSpec, RecordSpec, RecordType, SyncConfig,
    UpdateOrchestrator, UpdateResult,
};
use dyndns_ip::PublicIpResolver;
use dyndns_provider_dnspod::DnspodFactory;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    secret_id: String,
    secret_key: String,
    domain: String,
    records: Vec<String>,
    ip_sources: Option<Vec<String>>,
    interval_mins: u64,
    oneshot: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            secret_id: env::var("DYNDNS_SECRET_ID").unwrap_or_default(),
            secret_key: env::var("DYNDNS_SECRET_KEY").unwrap_or_default(),
            domain: env::var("DYNDNS_DOMAIN").unwrap_or_default(),
            records: env::var("DYNDNS_RECORDS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ip_sources: env::var("DYNDNS_IP_SOURCES").ok().map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            interval_mins: env::var("DYNDNS_INTERVAL_MINS")
                .ok()
                .map(|s| s.parse().unwrap_or(5))
                .unwrap_or(5),
            oneshot: env::var("DYNDNS_ONESHOT")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_level: env::var("DYNDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.secret_id.is_empty() {
            anyhow::bail!(
                "DYNDNS_SECRET_ID is required. \
                Set it via: export DYNDNS_SECRET_ID=your_secret_id"
            );
        }

        if self.secret_key.is_empty() {
            anyhow::bail!(
                "DYNDNS_SECRET_KEY is required. \
                Set it via: export DYNDNS_SECRET_KEY=your_secret_key"
            );
        }

        if self.domain.is_empty() {
            anyhow::bail!(
                "DYNDNS_DOMAIN is required. \
                Set it via: export DYNDNS_DOMAIN=example.com"
            );
        }

        if self.records.is_empty() {
            anyhow::bail!(
                "DYNDNS_RECORDS must contain at least one record spec. \
                Set it via: export DYNDNS_RECORDS=home:A,home:AAAA"
            );
        }

        for record in &self.records {
            parse_record_spec(record)
                .with_context(|| format!("DYNDNS_RECORDS entry '{record}' is invalid"))?;
        }

        if let Some(sources) = &self.ip_sources
            && sources.is_empty()
        {
            anyhow::bail!("DYNDNS_IP_SOURCES must not be empty when set");
        }

        if !(1..=1440).contains(&self.interval_mins) {
            anyhow::bail!(
                "DYNDNS_INTERVAL_MINS must be between 1 and 1440 minutes. Got: {}",
                self.interval_mins
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DYNDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the engine configuration
    fn to_sync_config(&self) -> Result<SyncConfig> {
        let records = self
            .records
            .iter()
            .map(|r| parse_record_spec(r))
            .collect::<Result<Vec<_>>>()?;

        let account = AccountSpec {
            credentials: AccountCredentials::new(
                self.secret_id.clone(),
                self.secret_id.clone(),
                self.secret_key.clone(),
            ),
            domains: vec![DomainSpec::new(self.domain.clone(), records)],
        };

        let mut config = SyncConfig::new(vec![account]);
        config.interval_mins = self.interval_mins;
        if let Some(sources) = &self.ip_sources {
            config.ipv4_sources = sources.clone();
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
        Ok(config)
    }
}

/// Parse one `sub:TYPE[:line]` record spec
fn parse_record_spec(spec: &str) -> Result<RecordSpec> {
    let mut parts = spec.splitn(3, ':');

    let subdomain = parts
        .next()
        .filter(|s| !s.is_empty())
        .context("missing subdomain")?;
    let record_type: RecordType = parts
        .next()
        .filter(|s| !s.is_empty())
        .context("missing record type")?
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let record = RecordSpec::new(subdomain, record_type);
    Ok(match parts.next().filter(|s| !s.is_empty()) {
        Some(line) => record.with_line(line),
        None => record,
    })
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e:#}");
        return DaemonExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");
    info!(
        "Managing {} record(s) under {}",
        config.records.len(),
        config.domain
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return DaemonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => DaemonExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {e:#}");
                DaemonExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let sync_config = config.to_sync_config()?;

    let resolver = Arc::new(match &config.ip_sources {
        Some(sources) => PublicIpResolver::new(sources.clone()),
        None => PublicIpResolver::with_default_sources(),
    });

    let (orchestrator, mut results_rx) =
        UpdateOrchestrator::new(Box::new(DnspodFactory), resolver, sync_config)
            .map_err(|e| anyhow::anyhow!("failed to build orchestrator: {e}"))?;

    if config.oneshot {
        info!("One-shot mode, running a single cycle");
        let results = orchestrator.run_cycle().await;
        log_cycle_summary(&results);
        return Ok(());
    }

    // Consumer logging one summary per delivered cycle
    let consumer = tokio::spawn(async move {
        while let Some(results) = results_rx.recv().await {
            log_cycle_summary(&results);
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(name) => info!("Received {name}, shutting down"),
            Err(e) => error!("Signal handler error: {e}"),
        }
        let _ = shutdown_tx.send(true);
    });

    orchestrator.run(shutdown_rx).await;

    drop(orchestrator);
    let _ = consumer.await;

    info!("Shutdown complete");
    Ok(())
}

fn log_cycle_summary(results: &[UpdateResult]) {
    let succeeded = results.iter().filter(|r| r.success).count();
    info!(
        "cycle finished: {} record(s), {} succeeded, {} failed",
        results.len(),
        succeeded,
        results.len() - succeeded
    );
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {e}"))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {e}"))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C (non-Unix fallback)
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {e}"))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_record_spec() {
        let record = parse_record_spec("home:A").unwrap();
        assert_eq!(record.subdomain, "home");
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.line, "default");
        assert!(record.enabled);
    }

    #[test]
    fn parses_record_spec_with_line() {
        let record = parse_record_spec("nas:AAAA:telecom").unwrap();
        assert_eq!(record.subdomain, "nas");
        assert_eq!(record.record_type, RecordType::Aaaa);
        assert_eq!(record.line, "telecom");
    }

    #[test]
    fn record_type_is_case_insensitive() {
        assert_eq!(
            parse_record_spec("home:aaaa").unwrap().record_type,
            RecordType::Aaaa
        );
    }

    #[test]
    fn rejects_malformed_record_specs() {
        assert!(parse_record_spec("home").is_err());
        assert!(parse_record_spec(":A").is_err());
        assert!(parse_record_spec("home:").is_err());
        assert!(parse_record_spec("home:CNAME").is_err());
    }
}
