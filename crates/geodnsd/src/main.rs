// # geodnsd - Geo-DNS Daemon
//
// Thin integration layer for the geo-DNS reconciliation service. All
// reconciliation logic lives in geodns-core; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes tracing and the runtime
// 3. Registers backends and geo-lookups
// 4. Starts the reconciliation engine
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Service
// - `GEODNS_HOSTNAME`: DNS name the service itself is published under
// - `GEODNS_BACKEND_TYPE`: Backend type (logging)
//
// ### Geo lookup
// - `GEODNS_GEO_URL`: Base URL of the ip-api style lookup service
// - `GEODNS_GEO_TIMEOUT_SECS`: Lookup request timeout
//
// ### Pool
// - `GEODNS_MEMBERS`: Comma-separated pool entries, each `id=hostname` or a
//   bare hostname (the hostname doubles as the id)
//
// ### Engine
// - `GEODNS_POLL_PERIOD_SECS`: Reconciliation poll period
// - `GEODNS_REFRESH_INTERVAL_SECS`: Forced full-publish interval
// - `GEODNS_USE_HOSTNAMES`: Publish hostnames rather than IPs (true/false)
// - `GEODNS_INCLUDE_HOMELESS`: Include members without geography (true/false)
// - `GEODNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export GEODNS_HOSTNAME=geo.example.com
// export GEODNS_GEO_URL=http://ip-api.com/json
// export GEODNS_MEMBERS=eu=eu.example.com,us=us.example.com
//
// geodnsd
// ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use geodns_core::config::{BackendConfig, EngineConfig, GeoDnsConfig, GeoLookupConfig};
use geodns_core::traits::Member;
use geodns_core::{
    BackendRegistry, GeoDnsEngine, StaticMembershipSource, SystemNameResolver,
};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum GeoDnsExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<GeoDnsExitCode> for ExitCode {
    fn from(code: GeoDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    hostname: String,
    backend_type: String,
    geo_url: String,
    geo_timeout_secs: u64,
    members: Vec<(String, String)>,
    poll_period_secs: Option<u64>,
    refresh_interval_secs: Option<u64>,
    use_hostnames: bool,
    include_homeless: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            hostname: env::var("GEODNS_HOSTNAME")?,
            backend_type: env::var("GEODNS_BACKEND_TYPE")
                .unwrap_or_else(|_| "logging".to_string()),
            geo_url: env::var("GEODNS_GEO_URL")
                .unwrap_or_else(|_| "http://ip-api.com/json".to_string()),
            geo_timeout_secs: env::var("GEODNS_GEO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            members: env::var("GEODNS_MEMBERS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|entry| match entry.split_once('=') {
                    Some((id, host)) => (id.trim().to_string(), host.trim().to_string()),
                    None => (entry.to_string(), entry.to_string()),
                })
                .collect(),
            poll_period_secs: env::var("GEODNS_POLL_PERIOD_SECS")
                .ok()
                .map(|s| s.parse().unwrap_or(30)),
            refresh_interval_secs: env::var("GEODNS_REFRESH_INTERVAL_SECS")
                .ok()
                .map(|s| s.parse().unwrap_or(3600)),
            use_hostnames: env::var("GEODNS_USE_HOSTNAMES")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(true),
            include_homeless: env::var("GEODNS_INCLUDE_HOMELESS")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            log_level: env::var("GEODNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.hostname.is_empty() {
            anyhow::bail!(
                "GEODNS_HOSTNAME is required. \
                Set it via: export GEODNS_HOSTNAME=geo.example.com"
            );
        }
        self.validate_domain_name(&self.hostname)?;

        match self.backend_type.as_str() {
            "logging" => {}
            _ => anyhow::bail!(
                "GEODNS_BACKEND_TYPE '{}' is not supported. \
                Supported backends: logging",
                self.backend_type
            ),
        }

        if !self.geo_url.starts_with("http://") && !self.geo_url.starts_with("https://") {
            anyhow::bail!(
                "GEODNS_GEO_URL must use HTTP or HTTPS scheme. Got: {}",
                self.geo_url
            );
        }

        if self.geo_timeout_secs == 0 || self.geo_timeout_secs > 300 {
            anyhow::bail!(
                "GEODNS_GEO_TIMEOUT_SECS must be between 1 and 300. Got: {}",
                self.geo_timeout_secs
            );
        }

        if self.members.is_empty() {
            anyhow::bail!(
                "GEODNS_MEMBERS must contain at least one entry. \
                Set it via: export GEODNS_MEMBERS=eu=eu.example.com,us=us.example.com"
            );
        }
        for (_, host) in &self.members {
            self.validate_domain_name(host)?;
        }

        if let Some(period) = self.poll_period_secs
            && !(1..=3600).contains(&period)
        {
            anyhow::bail!(
                "GEODNS_POLL_PERIOD_SECS must be between 1 and 3600. Got: {}",
                period
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "GEODNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Validate that a string is a valid domain name (or IP literal)
    ///
    /// Basic RFC 1035 label checks; not comprehensive, but catches common
    /// mistakes before the engine starts polling with them.
    fn validate_domain_name(&self, domain: &str) -> Result<()> {
        if domain.is_empty() {
            anyhow::bail!("Domain name cannot be empty");
        }

        if domain.parse::<std::net::IpAddr>().is_ok() {
            return Ok(());
        }

        if domain.len() > 253 {
            anyhow::bail!(
                "Domain name too long: {} chars (max 253). Got: {}",
                domain.len(),
                domain
            );
        }

        for label in domain.split('.') {
            if label.is_empty() {
                anyhow::bail!("Domain name has empty label: '{}'", domain);
            }
            if label.len() > 63 {
                anyhow::bail!(
                    "Domain label too long: {} chars (max 63). Label: '{}'",
                    label.len(),
                    label
                );
            }
            if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
                anyhow::bail!(
                    "Domain label contains invalid characters. Label: '{}'. \
                    Valid: alphanumeric and hyphen only.",
                    label
                );
            }
            if label.starts_with('-') || label.ends_with('-') {
                anyhow::bail!(
                    "Domain label cannot start or end with hyphen. Label: '{}'",
                    label
                );
            }
        }

        Ok(())
    }

    /// Translate into the core configuration
    fn to_core_config(&self) -> GeoDnsConfig {
        let mut engine = EngineConfig {
            use_hostnames: self.use_hostnames,
            include_homeless_entities: self.include_homeless,
            ..EngineConfig::default()
        };
        if let Some(period) = self.poll_period_secs {
            engine.poll_period_secs = period;
        }
        if let Some(interval) = self.refresh_interval_secs {
            engine.refresh_interval_secs = interval;
        }

        GeoDnsConfig {
            backend: BackendConfig::Logging {
                hostname: self.hostname.clone(),
            },
            geo_lookup: GeoLookupConfig::Http {
                url: self.geo_url.clone(),
                timeout_secs: self.geo_timeout_secs,
            },
            engine,
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return GeoDnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return GeoDnsExitCode::ConfigError.into();
    }

    // Initialize tracing
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
        eprintln!("Failed to set tracing subscriber: {}", e);
        return GeoDnsExitCode::ConfigError.into();
    }

    info!("Starting geodnsd daemon");
    info!(
        "Configuration loaded: {} member(s), publishing as {}",
        config.members.len(),
        config.hostname
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return GeoDnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            GeoDnsExitCode::RuntimeError
        } else {
            GeoDnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    // Create the component registry and register built-ins
    let registry = BackendRegistry::new();
    registry.register_backend(
        "logging",
        Box::new(geodns_core::backend::LoggingBackendFactory),
    );

    #[cfg(feature = "geo-http")]
    {
        info!("Registering HTTP geo-lookup");
        geodns_geo_http::register(&registry);
    }

    let core_config = config.to_core_config();
    let backend = registry.create_backend(&core_config.backend)?;
    let geo_lookup: Arc<dyn geodns_core::GeoLookup> =
        Arc::from(registry.create_geo_lookup(&core_config.geo_lookup)?);

    let pool: Vec<Member> = config
        .members
        .iter()
        .map(|(id, host)| Member::new(id.as_str()).with_hostname(host.clone()))
        .collect();
    for member in &pool {
        info!("Monitoring member: {}", member.id);
    }
    let membership = StaticMembershipSource::new(pool);

    let (engine, _events) = GeoDnsEngine::new(
        Box::new(membership),
        backend,
        Arc::new(SystemNameResolver),
        geo_lookup,
        core_config,
    )?;

    info!("Starting reconciliation engine");
    engine.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            hostname: "geo.example.com".to_string(),
            backend_type: "logging".to_string(),
            geo_url: "http://ip-api.com/json".to_string(),
            geo_timeout_secs: 10,
            members: vec![("eu".to_string(), "eu.example.com".to_string())],
            poll_period_secs: None,
            refresh_interval_secs: None,
            use_hostnames: true,
            include_homeless: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn minimal_config_validates() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn empty_pool_rejected() {
        let mut config = minimal();
        config.members.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_domain_rejected() {
        let mut config = minimal();
        config.members = vec![("x".to_string(), "bad_domain!".to_string())];
        assert!(config.validate().is_err());
    }

    #[test]
    fn ip_literal_member_accepted() {
        let mut config = minimal();
        config.members = vec![("x".to_string(), "203.0.113.7".to_string())];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = minimal();
        config.backend_type = "route53".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn core_config_carries_policy() {
        let mut config = minimal();
        config.use_hostnames = false;
        config.include_homeless = true;
        config.poll_period_secs = Some(5);

        let core = config.to_core_config();
        assert!(!core.engine.use_hostnames);
        assert!(core.engine.include_homeless_entities);
        assert_eq!(core.engine.poll_period_secs, 5);
        assert!(core.validate().is_ok());
    }
}
