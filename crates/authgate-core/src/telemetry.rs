// Tracing setup
//
// Console logging through tracing-subscriber, plain text by default and JSON lines
// when LOG_FORMAT=json. Filters follow RUST_LOG.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "authgate_server=debug,authgate_core=debug,tower_http=debug";

// ============================================================================
// Telemetry Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, logged once at startup
    pub service_name: String,
    /// Log filter (e.g., "info", "authgate_core=trace")
    pub log_filter: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "authgate".to_string(),
            log_filter: None,
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `SERVICE_NAME`: Service name (default: "authgate")
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    /// - `LOG_FORMAT`: "json" for structured output
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "authgate".to_string()),
            log_filter: std::env::var("RUST_LOG")
                .ok()
                .or_else(|| std::env::var("LOG_LEVEL").ok()),
            json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    fn filter(&self) -> EnvFilter {
        self.log_filter
            .as_deref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    let plain_layer = (!config.json).then(|| tracing_subscriber::fmt::layer().with_target(true));
    let json_layer = config
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_target(true));

    tracing_subscriber::registry()
        .with(config.filter())
        .with(plain_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(service = %config.service_name, json = config.json, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let config = TelemetryConfig::default();
        assert_eq!(
            config.filter().to_string(),
            EnvFilter::new(DEFAULT_FILTER).to_string()
        );
        assert!(!config.json);
    }

    #[test]
    fn test_explicit_filter() {
        let config = TelemetryConfig {
            log_filter: Some("warn".to_string()),
            ..Default::default()
        };
        assert_eq!(config.filter().to_string(), EnvFilter::new("warn").to_string());
    }
}
