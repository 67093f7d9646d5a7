// Server configuration loaded from environment variables.
// Decision: Dev API keys come from AUTH_DEV_API_KEYS as `user_id=key` pairs, seeded into the
// in-memory store at startup. Without any, one key is generated.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

const DEFAULT_ADDR: &str = "0.0.0.0:9000";

/// Opaque API key provisioned for local development
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevApiKey {
    pub user_id: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address
    pub addr: SocketAddr,
    /// Prefix the API routes are nested under (e.g. "/api"), empty for none
    pub api_prefix: String,
    pub dev_api_keys: Vec<DevApiKey>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `AUTH_GATE_ADDR`: Bind address (default: "0.0.0.0:9000")
    /// - `API_PREFIX`: Route prefix for API routes
    /// - `AUTH_DEV_API_KEYS`: Comma-separated `user_id=key` pairs
    pub fn from_env() -> Result<Self> {
        let addr = std::env::var("AUTH_GATE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .with_context(|| format!("Invalid AUTH_GATE_ADDR: {addr}"))?;

        let api_prefix = normalize_prefix(&std::env::var("API_PREFIX").unwrap_or_default());
        let dev_api_keys = match std::env::var("AUTH_DEV_API_KEYS") {
            Ok(raw) => parse_dev_api_keys(&raw).context("Invalid AUTH_DEV_API_KEYS")?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            addr,
            api_prefix,
            dev_api_keys,
        })
    }
}

/// "api/" -> "/api", "/" -> ""
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn parse_dev_api_keys(raw: &str) -> Result<Vec<DevApiKey>> {
    let mut keys = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((user_id, key)) = entry.split_once('=') else {
            bail!("expected user_id=key, got '{entry}'");
        };
        let (user_id, key) = (user_id.trim(), key.trim());
        if user_id.is_empty() || key.is_empty() {
            bail!("empty user id or key in '{entry}'");
        }
        keys.push(DevApiKey {
            user_id: user_id.to_string(),
            key: key.to_string(),
        });
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dev_api_keys() {
        let keys = parse_dev_api_keys("42=dev-key, 7=other=with=equals,").unwrap();
        assert_eq!(
            keys,
            vec![
                DevApiKey {
                    user_id: "42".to_string(),
                    key: "dev-key".to_string()
                },
                DevApiKey {
                    user_id: "7".to_string(),
                    key: "other=with=equals".to_string()
                },
            ]
        );
        assert!(parse_dev_api_keys("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_dev_api_keys_rejects_garbage() {
        assert!(parse_dev_api_keys("no-separator").is_err());
        assert!(parse_dev_api_keys("=key").is_err());
        assert!(parse_dev_api_keys("42=").is_err());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/api"), "/api");
    }
}
