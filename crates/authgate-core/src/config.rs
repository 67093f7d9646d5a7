// Token configuration loaded from environment variables.
// Decision: AUTH_ prefix for all gate config, legacy JWT_* names accepted as fallbacks
// Decision: Refresh and API-key secrets fall back to the access-token secret

use std::time::Duration;

const INSECURE_DEV_SECRET: &str = "insecure-dev-secret-change-me";

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing access tokens
    pub secret: String,
    /// Secret key for refresh tokens (defaults to `secret`)
    pub refresh_secret: Option<String>,
    /// Secret key for token-shaped API keys (defaults to `secret`)
    pub api_key_secret: Option<String>,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
    /// Allowed clock skew in seconds when checking expiry
    pub leeway: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            refresh_secret: None,
            api_key_secret: None,
            access_token_lifetime: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            leeway: 0,
        }
    }
}

impl JwtConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn refresh_secret(&self) -> &str {
        self.refresh_secret.as_deref().unwrap_or(&self.secret)
    }

    pub fn api_key_secret(&self) -> &str {
        self.api_key_secret.as_deref().unwrap_or(&self.secret)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| var(name).filter(|v| !v.is_empty());

        let secret = non_empty("AUTH_JWT_SECRET")
            .or_else(|| non_empty("JWT_SECRET"))
            .unwrap_or_else(|| {
                tracing::warn!("AUTH_JWT_SECRET not set, using insecure default");
                INSECURE_DEV_SECRET.to_string()
            });

        let refresh_secret =
            non_empty("AUTH_JWT_REFRESH_SECRET").or_else(|| non_empty("JWT_REFRESH_SECRET"));
        let api_key_secret = non_empty("AUTH_API_KEY_SECRET");

        let seconds = |name: &str| non_empty(name).and_then(|s| s.parse::<u64>().ok());
        let defaults = Self::default();

        Self {
            secret,
            refresh_secret,
            api_key_secret,
            access_token_lifetime: seconds("AUTH_JWT_ACCESS_TOKEN_LIFETIME")
                .map(Duration::from_secs)
                .unwrap_or(defaults.access_token_lifetime),
            refresh_token_lifetime: seconds("AUTH_JWT_REFRESH_TOKEN_LIFETIME")
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_token_lifetime),
            leeway: seconds("AUTH_JWT_LEEWAY").unwrap_or(defaults.leeway),
        }
    }
}
