// Token issuance
// Decision: Access and refresh tokens share one claim shape, told apart by the `type` claim
// Decision: Refresh tokens are signed with the refresh secret so they cannot verify as access tokens
// when the secrets differ

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::claims::{ClaimType, TokenClaims};
use crate::codec::{TokenCodec, TokenError};
use crate::config::JwtConfig;

/// Token pair returned after successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Mints signed access / refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    config: JwtConfig,
    access: TokenCodec,
    refresh: TokenCodec,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        let access = TokenCodec::new(&config.secret, config.leeway, true);
        let refresh = TokenCodec::new(config.refresh_secret(), config.leeway, true);
        Self {
            config,
            access,
            refresh,
        }
    }

    pub fn generate_access_token(
        &self,
        subject: &str,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<String, TokenError> {
        let claims = self.claims(
            ClaimType::Access,
            subject,
            email,
            username,
            self.access_token_lifetime_secs(),
        );
        self.access.sign(&claims)
    }

    pub fn generate_refresh_token(
        &self,
        subject: &str,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<String, TokenError> {
        let claims = self.claims(
            ClaimType::Refresh,
            subject,
            email,
            username,
            self.refresh_token_lifetime_secs(),
        );
        self.refresh.sign(&claims)
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(
        &self,
        subject: &str,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(subject, email, username)?,
            refresh_token: self.generate_refresh_token(subject, email, username)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_lifetime_secs(),
        })
    }

    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.config.access_token_lifetime.as_secs() as i64
    }

    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.config.refresh_token_lifetime.as_secs() as i64
    }

    fn claims(
        &self,
        claim_type: ClaimType,
        subject: &str,
        email: Option<&str>,
        username: Option<&str>,
        lifetime_secs: i64,
    ) -> TokenClaims {
        let now = Utc::now().timestamp();
        TokenClaims {
            sub: Some(subject.to_string()),
            email: email.map(str::to_string),
            username: username.map(str::to_string),
            token_type: Some(claim_type.as_str().to_string()),
            iat: Some(now),
            exp: Some(now + lifetime_secs),
        }
    }
}
