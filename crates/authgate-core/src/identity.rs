// Resolved identity attached to the request context
// Decision: The scheme discriminator carries the API-key record, so an API-key identity
// can never exist without its record

use std::sync::Arc;

use crate::api_key::ApiKeyRecord;
use crate::claims::TokenClaims;

/// How the identity was authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// Bearer access token
    Token,
    /// API key, with the record it resolved to
    ApiKey(Arc<ApiKeyRecord>),
    /// Refresh token (only produced on the refresh endpoint)
    Refresh,
}

impl AuthScheme {
    pub fn name(&self) -> &'static str {
        match self {
            AuthScheme::Token => "jwt",
            AuthScheme::ApiKey(_) => "api_key",
            AuthScheme::Refresh => "refresh",
        }
    }
}

/// Authenticated principal for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub scheme: AuthScheme,
}

impl ResolvedIdentity {
    pub(crate) fn from_claims(subject: &str, claims: TokenClaims, scheme: AuthScheme) -> Self {
        Self {
            id: subject.to_string(),
            email: claims.email,
            username: claims.username,
            scheme,
        }
    }

    pub fn from_api_key(record: ApiKeyRecord) -> Self {
        Self {
            id: record.user_id.clone(),
            email: record.owner_email.clone(),
            username: record.owner_username.clone(),
            scheme: AuthScheme::ApiKey(Arc::new(record)),
        }
    }

    /// The API-key record, when authenticated by API key
    pub fn api_key(&self) -> Option<&Arc<ApiKeyRecord>> {
        match &self.scheme {
            AuthScheme::ApiKey(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_api_key(&self) -> bool {
        matches!(self.scheme, AuthScheme::ApiKey(_))
    }
}
