// API-key strategy
// Decision: Token-shaped keys are tried first and resolved through the store by subject,
// so revoking the record revokes the key without reissuing anything
// Decision: Only structural/signature failures fall back to the legacy opaque lookup;
// an expired token-shaped key is rejected outright
// Decision: Exactly one store lookup per resolution attempt

use std::sync::Arc;

use crate::api_key::ApiKeyRecord;
use crate::claims::ClaimType;
use crate::codec::TokenCodec;
use crate::config::JwtConfig;
use crate::identity::ResolvedIdentity;
use crate::lookup::{CredentialLookup, LookupError};
use crate::presentation::CredentialPresentation;

use super::{Verdict, INVALID_TOKEN_PAYLOAD};

pub const INVALID_API_KEY: &str = "Invalid API key";
pub const API_KEY_NOT_FOUND: &str = "API key revoked or not found";
pub const API_KEY_EXPIRED: &str = "API key expired";
pub const INVALID_API_KEY_TYPE: &str = "Invalid token type for API key";

pub struct ApiKeyStrategy {
    codec: TokenCodec,
    lookup: Arc<dyn CredentialLookup>,
}

impl ApiKeyStrategy {
    pub fn new(config: &JwtConfig, lookup: Arc<dyn CredentialLookup>) -> Self {
        Self {
            // API keys are long-lived, `exp` is optional
            codec: TokenCodec::new(config.api_key_secret(), config.leeway, false),
            lookup,
        }
    }

    pub async fn resolve(&self, presentation: &CredentialPresentation) -> Verdict {
        let Some(key) = presentation.api_key.as_deref() else {
            return Verdict::NoCredential;
        };

        match self.codec.verify(key) {
            Ok(claims) => {
                // Token-shaped keys carry no type or the access type, never refresh
                if claims.token_type.is_some() && claims.claim_type() != Some(ClaimType::Access)
                {
                    return Verdict::Rejected(INVALID_API_KEY_TYPE.to_string());
                }
                let Some(subject) = claims.subject() else {
                    return Verdict::Rejected(INVALID_TOKEN_PAYLOAD.to_string());
                };
                let found = self.lookup.lookup_by_token_subject(subject).await;
                settle_lookup(found, API_KEY_NOT_FOUND)
            }
            Err(err) if err.is_structural() => {
                tracing::debug!(error = %err, "API key is not a token, trying opaque lookup");
                let found = self.lookup.lookup_by_opaque_key(key).await;
                settle_lookup(found, INVALID_API_KEY)
            }
            Err(err) => Verdict::Rejected(err.to_string()),
        }
    }
}

fn settle_lookup(
    found: Result<Option<ApiKeyRecord>, LookupError>,
    not_found: &str,
) -> Verdict {
    match found {
        Ok(Some(record)) if record.is_expired() => Verdict::Rejected(API_KEY_EXPIRED.to_string()),
        Ok(Some(record)) => Verdict::Accepted(ResolvedIdentity::from_api_key(record)),
        Ok(None) => Verdict::Rejected(not_found.to_string()),
        Err(err) => {
            tracing::error!(error = %err, "API key lookup failed");
            Verdict::Errored(err.to_string())
        }
    }
}
