// Access-token strategy: `Authorization: Bearer <access token>`

use crate::claims::ClaimType;
use crate::codec::{peek_claim_type, TokenCodec};
use crate::config::JwtConfig;
use crate::identity::AuthScheme;
use crate::presentation::CredentialPresentation;

use super::{accept_claims, Verdict, NO_AUTH_TOKEN};

pub const INVALID_ACCESS_TYPE: &str = "Invalid token type. Expected access token.";

pub struct AccessTokenStrategy {
    codec: TokenCodec,
}

impl AccessTokenStrategy {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            codec: TokenCodec::new(&config.secret, config.leeway, true),
        }
    }

    /// Bearer token, forwarded only when its unverified payload claims to be an access token
    pub fn extract<'a>(&self, presentation: &'a CredentialPresentation) -> Option<&'a str> {
        let token = presentation.bearer.as_deref()?;
        (peek_claim_type(token) == Some(ClaimType::Access)).then_some(token)
    }

    pub fn resolve(&self, presentation: &CredentialPresentation) -> Verdict {
        let Some(bearer) = presentation.bearer.as_deref() else {
            return Verdict::NoCredential;
        };

        let Some(token) = self.extract(presentation) else {
            // Never reaches signature verification
            return match peek_claim_type(bearer) {
                Some(ClaimType::Refresh) => Verdict::Rejected(INVALID_ACCESS_TYPE.to_string()),
                _ => {
                    tracing::debug!("bearer token is not a decodable access token");
                    Verdict::Rejected(NO_AUTH_TOKEN.to_string())
                }
            };
        };

        self.verify(token)
    }

    /// Signature, expiry, claim-type and subject checks
    pub fn verify(&self, token: &str) -> Verdict {
        match self.codec.verify(token) {
            Ok(claims) => accept_claims(
                claims,
                ClaimType::Access,
                INVALID_ACCESS_TYPE,
                AuthScheme::Token,
            ),
            Err(err) => Verdict::Rejected(err.to_string()),
        }
    }
}
