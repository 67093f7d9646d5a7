// Refresh-token strategy, used only by the refresh endpoint
// Decision: The `refreshToken` body field takes precedence over the bearer header

use crate::claims::ClaimType;
use crate::codec::TokenCodec;
use crate::config::JwtConfig;
use crate::identity::AuthScheme;
use crate::presentation::CredentialPresentation;

use super::{accept_claims, Verdict};

pub const INVALID_REFRESH_TYPE: &str = "Invalid token type";

pub struct RefreshTokenStrategy {
    codec: TokenCodec,
}

impl RefreshTokenStrategy {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            codec: TokenCodec::new(config.refresh_secret(), config.leeway, true),
        }
    }

    pub fn extract<'a>(&self, presentation: &'a CredentialPresentation) -> Option<&'a str> {
        presentation
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(presentation.bearer.as_deref())
    }

    pub fn resolve(&self, presentation: &CredentialPresentation) -> Verdict {
        let Some(token) = self.extract(presentation) else {
            return Verdict::NoCredential;
        };

        match self.codec.verify(token) {
            Ok(claims) => accept_claims(
                claims,
                ClaimType::Refresh,
                INVALID_REFRESH_TYPE,
                AuthScheme::Refresh,
            ),
            Err(err) => Verdict::Rejected(err.to_string()),
        }
    }
}
