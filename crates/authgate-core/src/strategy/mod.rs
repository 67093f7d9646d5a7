// Credential verification strategies
// Decision: A closed set of strategies (Verifier) instead of open-ended registration
// Decision: Strategies never fail the request themselves, they return a Verdict the gate normalizes

pub mod access;
pub mod api_key;
pub mod refresh;

use async_trait::async_trait;

use crate::claims::{ClaimType, TokenClaims};
use crate::identity::{AuthScheme, ResolvedIdentity};
use crate::presentation::CredentialPresentation;

pub use access::AccessTokenStrategy;
pub use api_key::ApiKeyStrategy;
pub use refresh::RefreshTokenStrategy;

pub const NO_AUTH_TOKEN: &str = "No auth token";
pub const INVALID_TOKEN_PAYLOAD: &str = "Invalid token payload";

/// Result of running one strategy against a presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Credential verified
    Accepted(ResolvedIdentity),
    /// Credential present but rejected, with a descriptive reason
    Rejected(String),
    /// The strategy itself failed (e.g. the credential store errored)
    Errored(String),
    /// Nothing for this strategy to verify
    NoCredential,
}

/// Single capability shared by every strategy
#[async_trait]
pub trait Verify: Send + Sync {
    async fn resolve(&self, presentation: &CredentialPresentation) -> Verdict;
}

/// The supported strategies
pub enum Verifier {
    Access(AccessTokenStrategy),
    Refresh(RefreshTokenStrategy),
    ApiKey(ApiKeyStrategy),
}

#[async_trait]
impl Verify for Verifier {
    async fn resolve(&self, presentation: &CredentialPresentation) -> Verdict {
        match self {
            Verifier::Access(strategy) => strategy.resolve(presentation),
            Verifier::Refresh(strategy) => strategy.resolve(presentation),
            Verifier::ApiKey(strategy) => strategy.resolve(presentation).await,
        }
    }
}

impl From<AccessTokenStrategy> for Verifier {
    fn from(strategy: AccessTokenStrategy) -> Self {
        Verifier::Access(strategy)
    }
}

impl From<RefreshTokenStrategy> for Verifier {
    fn from(strategy: RefreshTokenStrategy) -> Self {
        Verifier::Refresh(strategy)
    }
}

impl From<ApiKeyStrategy> for Verifier {
    fn from(strategy: ApiKeyStrategy) -> Self {
        Verifier::ApiKey(strategy)
    }
}

/// Business checks applied after signature and expiry passed
fn accept_claims(
    claims: TokenClaims,
    expected: ClaimType,
    type_mismatch: &str,
    scheme: AuthScheme,
) -> Verdict {
    if claims.claim_type() != Some(expected) {
        return Verdict::Rejected(type_mismatch.to_string());
    }

    let Some(subject) = claims.subject().map(str::to_string) else {
        return Verdict::Rejected(INVALID_TOKEN_PAYLOAD.to_string());
    };

    Verdict::Accepted(ResolvedIdentity::from_claims(&subject, claims, scheme))
}
