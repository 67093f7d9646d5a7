// Authentication Gate
//
// This crate decides, once per request, whether a caller may proceed and as whom.
// It is framework-agnostic: requests are seen through the `http` crate types and
// the axum binding lives in authgate-server.
//
// Key design decisions:
// - A caller presents exactly one credential: a bearer access token or an API key
// - Strategies (access token, refresh token, API key) form a closed set behind the Verify trait
// - Strategy verdicts are normalized into one rejection taxonomy (AuthErrorKind) by the gate
// - API-key records are resolved through the CredentialLookup trait, never owned here
// - Public routes are declared in a frozen RoutePolicy and bypass credential parsing entirely

// Tokens
pub mod claims;
pub mod codec;
pub mod issuer;

// Credentials and identities
pub mod api_key;
pub mod identity;
pub mod lookup;
pub mod presentation;

// Gate
pub mod accessor;
pub mod gate;
pub mod route_policy;
pub mod strategy;

pub mod config;
pub mod error;
pub mod telemetry;

// Re-exports for convenience
pub use accessor::{current_api_key, current_identity};
pub use api_key::{generate_api_key, hash_api_key, ApiKeyRecord, GeneratedApiKey};
pub use claims::{ClaimType, TokenClaims};
pub use codec::{TokenCodec, TokenError};
pub use config::JwtConfig;
pub use error::{AuthErrorKind, GateRejection, RejectionStatus};
pub use gate::{log_rejection, settle, CombinedGate, GateOutcome, GateRequest};
pub use identity::{AuthScheme, ResolvedIdentity};
pub use issuer::{TokenIssuer, TokenPair};
pub use lookup::{CredentialLookup, InMemoryCredentialStore, LookupError};
pub use presentation::CredentialPresentation;
pub use route_policy::{RouteAccess, RoutePolicy, RoutePolicyBuilder, RoutePolicyError};
pub use strategy::{
    AccessTokenStrategy, ApiKeyStrategy, RefreshTokenStrategy, Verdict, Verifier, Verify,
};
