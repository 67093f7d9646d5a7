// Identity extractors for handlers behind the gate

use std::convert::Infallible;
use std::sync::Arc;

use authgate_core::{
    current_api_key, current_identity, ApiKeyRecord, GateRejection, ResolvedIdentity,
};
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AuthError;

/// Authenticated caller. Rejects with 401 when the gate attached no identity.
#[derive(Debug, Clone)]
pub struct AuthUser(pub ResolvedIdentity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_identity(&parts.extensions)
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::from(GateRejection::missing()))
    }
}

/// API-key record of the caller, `None` unless authenticated by API key
#[derive(Debug, Clone)]
pub struct CurrentApiKey(pub Option<Arc<ApiKeyRecord>>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentApiKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentApiKey(current_api_key(&parts.extensions)))
    }
}
