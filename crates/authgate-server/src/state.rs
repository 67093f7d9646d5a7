// Shared application state
// Decision: Everything in here is built once at startup and only read afterwards

use std::sync::Arc;

use authgate_core::{
    CombinedGate, CredentialLookup, JwtConfig, RefreshTokenStrategy, RoutePolicy, TokenIssuer,
    Verifier,
};

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<CombinedGate>,
    pub refresh: Arc<Verifier>,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(config: &JwtConfig, lookup: Arc<dyn CredentialLookup>, routes: RoutePolicy) -> Self {
        Self {
            gate: Arc::new(CombinedGate::new(config, lookup, routes)),
            refresh: Arc::new(Verifier::from(RefreshTokenStrategy::new(config))),
            issuer: Arc::new(TokenIssuer::new(config.clone())),
        }
    }
}
