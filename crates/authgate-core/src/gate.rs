// Combined authentication gate
// Decision: Exactly one credential channel per request, both channels is a client error
// Decision: Public routes short-circuit before any credential is parsed
// Decision: Strategy verdicts are normalized into the AuthErrorKind taxonomy here and nowhere else
//
// The gate holds only immutable state (verifiers and the frozen route policy) and is shared
// across requests behind an Arc. A dropped request future abandons the evaluation.

use std::net::SocketAddr;
use std::sync::Arc;

use http::{HeaderMap, Method, Uri};

use crate::config::JwtConfig;
use crate::error::GateRejection;
use crate::identity::ResolvedIdentity;
use crate::lookup::CredentialLookup;
use crate::presentation::CredentialPresentation;
use crate::route_policy::RoutePolicy;
use crate::strategy::{AccessTokenStrategy, ApiKeyStrategy, Verdict, Verifier, Verify};

/// The parts of an incoming request the gate looks at
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
    pub client_addr: Option<SocketAddr>,
}

impl<'a> GateRequest<'a> {
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            client_addr: None,
        }
    }

    pub fn with_client_addr(mut self, client_addr: Option<SocketAddr>) -> Self {
        self.client_addr = client_addr;
        self
    }
}

/// Result of evaluating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Proceed with this identity attached to the request context
    Authenticated(ResolvedIdentity),
    /// Stop processing and respond with the rejection
    Rejected(GateRejection),
    /// Public route, proceed with no identity
    PassedThrough,
}

pub struct CombinedGate {
    bearer: Arc<dyn Verify>,
    api_key: Arc<dyn Verify>,
    routes: Arc<RoutePolicy>,
}

impl CombinedGate {
    pub fn new(
        config: &JwtConfig,
        lookup: Arc<dyn CredentialLookup>,
        routes: RoutePolicy,
    ) -> Self {
        Self::with_verifiers(
            Arc::new(Verifier::from(AccessTokenStrategy::new(config))),
            Arc::new(Verifier::from(ApiKeyStrategy::new(config, lookup))),
            Arc::new(routes),
        )
    }

    pub fn with_verifiers(
        bearer: Arc<dyn Verify>,
        api_key: Arc<dyn Verify>,
        routes: Arc<RoutePolicy>,
    ) -> Self {
        Self {
            bearer,
            api_key,
            routes,
        }
    }

    pub async fn evaluate(&self, request: GateRequest<'_>) -> GateOutcome {
        let path = request.uri.path();

        if self.routes.is_public(request.method, path) {
            tracing::trace!(method = %request.method, path, "public route, skipping authentication");
            return GateOutcome::PassedThrough;
        }

        let presentation = CredentialPresentation::from_parts(request.headers, request.uri);
        let (verifier, scheme) = match (presentation.has_bearer(), presentation.has_api_key()) {
            (true, true) => return reject(&request, GateRejection::ambiguous(), None),
            (false, false) => return reject(&request, GateRejection::missing(), None),
            (true, false) => (&self.bearer, "jwt"),
            (false, true) => (&self.api_key, "api_key"),
        };

        match settle(verifier.resolve(&presentation).await) {
            Ok(identity) => {
                tracing::debug!(
                    method = %request.method,
                    path,
                    client = ?request.client_addr,
                    user_id = %identity.id,
                    scheme = identity.scheme.name(),
                    "request authenticated"
                );
                GateOutcome::Authenticated(identity)
            }
            Err(rejection) => reject(&request, rejection, Some(scheme)),
        }
    }
}

/// Normalize a strategy verdict into either an identity or a gate rejection
pub fn settle(verdict: Verdict) -> Result<ResolvedIdentity, GateRejection> {
    match verdict {
        Verdict::Accepted(identity) => Ok(identity),
        Verdict::Rejected(reason) => Err(GateRejection::invalid(reason)),
        Verdict::Errored(message) => Err(GateRejection::auth_error(message)),
        Verdict::NoCredential => Err(GateRejection::failed()),
    }
}

fn reject(
    request: &GateRequest<'_>,
    rejection: GateRejection,
    scheme: Option<&'static str>,
) -> GateOutcome {
    log_rejection(request, &rejection, scheme);
    GateOutcome::Rejected(rejection)
}

/// Log a rejection with its request context. Also used by endpoints that run a strategy themselves.
pub fn log_rejection(
    request: &GateRequest<'_>,
    rejection: &GateRejection,
    scheme: Option<&'static str>,
) {
    tracing::warn!(
        method = %request.method,
        path = request.uri.path(),
        client = ?request.client_addr,
        scheme,
        kind = %rejection.kind,
        reason = %rejection.message,
        "authentication rejected"
    );
}
