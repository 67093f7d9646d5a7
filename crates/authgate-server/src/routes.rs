// HTTP routes
// Decision: Use /v1/* for API routes, /health stays unprefixed
// Decision: The refresh endpoint is public at the gate and runs the refresh strategy itself

use std::net::SocketAddr;

use authgate_core::presentation::extract_bearer;
use authgate_core::{
    log_rejection, settle, ApiKeyRecord, AuthErrorKind, CredentialPresentation, GateRejection,
    GateRequest, ResolvedIdentity, RoutePolicy, RoutePolicyError, TokenPair, Verify,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::{HeaderMap, Method, Uri},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::extract::{AuthUser, CurrentApiKey};
use crate::state::AppState;

pub const REFRESH_PATH: &str = "/v1/auth/refresh";
pub const REFRESH_TOKEN_REQUIRED: &str = "Refresh token required";

/// Routes exempt from the gate. `api_prefix` must match the one the API routes are nested under.
pub fn route_policy(api_prefix: &str) -> Result<RoutePolicy, RoutePolicyError> {
    RoutePolicy::builder()
        .public_route(Method::GET, "/health")
        .public_route(Method::POST, format!("{api_prefix}{REFRESH_PATH}"))
        .build()
}

/// API routes, to be nested under the API prefix
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(REFRESH_PATH, post(refresh))
        .route("/v1/me", get(me))
        .route("/v1/ws", get(ws))
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Refresh token request
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

async fn refresh(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Option<Json<RefreshRequest>>,
) -> Result<Json<TokenPair>, AuthError> {
    let request = GateRequest::new(&method, &uri, &headers)
        .with_client_addr(connect_info.map(|ConnectInfo(addr)| addr));
    let body_token = body.and_then(|Json(payload)| payload.refresh_token);
    let presentation = CredentialPresentation {
        bearer: extract_bearer(&headers),
        ..Default::default()
    }
    .with_refresh_token(body_token);

    if presentation.refresh_token.is_none() && !presentation.has_bearer() {
        let rejection = GateRejection::new(
            AuthErrorKind::MissingCredentials,
            REFRESH_TOKEN_REQUIRED,
        );
        log_rejection(&request, &rejection, Some("jwt-refresh"));
        return Err(rejection.into());
    }

    let identity = settle(state.refresh.resolve(&presentation).await).inspect_err(|rejection| {
        log_rejection(&request, rejection, Some("jwt-refresh"));
    })?;

    let pair = state
        .issuer
        .generate_token_pair(
            &identity.id,
            identity.email.as_deref(),
            identity.username.as_deref(),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "failed to issue token pair");
            AuthError::internal("Failed to issue tokens")
        })?;

    tracing::info!(user_id = %identity.id, "tokens refreshed");
    Ok(Json(pair))
}

/// Current identity response
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub auth_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKeySummary>,
}

/// API key list item (without the key itself)
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeySummary {
    pub id: String,
    pub name: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<String>,
    pub last_used_at: Option<String>,
    pub created_at: String,
}

impl From<&ApiKeyRecord> for ApiKeySummary {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            scopes: record.scopes.clone(),
            expires_at: record.expires_at.map(|t| t.to_rfc3339()),
            last_used_at: record.last_used_at.map(|t| t.to_rfc3339()),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

impl MeResponse {
    fn new(identity: &ResolvedIdentity, api_key: Option<ApiKeySummary>) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            username: identity.username.clone(),
            auth_method: identity.scheme.name().to_string(),
            api_key,
        }
    }
}

async fn me(
    AuthUser(identity): AuthUser,
    CurrentApiKey(api_key): CurrentApiKey,
) -> Json<MeResponse> {
    let summary = api_key.as_deref().map(ApiKeySummary::from);
    Json(MeResponse::new(&identity, summary))
}

async fn ws(AuthUser(identity): AuthUser, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| ws_session(socket, identity))
}

/// Greets the caller with their identity, then echoes text frames until the client closes
async fn ws_session(mut socket: WebSocket, identity: ResolvedIdentity) {
    tracing::debug!(user_id = %identity.id, "websocket connected");

    let greeting = serde_json::json!({
        "type": "connected",
        "user": MeResponse::new(&identity, None),
    });
    if socket
        .send(Message::Text(greeting.to_string()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(message) = socket.recv().await {
        match message {
            Ok(Message::Text(text)) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Ping/pong handled by the protocol layer, binary frames ignored
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "websocket receive failed");
                break;
            }
        }
    }

    tracing::debug!(user_id = %identity.id, "websocket disconnected");
}
