// Gate middleware
// Decision: Runs once per request ahead of every handler, including unknown routes
// Decision: The resolved identity travels to handlers as a request extension

use std::net::SocketAddr;

use authgate_core::{GateOutcome, GateRequest};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AuthError;
use crate::state::AppState;

pub async fn auth_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // Only the head is borrowed across the evaluation, the body is not Sync
    let (mut parts, body) = req.into_parts();
    let client_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let gate_request = GateRequest::new(&parts.method, &parts.uri, &parts.headers)
        .with_client_addr(client_addr);
    let outcome = state.gate.evaluate(gate_request).await;

    match outcome {
        GateOutcome::Authenticated(identity) => {
            parts.extensions.insert(identity);
            next.run(Request::from_parts(parts, body)).await
        }
        GateOutcome::PassedThrough => next.run(Request::from_parts(parts, body)).await,
        GateOutcome::Rejected(rejection) => AuthError::from(rejection).into_response(),
    }
}
