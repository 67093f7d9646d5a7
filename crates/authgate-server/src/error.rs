// HTTP rendering of gate rejections
// Decision: Body is `{ "error": <message>, "kind": <kind> }`, status follows the rejection class

use authgate_core::{AuthErrorKind, GateRejection, RejectionStatus};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<AuthErrorKind>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn internal(message: &str) -> Self {
        Self {
            error: message.to_string(),
            kind: None,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GateRejection> for AuthError {
    fn from(rejection: GateRejection) -> Self {
        let status = match rejection.status() {
            RejectionStatus::BadRequest => StatusCode::BAD_REQUEST,
            RejectionStatus::Unauthorized => StatusCode::UNAUTHORIZED,
        };
        Self {
            error: rejection.message,
            kind: Some(rejection.kind),
            status,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
