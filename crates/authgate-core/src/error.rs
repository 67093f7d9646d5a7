// Error taxonomy for the authentication gate
// Decision: Every rejection carries a machine-readable kind plus a human-readable message
// Decision: Ambiguous credentials are the only bad-request class, all other kinds are unauthorized

use serde::Serialize;
use thiserror::Error;

pub const AMBIGUOUS_CREDENTIALS_MESSAGE: &str = "Cannot use both Authorization and X-API-Key headers simultaneously. Use only one authentication method.";
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Authentication required. Provide either Authorization Bearer token or X-API-Key header.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid token";
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Authentication failed";

/// Kind of gate rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    /// Bearer token and API key presented on the same request
    AmbiguousCredentials,
    /// Neither a bearer token nor an API key was presented
    MissingCredentials,
    /// A credential was presented but did not verify
    InvalidCredentials,
    /// Catch-all for negative outcomes with no better classification
    AuthenticationFailed,
    /// Strategy-level error (e.g. the credential store failed)
    AuthError,
}

/// Response class a rejection maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionStatus {
    BadRequest,
    Unauthorized,
}

impl AuthErrorKind {
    pub fn status(&self) -> RejectionStatus {
        match self {
            AuthErrorKind::AmbiguousCredentials => RejectionStatus::BadRequest,
            _ => RejectionStatus::Unauthorized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::AmbiguousCredentials => "ambiguous_credentials",
            AuthErrorKind::MissingCredentials => "missing_credentials",
            AuthErrorKind::InvalidCredentials => "invalid_credentials",
            AuthErrorKind::AuthenticationFailed => "authentication_failed",
            AuthErrorKind::AuthError => "auth_error",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal rejection produced by the gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GateRejection {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl GateRejection {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn ambiguous() -> Self {
        Self::new(
            AuthErrorKind::AmbiguousCredentials,
            AMBIGUOUS_CREDENTIALS_MESSAGE,
        )
    }

    pub fn missing() -> Self {
        Self::new(AuthErrorKind::MissingCredentials, MISSING_CREDENTIALS_MESSAGE)
    }

    /// Credential failed verification. An empty reason falls back to a generic message.
    pub fn invalid(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if reason.is_empty() {
            Self::new(
                AuthErrorKind::InvalidCredentials,
                INVALID_CREDENTIALS_MESSAGE,
            )
        } else {
            Self::new(AuthErrorKind::InvalidCredentials, reason)
        }
    }

    pub fn failed() -> Self {
        Self::new(
            AuthErrorKind::AuthenticationFailed,
            AUTHENTICATION_FAILED_MESSAGE,
        )
    }

    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::AuthError, message)
    }

    pub fn status(&self) -> RejectionStatus {
        self.kind.status()
    }
}
