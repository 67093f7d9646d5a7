// Credential presentation: raw credential material pulled from one request

use http::header::AUTHORIZATION;
use http::{HeaderMap, Uri};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY_QUERY_PARAM: &str = "apiKey";
pub const REFRESH_TOKEN_FIELD: &str = "refreshToken";
const BEARER_PREFIX: &str = "Bearer ";

/// Credentials presented by a caller. Built per request, dropped once the gate resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPresentation {
    /// Token from `Authorization: Bearer <token>` (may be empty)
    pub bearer: Option<String>,
    /// Key from the `X-API-Key` header, else the `apiKey` query parameter
    pub api_key: Option<String>,
    /// `refreshToken` body field, only filled by the refresh endpoint
    pub refresh_token: Option<String>,
}

impl CredentialPresentation {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        Self {
            bearer: extract_bearer(headers),
            api_key: extract_api_key(headers, uri),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, token: Option<String>) -> Self {
        self.refresh_token = token.filter(|t| !t.is_empty());
        self
    }

    /// A well-formed `Authorization: Bearer ` header was present
    pub fn has_bearer(&self) -> bool {
        self.bearer.is_some()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Token part of an `Authorization: Bearer ` header.
///
/// The scheme match is case-sensitive. Other schemes (Basic, ApiKey) do not count.
/// Presence is decided on the raw bytes: a token with non-ASCII bytes still counts
/// and fails verification later.
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get(AUTHORIZATION)?
        .as_bytes()
        .strip_prefix(BEARER_PREFIX.as_bytes())?;
    Some(String::from_utf8_lossy(token).trim().to_string())
}

/// API key from the `X-API-Key` header, falling back to the `apiKey` query parameter.
/// Empty values count as absent.
pub fn extract_api_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(API_KEY_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|v| !v.is_empty());

    from_header.or_else(|| {
        let query = uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, value)| name == API_KEY_QUERY_PARAM && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}
