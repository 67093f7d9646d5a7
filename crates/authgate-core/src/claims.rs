// Signed-token claim set
// Decision: Claims are decoded leniently (every field optional) so a missing subject
// is reported as an invalid payload instead of a decode failure

use serde::{Deserialize, Serialize};

/// Claim-type tag distinguishing access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Access,
    Refresh,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Access => "access",
            ClaimType::Refresh => "refresh",
        }
    }

    /// Parse the wire tag. Matching is exact: `"Access"` is not an access token.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "access" => Some(ClaimType::Access),
            "refresh" => Some(ClaimType::Refresh),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded token payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (identity id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Raw claim-type tag
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn claim_type(&self) -> Option<ClaimType> {
        self.token_type.as_deref().and_then(ClaimType::parse)
    }

    /// Subject, treating an empty string as absent
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|sub| !sub.is_empty())
    }
}
