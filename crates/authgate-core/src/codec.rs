// Token codec
// Decision: HS256 with a shared secret per token family (access, refresh, API key)
// Decision: Unverified peeks never fail loudly, they run on attacker-controlled input
// before any authentication happened

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{ClaimType, TokenClaims};

/// Token verification / signing failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("jwt expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("jwt not active")]
    NotYetValid,

    #[error("jwt malformed")]
    Malformed,

    #[error("invalid algorithm")]
    InvalidAlgorithm,

    #[error("jwt missing required claim: {0}")]
    MissingClaim(String),

    #[error("failed to encode token: {0}")]
    Encoding(String),

    #[error("invalid token: {0}")]
    Other(String),
}

impl TokenError {
    /// The token is not a well-formed token signed with our key.
    ///
    /// Expiry and not-before failures are not structural: the token is ours, just not valid now.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::InvalidAlgorithm
        )
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                TokenError::InvalidAlgorithm
            }
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::Malformed,
            ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim(claim.clone()),
            other => TokenError::Other(format!("{:?}", other)),
        }
    }
}

/// Signs and verifies tokens for one secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// `require_expiry` rejects tokens without an `exp` claim.
    pub fn new(secret: &str, leeway: u64, require_expiry: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = leeway;
        validation.required_spec_claims.clear();
        if require_expiry {
            validation.set_required_spec_claims(&["exp"]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, then decode the claim set
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

/// Read the claim-type tag without verifying anything.
///
/// Routing aid only: the result carries no trust.
pub fn peek_claim_type(token: &str) -> Option<ClaimType> {
    let payload = decode_payload(token)?;
    let value: serde_json::Value = serde_json::from_slice(&payload).ok()?;
    value.get("type")?.as_str().and_then(ClaimType::parse)
}

/// Decode the full claim set without a signature check
pub fn decode_unsafe(token: &str) -> Option<TokenClaims> {
    let payload = decode_payload(token)?;
    serde_json::from_slice(&payload).ok()
}

fn decode_payload(token: &str) -> Option<Vec<u8>> {
    let segment = token.split('.').nth(1)?;
    let trimmed = segment.trim_end_matches('=');
    if trimmed.is_empty() {
        return None;
    }

    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret-key-for-testing";

    fn claims(token_type: &str, exp_offset: i64) -> TokenClaims {
        let now = Utc::now().timestamp();
        TokenClaims {
            sub: Some("42".to_string()),
            email: Some("user@example.com".to_string()),
            username: Some("user".to_string()),
            token_type: Some(token_type.to_string()),
            iat: Some(now),
            exp: Some(now + exp_offset),
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let codec = TokenCodec::new(SECRET, 0, true);
        let original = claims("access", 900);
        let token = codec.sign(&original).unwrap();

        let decoded = codec.verify(&token).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_expired_token() {
        let codec = TokenCodec::new(SECRET, 0, true);
        let token = codec.sign(&claims("access", -120)).unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert_eq!(err, TokenError::Expired);
        assert!(err.to_string().contains("expired"));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_wrong_secret() {
        let signer = TokenCodec::new("another-secret", 0, true);
        let codec = TokenCodec::new(SECRET, 0, true);
        let token = signer.sign(&claims("access", 900)).unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
        assert!(err.is_structural());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = TokenCodec::new(SECRET, 0, true);
        let err = codec.verify("legacy-opaque-key").unwrap_err();
        assert!(err.is_structural(), "got {err:?}");
    }

    #[test]
    fn test_missing_expiry() {
        let strict = TokenCodec::new(SECRET, 0, true);
        let lenient = TokenCodec::new(SECRET, 0, false);
        let token = lenient
            .sign(&TokenClaims {
                sub: Some("key".to_string()),
                token_type: Some("access".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            strict.verify(&token).unwrap_err(),
            TokenError::MissingClaim("exp".to_string())
        );
        assert!(lenient.verify(&token).is_ok());
    }

    #[test]
    fn test_peek_claim_type() {
        let codec = TokenCodec::new(SECRET, 0, true);
        let access = codec.sign(&claims("access", 900)).unwrap();
        let refresh = codec.sign(&claims("refresh", 900)).unwrap();
        // Expired tokens still peek: the peek checks nothing
        let expired = codec.sign(&claims("access", -3600)).unwrap();

        assert_eq!(peek_claim_type(&access), Some(ClaimType::Access));
        assert_eq!(peek_claim_type(&refresh), Some(ClaimType::Refresh));
        assert_eq!(peek_claim_type(&expired), Some(ClaimType::Access));
    }

    #[test]
    fn test_peek_never_panics_on_garbage() {
        let inputs = [
            "",
            ".",
            "..",
            "abc",
            "a.b.c",
            "a.!!!.c",
            "a.=.c",
            "a.bm90IGpzb24.c",           // "not json"
            "a.WyJhcnJheSJd.c",          // ["array"]
            "a.eyJ0eXBlIjo0Mn0.c",       // {"type":42}
            "a.eyJ0eXBlIjoiYWRtaW4ifQ.c", // {"type":"admin"}
            "\u{0}\u{1}.\u{2}",
        ];
        for input in inputs {
            assert_eq!(peek_claim_type(input), None, "input: {input:?}");
        }
    }

    #[test]
    fn test_peek_accepts_padded_standard_base64() {
        // {"type":"access"} in standard base64 with padding
        let token = "header.eyJ0eXBlIjoiYWNjZXNzIn0=.sig";
        assert_eq!(peek_claim_type(token), Some(ClaimType::Access));
    }

    #[test]
    fn test_decode_unsafe() {
        let codec = TokenCodec::new(SECRET, 0, true);
        let original = claims("refresh", 900);
        let token = codec.sign(&original).unwrap();

        assert_eq!(decode_unsafe(&token), Some(original));
        assert_eq!(decode_unsafe("not-a-token"), None);
    }
}
