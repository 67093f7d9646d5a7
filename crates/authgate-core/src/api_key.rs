// API key records and opaque key generation
// Decision: Opaque keys are prefixed with "agk_" for identification
// Decision: Opaque keys are only ever stored as SHA-256 hashes

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// API key prefix for identification
pub const API_KEY_PREFIX: &str = "agk_";
const API_KEY_LENGTH: usize = 32; // 32 random bytes = 64 hex chars

/// Provisioned API key, owned by the credential store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyRecord {
    pub id: Uuid,
    /// Identity the key authenticates as
    pub user_id: String,
    pub name: String,
    pub owner_email: Option<String>,
    pub owner_username: Option<String>,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            name: name.into(),
            owner_email: None,
            owner_username: None,
            scopes: vec!["*".to_string()],
            expires_at: None,
            last_used_at: None,
            created_at: Utc::now(),
        }
    }

    /// Check if the API key is expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            expires_at < Utc::now()
        } else {
            false
        }
    }
}

/// Generated API key (full key shown only at creation)
#[derive(Debug)]
pub struct GeneratedApiKey {
    /// Full API key (agk_<random>)
    pub key: String,
    /// SHA-256 hash for storage
    pub key_hash: String,
    /// Prefix for display (e.g., "agk_abc1...")
    pub key_prefix: String,
}

/// Generate a new opaque API key
pub fn generate_api_key() -> GeneratedApiKey {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..API_KEY_LENGTH).map(|_| rng.gen()).collect();
    let random_hex = hex::encode(&random_bytes);

    let key = format!("{}{}", API_KEY_PREFIX, random_hex);
    let key_hash = hash_api_key(&key);
    let key_prefix = format!("{}{}...", API_KEY_PREFIX, &random_hex[..8]);

    GeneratedApiKey {
        key,
        key_hash,
        key_prefix,
    }
}

/// Hash an API key for storage/lookup
pub fn hash_api_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}
