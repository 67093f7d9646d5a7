// Credential lookup collaborator
// Decision: The gate only ever reads through this trait; issuance and rotation live elsewhere
// Decision: The in-memory store records last-used timestamps as part of a successful lookup
//
// InMemoryCredentialStore backs development mode and tests. Data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::api_key::{generate_api_key, hash_api_key, ApiKeyRecord, GeneratedApiKey};

/// Credential store failure
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Resolves presented API keys to their current records
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    /// Look up the record named by the subject of a verified token-shaped key
    async fn lookup_by_token_subject(
        &self,
        subject: &str,
    ) -> Result<Option<ApiKeyRecord>, LookupError>;

    /// Match a legacy opaque key against stored records
    async fn lookup_by_opaque_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, LookupError>;
}

/// In-memory credential store
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<Uuid, ApiKeyRecord>>,
    // sha256(opaque key) -> record id
    opaque_index: RwLock<HashMap<String, Uuid>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record reachable by token subject (its id)
    pub fn insert(&self, record: ApiKeyRecord) -> Uuid {
        let id = record.id;
        self.records.write().insert(id, record);
        id
    }

    /// Store a record reachable by an opaque key
    pub fn insert_opaque(&self, key: &str, record: ApiKeyRecord) -> Uuid {
        let id = self.insert(record);
        self.opaque_index.write().insert(hash_api_key(key), id);
        id
    }

    /// Generate a fresh opaque key for `record` and store it
    pub fn issue_opaque(&self, record: ApiKeyRecord) -> (GeneratedApiKey, Uuid) {
        let generated = generate_api_key();
        let id = self.insert(record);
        self.opaque_index
            .write()
            .insert(generated.key_hash.clone(), id);
        (generated, id)
    }

    /// Remove a record. Returns false when it did not exist.
    pub fn revoke(&self, id: Uuid) -> bool {
        let removed = self.records.write().remove(&id).is_some();
        if removed {
            self.opaque_index.write().retain(|_, record_id| *record_id != id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn touch(&self, id: Uuid) -> Option<ApiKeyRecord> {
        let mut records = self.records.write();
        let record = records.get_mut(&id)?;
        record.last_used_at = Some(Utc::now());
        Some(record.clone())
    }
}

#[async_trait]
impl CredentialLookup for InMemoryCredentialStore {
    async fn lookup_by_token_subject(
        &self,
        subject: &str,
    ) -> Result<Option<ApiKeyRecord>, LookupError> {
        let Ok(id) = Uuid::parse_str(subject) else {
            return Ok(None);
        };
        Ok(self.touch(id))
    }

    async fn lookup_by_opaque_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, LookupError> {
        let id = self.opaque_index.read().get(&hash_api_key(key)).copied();
        Ok(id.and_then(|id| self.touch(id)))
    }
}
