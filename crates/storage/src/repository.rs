use async_trait::async_trait;
use funnel_core::model::{IdentityError, UserIdentity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Fixed key the identity record lives under.
pub const IDENTITY_KEY: &str = "quiz_user";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("stored identity is invalid: {0}")]
    InvalidIdentity(#[from] IdentityError),
}

/// Persisted shape of the identity: `{"name": .., "whatsapp": ..}`.
///
/// Kept separate from `UserIdentity` so a stored record is re-validated on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: String,
    pub whatsapp: String,
}

impl IdentityRecord {
    #[must_use]
    pub fn from_identity(identity: &UserIdentity) -> Self {
        Self {
            name: identity.name().to_owned(),
            whatsapp: identity.whatsapp().to_owned(),
        }
    }

    /// Decode a record from its stored JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` on malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// An empty record (both fields blank) means "no identity captured yet".
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidIdentity` if a non-empty record fails validation.
    pub fn into_identity(self) -> Result<Option<UserIdentity>, StorageError> {
        if self.name.trim().is_empty() && self.whatsapp.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(UserIdentity::from_persisted(self.name, self.whatsapp)?))
    }
}

/// Load/save contract for the lead identity.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Read the stored identity, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the record is unreadable.
    async fn load(&self) -> Result<Option<UserIdentity>, StorageError>;

    /// Overwrite the stored identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the identity cannot be stored.
    async fn save(&self, identity: &UserIdentity) -> Result<(), StorageError>;
}

/// Key/value store kept in process memory, for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Seed a raw value under `key`, bypassing validation.
    #[must_use]
    pub fn with_raw(self, key: &str, value: &str) -> Self {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(key.to_owned(), value.to_owned());
        }
        self
    }

    /// Raw stored value for `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }
}

#[async_trait]
impl IdentityStore for InMemoryRepository {
    async fn load(&self) -> Result<Option<UserIdentity>, StorageError> {
        let raw = {
            let guard = self
                .entries
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(IDENTITY_KEY).cloned()
        };
        match raw {
            Some(raw) => IdentityRecord::from_json(&raw)?.into_identity(),
            None => Ok(None),
        }
    }

    async fn save(&self, identity: &UserIdentity) -> Result<(), StorageError> {
        let raw = IdentityRecord::from_identity(identity).to_json()?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(IDENTITY_KEY.to_owned(), raw);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub identities: Arc<dyn IdentityStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let identities: Arc<dyn IdentityStore> = Arc::new(InMemoryRepository::new());
        Self { identities }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::model::IdentityDraft;

    fn identity() -> UserIdentity {
        IdentityDraft::new("Dr. João", "11999999999")
            .validate()
            .unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_identity() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_load_returns_identity() {
        let repo = InMemoryRepository::new();
        repo.save(&identity()).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(identity()));
        assert_eq!(
            repo.raw(IDENTITY_KEY).unwrap(),
            r#"{"name":"Dr. João","whatsapp":"11999999999"}"#
        );
    }

    #[tokio::test]
    async fn blank_record_reads_as_absent() {
        let repo = InMemoryRepository::new().with_raw(IDENTITY_KEY, r#"{"name":"","whatsapp":""}"#);
        assert_eq!(repo.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_record_is_reported() {
        let repo = InMemoryRepository::new().with_raw(IDENTITY_KEY, "{not json");
        assert!(matches!(
            repo.load().await,
            Err(StorageError::Serialization(_))
        ));

        let repo =
            InMemoryRepository::new().with_raw(IDENTITY_KEY, r#"{"name":"Ana","whatsapp":"123"}"#);
        assert!(matches!(
            repo.load().await,
            Err(StorageError::InvalidIdentity(_))
        ));
    }
}
