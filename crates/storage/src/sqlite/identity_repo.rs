use async_trait::async_trait;
use chrono::Utc;
use funnel_core::model::UserIdentity;
use sqlx::Row;

use crate::repository::{IDENTITY_KEY, IdentityRecord, IdentityStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl IdentityStore for SqliteRepository {
    async fn load(&self) -> Result<Option<UserIdentity>, StorageError> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?1")
            .bind(IDENTITY_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        IdentityRecord::from_json(&raw)?.into_identity()
    }

    async fn save(&self, identity: &UserIdentity) -> Result<(), StorageError> {
        let raw = IdentityRecord::from_identity(identity).to_json()?;
        sqlx::query(
            r"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(IDENTITY_KEY)
        .bind(raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
