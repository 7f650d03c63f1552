/// Singleton profile document at settings/profile
///
/// Reads never persist anything: an absent document reads as `None` and
/// callers fall back to `Profile::default()`. Writes merge into the stored
/// document, starting from the default when it doesn't exist yet.

use crate::store::{
    changes::{ChangeFeed, ChangeKind},
    types::{Profile, ProfileUpdate, PROFILE_KEY, SETTINGS_COLLECTION},
};
use anyhow::Result;
use sqlx::{sqlite::SqlitePool, Row};

#[derive(Debug, Clone)]
pub struct ProfileStore {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl ProfileStore {
    pub fn new(pool: SqlitePool, changes: ChangeFeed) -> Self {
        Self { pool, changes }
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    /// The stored profile, if one was ever written
    pub async fn get_profile(&self) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT data FROM documents WHERE collection = ? AND key = ?")
            .bind(SETTINGS_COLLECTION)
            .bind(PROFILE_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    /// The stored profile or the built-in default
    pub async fn profile_or_default(&self) -> Result<Profile> {
        Ok(self.get_profile().await?.unwrap_or_default())
    }

    /// Merge `update` into the profile document, creating it if needed
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        match self.merge_and_write(update).await {
            Ok(profile) => {
                self.changes.publish(SETTINGS_COLLECTION, PROFILE_KEY, ChangeKind::Updated);
                tracing::info!("👤 Profile updated");
                Ok(profile)
            }
            Err(e) => {
                tracing::error!("❌ Failed to update profile: {}", e);
                Err(e)
            }
        }
    }

    async fn merge_and_write(&self, update: ProfileUpdate) -> Result<Profile> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT data FROM documents WHERE collection = ? AND key = ?")
            .bind(SETTINGS_COLLECTION)
            .bind(PROFILE_KEY)
            .fetch_optional(&mut *tx)
            .await?;

        let mut profile = match existing {
            Some(row) => {
                let data: String = row.get("data");
                serde_json::from_str(&data)?
            }
            None => Profile::default(),
        };
        update.merge_into(&mut profile);

        let data = serde_json::to_string(&profile)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, data, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(collection, key) DO UPDATE SET
                data = excluded.data,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(SETTINGS_COLLECTION)
        .bind(PROFILE_KEY)
        .bind(&data)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::database::DatabaseManager;

    async fn store() -> ProfileStore {
        let db = DatabaseManager::in_memory().await.unwrap();
        ProfileStore::new(db.pool().clone(), ChangeFeed::new())
    }

    #[tokio::test]
    async fn test_default_before_first_write() {
        let store = store().await;
        assert!(store.get_profile().await.unwrap().is_none());
        assert_eq!(store.profile_or_default().await.unwrap(), Profile::default());

        // Reading must not persist the default
        assert!(store.get_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_write_merges_onto_default() {
        let store = store().await;
        store
            .update_profile(ProfileUpdate {
                name: Some("Ada".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let stored = store.get_profile().await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.email, "hello@example.com");
    }

    #[tokio::test]
    async fn test_later_writes_keep_earlier_fields() {
        let store = store().await;
        store
            .update_profile(ProfileUpdate { name: Some("Ada".to_string()), ..Default::default() })
            .await
            .unwrap();
        store
            .update_profile(ProfileUpdate { email: Some("ada@example.com".to_string()), ..Default::default() })
            .await
            .unwrap();

        let stored = store.profile_or_default().await.unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_update_publishes_change() {
        let store = store().await;
        let mut rx = store.changes().subscribe();

        store.update_profile(ProfileUpdate::default()).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.collection, SETTINGS_COLLECTION);
        assert_eq!(change.key, PROFILE_KEY);
    }
}
