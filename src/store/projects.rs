/// SQLite persistence for the project collection
///
/// Handles project CRUD. Identifiers and creation timestamps are assigned here,
/// never by the caller. Every write is published on the change feed.

use crate::store::{
    changes::{ChangeFeed, ChangeKind},
    error::StoreError,
    types::{NewProject, Project, ProjectUpdate, PROJECTS_COLLECTION},
};
use anyhow::Result;
use sqlx::{sqlite::{SqlitePool, SqliteRow}, Row};

/// Project collection accessor
#[derive(Debug, Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl ProjectStore {
    pub fn new(pool: SqlitePool, changes: ChangeFeed) -> Self {
        Self { pool, changes }
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    /// Insert a new project and return its store-assigned id
    ///
    /// `created_at` is stamped with the current time in epoch milliseconds.
    pub async fn add_project(&self, project: NewProject) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();

        if let Err(e) = self.insert(&id, &project, created_at).await {
            tracing::error!("❌ Failed to add project '{}': {}", project.title, e);
            return Err(e);
        }

        self.changes.publish(PROJECTS_COLLECTION, &id, ChangeKind::Created);
        tracing::info!("📝 Added project {} ({})", id, project.title);
        Ok(id)
    }

    async fn insert(&self, id: &str, project: &NewProject, created_at: i64) -> Result<()> {
        let tags_json = serde_json::to_string(&project.tags)?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, title, description, category, tags, image, link, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.category)
        .bind(&tags_json)
        .bind(&project.image)
        .bind(&project.link)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Retrieve a project by ID
    ///
    /// A missing project is `Ok(None)`; database failures are errors.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| project_from_row(&row)).transpose()
    }

    /// List every project, newest first
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY created_at DESC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(project_from_row).collect()
    }

    /// Merge the supplied fields into an existing project
    pub async fn update_project(&self, id: &str, updates: ProjectUpdate) -> Result<Project> {
        tracing::debug!("✏️ update_project called for id: {} {:?}", id, updates);

        match self.apply_update(id, updates).await {
            Ok(project) => {
                self.changes.publish(PROJECTS_COLLECTION, id, ChangeKind::Updated);
                tracing::info!("✅ Updated project {}", id);
                Ok(project)
            }
            Err(e) => {
                tracing::error!("❌ Failed to update project {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Read, merge and write inside one transaction
    async fn apply_update(&self, id: &str, updates: ProjectUpdate) -> Result<Project> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut project = match row {
            Some(row) => project_from_row(&row)?,
            None => return Err(StoreError::not_found(PROJECTS_COLLECTION, id).into()),
        };

        if let Some(title) = updates.title {
            project.title = title;
        }
        if let Some(description) = updates.description {
            project.description = description;
        }
        if let Some(category) = updates.category {
            project.category = category;
        }
        if let Some(tags) = updates.tags {
            project.tags = tags;
        }
        if let Some(image) = updates.image {
            project.image = image;
        }
        if let Some(link) = updates.link {
            project.link = link;
        }
        if let Some(created_at) = updates.created_at {
            project.created_at = created_at;
        }

        let tags_json = serde_json::to_string(&project.tags)?;
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET title = ?, description = ?, category = ?, tags = ?, image = ?, link = ?, created_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.category)
        .bind(&tags_json)
        .bind(&project.image)
        .bind(&project.link)
        .bind(project.created_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(PROJECTS_COLLECTION, id).into());
        }

        tx.commit().await?;
        Ok(project)
    }

    /// Delete a project by ID
    ///
    /// Returns whether a document was removed; deleting a missing id is not an error.
    pub async fn delete_project(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(result) => {
                let removed = result.rows_affected() > 0;
                if removed {
                    self.changes.publish(PROJECTS_COLLECTION, id, ChangeKind::Deleted);
                    tracing::info!("🗑️ Deleted project {}", id);
                }
                Ok(removed)
            }
            Err(e) => {
                tracing::error!("❌ Failed to delete project {}: {}", id, e);
                Err(e.into())
            }
        }
    }
}

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let tags_json: String = row.try_get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| StoreError::Invalid(format!("tags column: {}", e)))?;

    Ok(Project {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        tags,
        image: row.try_get("image")?,
        link: row.try_get("link")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::database::DatabaseManager;

    async fn store() -> ProjectStore {
        let db = DatabaseManager::in_memory().await.unwrap();
        ProjectStore::new(db.pool().clone(), ChangeFeed::new())
    }

    fn sample(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: "A small thing".to_string(),
            category: "tools".to_string(),
            tags: vec!["rust".to_string(), "cli".to_string()],
            image: "img/kiln.png".to_string(),
            link: "https://example.com/kiln".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_stamps_creation_time() {
        let store = store().await;
        let before = chrono::Utc::now().timestamp_millis();

        // createdAt in the payload never reaches the store
        let payload = serde_json::json!({ "title": "Kiln", "createdAt": 1 });
        let project: NewProject = serde_json::from_value(payload).unwrap();
        let id = store.add_project(project).await.unwrap();

        let stored = store.get_project(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert!(stored.created_at >= before);
    }

    #[tokio::test]
    async fn test_get_missing_project_is_none() {
        let store = store().await;
        assert!(store.get_project("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip_fields() {
        let store = store().await;
        let id = store.add_project(sample("Kiln")).await.unwrap();

        let stored = store.get_project(&id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Kiln");
        assert_eq!(stored.tags, vec!["rust".to_string(), "cli".to_string()]);
        assert_eq!(stored.link, "https://example.com/kiln");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = store().await;
        let first = store.add_project(sample("First")).await.unwrap();
        let second = store.add_project(sample("Second")).await.unwrap();

        // Pin timestamps so ordering doesn't depend on clock resolution
        store
            .update_project(&first, ProjectUpdate { created_at: Some(1_000), ..Default::default() })
            .await
            .unwrap();
        store
            .update_project(&second, ProjectUpdate { created_at: Some(2_000), ..Default::default() })
            .await
            .unwrap();

        let titles: Vec<String> = store
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Second".to_string(), "First".to_string()]);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = store().await;
        let id = store.add_project(sample("Kiln")).await.unwrap();

        let updated = store
            .update_project(
                &id,
                ProjectUpdate {
                    title: Some("Kiln 2".to_string()),
                    tags: Some(vec!["wasm".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Kiln 2");
        assert_eq!(updated.tags, vec!["wasm".to_string()]);
        assert_eq!(updated.category, "tools");

        let stored = store.get_project(&id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_missing_project_fails() {
        let store = store().await;
        let err = store
            .update_project("nope", ProjectUpdate { title: Some("x".to_string()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_racing_delete_stays_consistent() {
        let store = store().await;

        for _ in 0..20 {
            let id = store.add_project(sample("Kiln")).await.unwrap();
            let update = ProjectUpdate { title: Some("Kiln 2".to_string()), ..Default::default() };

            let (updated, deleted) = tokio::join!(store.update_project(&id, update), store.delete_project(&id));
            assert!(deleted.unwrap());
            assert!(store.get_project(&id).await.unwrap().is_none());

            // Whichever ran first, an update never reports success for a document that is gone
            if let Err(e) = updated {
                assert!(matches!(e.downcast_ref::<StoreError>(), Some(StoreError::NotFound { .. })));
            }
        }
    }

    #[tokio::test]
    async fn test_update_after_delete_is_not_found() {
        let store = store().await;
        let id = store.add_project(sample("Kiln")).await.unwrap();
        store.delete_project(&id).await.unwrap();

        let mut rx = store.changes().subscribe();
        let err = store
            .update_project(&id, ProjectUpdate { title: Some("Kiln 2".to_string()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotFound { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let store = store().await;
        let id = store.add_project(sample("Kiln")).await.unwrap();

        assert!(store.delete_project(&id).await.unwrap());
        assert!(store.get_project(&id).await.unwrap().is_none());
        assert!(!store.delete_project(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_writes_publish_changes() {
        let store = store().await;
        let mut rx = store.changes().subscribe();

        let id = store.add_project(sample("Kiln")).await.unwrap();
        store.delete_project(&id).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().kind, ChangeKind::Created);
        let deleted = rx.recv().await.unwrap();
        assert_eq!(deleted.kind, ChangeKind::Deleted);
        assert_eq!(deleted.key, id);
    }
}
