/// Database manager for the document store and identity provider
///
/// Owns the SQLite connection pool and the schema:
/// - projects: project collection, one row per document
/// - documents: keyed documents such as settings/profile, stored as JSON
/// - users, sessions: identity provider accounts and issued sessions

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Connection pool holder with idempotent schema setup
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open (creating if missing) the configured database and initialize its schema
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = if config.is_in_memory() {
            // Every connection to :memory: is a separate database, so keep exactly one alive
            let options = SqliteConnectOptions::from_str(&config.url)?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            std::fs::create_dir_all(&config.data_dir).with_context(|| {
                format!("Failed to create data directory '{}'", config.data_dir)
            })?;
            tracing::info!("🗄️ Opening database: {}", config.url);
            let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
            SqlitePool::connect_with(options).await?
        };

        let manager = Self { pool };
        manager.init_schema().await?;

        tracing::info!("✅ Database ready: {}", config.url);
        Ok(manager)
    }

    /// Open an in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&DatabaseConfig {
            data_dir: "data".to_string(),
            url: "sqlite::memory:".to_string(),
        })
        .await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                tags JSON NOT NULL,
                image TEXT NOT NULL,
                link TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                data JSON NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (collection, key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                uid TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token_hash TEXT PRIMARY KEY,
                uid TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_uid ON sessions(uid)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
