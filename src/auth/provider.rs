/// Email/password identity provider
///
/// Accounts and issued sessions live in SQLite. Session tokens are handed to
/// the client once and stored only as SHA-256 hashes.
///
/// The provider also publishes a process-wide auth state: the user of the most
/// recently issued live session, or `None` when nobody is signed in.
///
/// Sessions expire `session_ttl` after they were issued. Expired sessions no
/// longer resolve and are purged on the next sign-in.

use crate::auth::{
    password::{generate_session_token, hash_password, hash_session_token, verify_password},
    types::{AuthError, Session, User},
};
use anyhow::Result;
use sqlx::{sqlite::SqlitePool, Row};
use tokio::sync::watch;

/// Session lifetime when none is configured
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct IdentityProvider {
    pool: SqlitePool,
    state: watch::Sender<Option<User>>,
    session_ttl: chrono::Duration,
}

impl IdentityProvider {
    /// Create the provider with the default session lifetime
    pub async fn connect(pool: SqlitePool) -> Result<Self> {
        Self::connect_with_ttl(pool, chrono::Duration::days(DEFAULT_SESSION_TTL_DAYS)).await
    }

    /// Create the provider and restore auth state from sessions that survived a restart
    pub async fn connect_with_ttl(pool: SqlitePool, session_ttl: chrono::Duration) -> Result<Self> {
        let (state, _) = watch::channel(None);
        let provider = Self { pool, state, session_ttl };
        provider.publish_state().await?;
        Ok(provider)
    }

    /// Oldest `created_at` (epoch ms) a live session may have
    fn session_cutoff(&self) -> i64 {
        (chrono::Utc::now() - self.session_ttl).timestamp_millis()
    }

    /// Create the account or reset its password
    ///
    /// Used at startup to provision the admin account from configuration.
    pub async fn ensure_user(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password)?;
        let uid = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (uid, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                password_hash = excluded.password_hash
            "#,
        )
        .bind(&uid)
        .bind(email)
        .bind(&password_hash)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT uid, email FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        let user = User {
            uid: row.get("uid"),
            email: row.get("email"),
        };
        tracing::info!("👤 Account ready: {}", user.email);
        Ok(user)
    }

    /// Exchange email and password for a session
    ///
    /// Failures are logged and returned; bad credentials are `AuthError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        match self.sign_in(email, password).await {
            Ok(session) => {
                tracing::info!("🔑 Signed in: {}", session.user.email);
                Ok(session)
            }
            Err(e) => {
                tracing::error!("❌ Sign-in failed for {}: {}", email, e);
                Err(e)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let row = sqlx::query("SELECT uid, email, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials.into());
        };
        let password_hash: String = row.get("password_hash");
        if !verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let user = User {
            uid: row.get("uid"),
            email: row.get("email"),
        };
        let token = generate_session_token();

        let purged = sqlx::query("DELETE FROM sessions WHERE created_at < ?")
            .bind(self.session_cutoff())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!("🧹 Purged {} expired sessions", purged);
        }

        sqlx::query("INSERT INTO sessions (token_hash, uid, created_at) VALUES (?, ?, ?)")
            .bind(hash_session_token(&token))
            .bind(&user.uid)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;

        self.state.send_replace(Some(user.clone()));
        Ok(Session { token, user })
    }

    /// End the session behind `token`
    ///
    /// Failures are logged and swallowed.
    pub async fn logout(&self, token: &str) {
        if let Err(e) = self.sign_out(token).await {
            tracing::error!("❌ Sign-out failed: {}", e);
        }
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_session_token(token))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!("👋 Session ended");
            self.publish_state().await?;
        }
        Ok(())
    }

    /// Resolve a session token to its user
    ///
    /// Unknown and expired tokens resolve to `None`.
    pub async fn session(&self, token: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT users.uid, users.email
            FROM sessions JOIN users ON users.uid = sessions.uid
            WHERE sessions.token_hash = ? AND sessions.created_at >= ?
            "#,
        )
        .bind(hash_session_token(token))
        .bind(self.session_cutoff())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| User {
            uid: row.get("uid"),
            email: row.get("email"),
        }))
    }

    /// Subscribe to auth state changes
    ///
    /// The receiver starts at the current state and sees every later change.
    pub fn on_auth_state_changed(&self) -> watch::Receiver<Option<User>> {
        self.state.subscribe()
    }

    /// Recompute the published state from the newest live session
    async fn publish_state(&self) -> Result<()> {
        let row = sqlx::query(
            r#"
            SELECT users.uid, users.email
            FROM sessions JOIN users ON users.uid = sessions.uid
            WHERE sessions.created_at >= ?
            ORDER BY sessions.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(self.session_cutoff())
        .fetch_optional(&self.pool)
        .await?;

        let user = row.map(|row| User {
            uid: row.get("uid"),
            email: row.get("email"),
        });
        self.state.send_replace(user);
        Ok(())
    }
}
