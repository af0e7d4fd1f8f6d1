// src/database.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::credential_store::CredentialStore;
use crate::core::session_store::Credential;
use crate::error::SyncError;

const DEFAULT_CREDENTIAL_KEY: &str = "token";

#[derive(Debug)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub pool: Option<SqlitePool>,
}

impl DatabaseConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            pool: None,
        }
    }

    /// Initialize the database connection pool
    pub async fn init_pool(&mut self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create credential database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", self.database_path.display());

        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;
        self.pool = Some(pool);

        info!("Credential database ready: {}", database_url);
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Database pool not initialized. Call init_pool() first.")
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool()?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                token TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create credentials table")?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

/// Key/value secret store backed by a single SQLite table
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
    key: String,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            key: DEFAULT_CREDENTIAL_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Open (or create) the database at `path` and prepare the schema
    pub async fn open(path: PathBuf) -> Result<Self> {
        let mut config = DatabaseConfig::new(path);
        config.init_pool().await?;
        config.migrate().await?;
        Ok(Self::new(config.pool()?.clone()))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, SyncError> {
        let token = sqlx::query_scalar::<_, String>(
            r#"
            SELECT token FROM credentials
            WHERE key = ?
            "#,
        )
        .bind(&self.key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token.map(Credential::new))
    }

    async fn set(&self, credential: &Credential) -> Result<(), SyncError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (key, token, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                token = excluded.token,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.key)
        .bind(credential.bearer())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!("Stored credential under key: {}", self.key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SyncError> {
        let result = sqlx::query("DELETE FROM credentials WHERE key = ?")
            .bind(&self.key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!("Cleared credential under key: {}", self.key);
        }
        Ok(())
    }
}
