//! SQLite persistence for loan documents.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{LoanRecord, LoanStatus};
use crate::remote::NewLoanDocument;

#[derive(Debug, thiserror::Error)]
pub enum ServerStorageError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

/// Opens (creating if needed) the database at `path` and runs migrations.
pub async fn init_db(path: &Path) -> Result<SqlitePool, ServerStorageError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ServerStorageError::Io(parent.to_path_buf(), e))?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());
    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct LoanRow {
    id: String,
    user_id: String,
    amount: f64,
    purpose: String,
    status: String,
    created_at: String,
}

impl LoanRow {
    fn into_record(self) -> Result<LoanRecord, ServerStorageError> {
        let corrupt = |reason: String| ServerStorageError::CorruptRow {
            id: self.id.clone(),
            reason,
        };
        let status = LoanStatus::from_str(&self.status).map_err(corrupt)?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(e.to_string()))?
            .with_timezone(&Utc);

        Ok(LoanRecord {
            id: Some(self.id),
            local_id: None,
            amount: self.amount,
            purpose: self.purpose,
            status,
            created_at,
            offline: false,
            user_id: Some(self.user_id),
        })
    }
}

/// The loans collection.
#[derive(Debug, Clone)]
pub struct LoanDocumentStore {
    pool: SqlitePool,
}

impl LoanDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A private in-memory database, for tests and throwaway servers.
    pub async fn in_memory() -> Result<Self, ServerStorageError> {
        // One connection: every new in-memory connection is a fresh database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Stores a new document, assigning its id and resolving a server
    /// timestamp against this server's clock.
    pub async fn add(&self, doc: &NewLoanDocument) -> Result<LoanRecord, ServerStorageError> {
        let id = Uuid::new_v4().to_string();
        let created_at = doc.created_at.resolve(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO loans (id, user_id, amount, purpose, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&doc.user_id)
        .bind(doc.amount)
        .bind(&doc.purpose)
        .bind(doc.status.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(LoanRecord {
            id: Some(id),
            local_id: None,
            amount: doc.amount,
            purpose: doc.purpose.clone(),
            status: doc.status,
            created_at,
            offline: false,
            user_id: Some(doc.user_id.clone()),
        })
    }

    /// Documents whose `user_id` equals `user_id`, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<LoanRecord>, ServerStorageError> {
        let rows: Vec<LoanRow> =
            sqlx::query_as("SELECT * FROM loans WHERE user_id = ? ORDER BY created_at, id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(LoanRow::into_record).collect()
    }

    /// Sets a loan's review status. Returns false if no such loan exists.
    pub async fn set_status(&self, id: &str, status: LoanStatus) -> Result<bool, ServerStorageError> {
        let result = sqlx::query("UPDATE loans SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
