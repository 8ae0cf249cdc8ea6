//! Application state for the contract API

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use contract_nlp::ContractAnalyzer;
use shared_types::{AuditEntry, ContractStatus};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use summarizer_core::ContractSummarizer;

pub struct AppState {
    pub db: SqlitePool,
    /// Loaded once at startup and shared by every request
    pub summarizer: Arc<ContractSummarizer>,
    pub analyzer: ContractAnalyzer,
    pub upload_dir: PathBuf,
    pub summary_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Open the pool and bring the schema up to date
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
        tracing::info!("Connecting to database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            // In-memory databases live only as long as their connection
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?;

        Self::run_migrations(&pool).await?;
        Self::recover_interrupted(&pool).await?;
        Ok(pool)
    }

    /// Generation runs in-process, so anything still `processing` at startup
    /// was cut off by a restart. Mark it failed so it can be retried.
    pub async fn recover_interrupted(pool: &SqlitePool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE contracts
            SET status = ?, processed_at = ?, processing_started_at = NULL
            WHERE status = ?
            "#,
        )
        .bind(ContractStatus::Failed.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(ContractStatus::Processing.as_str())
        .execute(pool)
        .await?;

        let recovered = result.rows_affected();
        if recovered > 0 {
            tracing::warn!("Marked {} interrupted contract(s) as failed", recovered);
        }
        Ok(recovered)
    }

    pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contracts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                file_hash TEXT NOT NULL,
                language TEXT NOT NULL DEFAULT 'en',
                page_count INTEGER,
                status TEXT NOT NULL DEFAULT 'pending',
                uploaded_at TEXT NOT NULL,
                processed_at TEXT,
                processing_started_at TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                contract_id INTEGER NOT NULL REFERENCES contracts(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                raw_content TEXT NOT NULL,
                confidence_score REAL NOT NULL,
                summary_type TEXT NOT NULL,
                model_used TEXT NOT NULL,
                word_count INTEGER NOT NULL,
                chunks_processed INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                approved INTEGER NOT NULL DEFAULT 0,
                UNIQUE(contract_id, summary_type)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                contract_id INTEGER NOT NULL REFERENCES contracts(id) ON DELETE CASCADE,
                entity_type TEXT NOT NULL,
                entity_value TEXT NOT NULL,
                confidence REAL NOT NULL,
                section TEXT,
                start_offset INTEGER NOT NULL,
                end_offset INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                action TEXT NOT NULL,
                resource_type TEXT NOT NULL,
                resource_id INTEGER,
                details TEXT,
                ip_address TEXT,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Indexes for fast lookups
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_contracts_user ON contracts(user_id)")
            .execute(pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_entities_contract ON entities(contract_id)")
            .execute(pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_audit_resource ON audit_logs(resource_type, resource_id)",
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Append one row to the audit trail
    pub async fn record_audit(&self, entry: AuditEntry) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, resource_type, resource_id, details, ip_address, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.resource_type.as_str())
        .bind(entry.resource_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(entry.timestamp.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

pub type SharedState = Arc<AppState>;
