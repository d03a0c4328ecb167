//! Persistent job store keyed by listing link.
//!
//! Every operation opens its own connection and releases it before returning,
//! whichever way it returns. The table is created on first use; concurrent
//! runs racing on creation are fine since `IF NOT EXISTS` treats an existing
//! table as success.

use crate::error::StoreError;
use crate::record::JobRecord;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    company TEXT,
    location TEXT,
    link TEXT UNIQUE
)
"#;

/// Outcome of [`JobStore::insert_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    /// Rows written
    pub inserted: u64,
    /// Records whose link was already stored
    pub ignored: u64,
    /// Records without a resolved link, never stored
    pub unresolved: u64,
}

/// A link stored more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateLink {
    pub link: String,
    pub count: i64,
}

/// SQLite-backed store of scraped jobs
#[derive(Debug, Clone)]
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self, create: bool) -> Result<SqliteConnection, StoreError> {
        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(create)
            .busy_timeout(Duration::from_secs(30))
            .connect()
            .await?;
        Ok(conn)
    }

    /// Insert every record whose link is not stored yet
    ///
    /// Records are attempted one at a time. An already-stored link is skipped
    /// without complaint; a record that fails to insert is logged and the rest
    /// continue. Records without a resolved link are not stored at all.
    pub async fn insert_all(&self, records: &[JobRecord]) -> Result<InsertSummary, StoreError> {
        let mut conn = self.connect(true).await?;
        let result = insert_records(&mut conn, records).await;
        if let Err(e) = conn.close().await {
            ::log::warn!("Failed to close database connection: {}", e);
        }
        ::log::info!("Database connection closed");
        result
    }

    /// Links stored more than once
    ///
    /// The unique constraint on `link` means this is normally empty; it exists
    /// to audit databases written by other tools.
    pub async fn find_duplicate_links(&self) -> Result<Vec<DuplicateLink>, StoreError> {
        let mut conn = self.connect(false).await?;
        let result = query_duplicates(&mut conn).await;
        if let Err(e) = conn.close().await {
            ::log::warn!("Failed to close database connection: {}", e);
        }
        result
    }

    /// Number of stored jobs, zero when the table does not exist yet
    pub async fn count(&self) -> Result<u64, StoreError> {
        let mut conn = self.connect(true).await?;
        let result = count_rows(&mut conn).await;
        if let Err(e) = conn.close().await {
            ::log::warn!("Failed to close database connection: {}", e);
        }
        result
    }
}

async fn insert_records(
    conn: &mut SqliteConnection,
    records: &[JobRecord],
) -> Result<InsertSummary, StoreError> {
    sqlx::query(SCHEMA_SQL).execute(&mut *conn).await?;

    let mut summary = InsertSummary::default();
    let mut tx = conn.begin().await?;
    for record in records {
        if !record.has_link() {
            ::log::debug!("Not storing job without a link: {:?}", record);
            summary.unresolved += 1;
            continue;
        }

        let result = sqlx::query(
            "INSERT OR IGNORE INTO jobs (title, company, location, link) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(&record.company)
        .bind(&record.location)
        .bind(&record.link)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => summary.inserted += 1,
            Ok(_) => summary.ignored += 1,
            Err(e) => ::log::error!("Database insertion error for job {:?}: {}", record, e),
        }
    }
    tx.commit().await?;

    ::log::info!(
        "Stored {} new jobs ({} already present, {} without link)",
        summary.inserted,
        summary.ignored,
        summary.unresolved
    );
    Ok(summary)
}

async fn table_exists(conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'jobs'")
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.is_some())
}

async fn query_duplicates(conn: &mut SqliteConnection) -> Result<Vec<DuplicateLink>, StoreError> {
    if !table_exists(conn).await? {
        ::log::warn!("Table 'jobs' does not exist. Run the scraper first to create it.");
        return Ok(Vec::new());
    }

    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT link, COUNT(*) AS cnt
        FROM jobs
        GROUP BY link
        HAVING cnt > 1
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(link, count)| DuplicateLink { link, count })
        .collect())
}

async fn count_rows(conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    if !table_exists(conn).await? {
        return Ok(0);
    }
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count.max(0) as u64)
}
