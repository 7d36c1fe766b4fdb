//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::crawler::BrokenLinkDetail;
use crate::state::{CrawlJob, CrawlStatus, JobId, UserId};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "SELECT id, user_id, url, status, html_version, title, \
     heading_counts, internal_links, external_links, broken_links, broken_link_detail, \
     total_links, has_login_form, processing_time_ms, error_message, created_at, updated_at \
     FROM crawls";

/// SQLite storage backend
///
/// The connection sits behind a mutex so one store can be shared by the
/// orchestrator and all of its background tasks.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Database(format!("connection lock poisoned: {}", e)))
    }
}

/// Fixed-width, full-precision RFC 3339 so text ordering matches time ordering
/// and a stored timestamp reads back equal to the one written
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn parse_timestamp(row: &Row<'_>, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, column: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(column, e))
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<CrawlJob> {
    let status: String = row.get(3)?;
    let status = CrawlStatus::from_db_string(&status).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(3, format!("status '{}'", status), Type::Text)
    })?;

    let heading_counts: BTreeMap<String, u32> = parse_json(row, 6)?;
    let broken_link_detail: Vec<BrokenLinkDetail> = parse_json(row, 10)?;
    let processing_time_ms: i64 = row.get(13)?;

    Ok(CrawlJob {
        id: row.get(0)?,
        user_id: row.get(1)?,
        url: row.get(2)?,
        status,
        html_version: row.get(4)?,
        title: row.get(5)?,
        heading_counts,
        internal_links: row.get(7)?,
        external_links: row.get(8)?,
        broken_links: row.get(9)?,
        broken_link_detail,
        total_links: row.get(11)?,
        has_login_form: row.get(12)?,
        processing_time_ms: processing_time_ms.max(0) as u64,
        error_message: row.get(14)?,
        created_at: parse_timestamp(row, 15)?,
        updated_at: parse_timestamp(row, 16)?,
    })
}

/// JSON text for the nested result columns
fn encode_results(job: &CrawlJob) -> StorageResult<(String, String)> {
    let headings = serde_json::to_string(&job.heading_counts)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let broken = serde_json::to_string(&job.broken_link_detail)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok((headings, broken))
}

impl JobStore for SqliteStorage {
    fn create(&self, job: &mut CrawlJob) -> StorageResult<()> {
        let now = Utc::now();
        job.created_at = now;
        job.updated_at = now;

        let (headings, broken) = encode_results(job)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO crawls (user_id, url, status, html_version, title, heading_counts,
                internal_links, external_links, broken_links, broken_link_detail, total_links,
                has_login_form, processing_time_ms, error_message, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                job.user_id,
                job.url,
                job.status.to_db_string(),
                job.html_version,
                job.title,
                headings,
                job.internal_links,
                job.external_links,
                job.broken_links,
                broken,
                job.total_links,
                job.has_login_form,
                job.processing_time_ms as i64,
                job.error_message,
                format_timestamp(&job.created_at),
                format_timestamp(&job.updated_at),
            ],
        )?;

        job.id = conn.last_insert_rowid();
        Ok(())
    }

    fn find_by_owner(&self, user_id: UserId) -> StorageResult<Vec<CrawlJob>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))?;

        let jobs = stmt
            .query_map(params![user_id], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    fn find_by_id_and_owner(&self, id: JobId, user_id: UserId) -> StorageResult<CrawlJob> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE id = ?1 AND user_id = ?2",
            SELECT_COLUMNS
        ))?;

        stmt.query_row(params![id, user_id], row_to_job)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StorageError::JobNotFound { id },
                other => StorageError::Sqlite(other),
            })
    }

    fn update(&self, job: &CrawlJob) -> StorageResult<()> {
        let (headings, broken) = encode_results(job)?;
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE crawls SET status = ?1, html_version = ?2, title = ?3, heading_counts = ?4,
                internal_links = ?5, external_links = ?6, broken_links = ?7,
                broken_link_detail = ?8, total_links = ?9, has_login_form = ?10,
                processing_time_ms = ?11, error_message = ?12, updated_at = ?13
             WHERE id = ?14 AND user_id = ?15",
            params![
                job.status.to_db_string(),
                job.html_version,
                job.title,
                headings,
                job.internal_links,
                job.external_links,
                job.broken_links,
                broken,
                job.total_links,
                job.has_login_form,
                job.processing_time_ms as i64,
                job.error_message,
                format_timestamp(&job.updated_at),
                job.id,
                job.user_id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::JobNotFound { id: job.id });
        }
        Ok(())
    }

    fn delete_by_id_and_owner(&self, id: JobId, user_id: UserId) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM crawls WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;

        if changed == 0 {
            return Err(StorageError::JobNotFound { id });
        }
        Ok(())
    }

    fn delete_bulk_by_ids_and_owner(
        &self,
        ids: &[JobId],
        user_id: UserId,
    ) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM crawls WHERE user_id = ? AND id IN ({})",
            placeholders
        );

        let conn = self.conn()?;
        let values = std::iter::once(user_id).chain(ids.iter().copied());
        let removed = conn.execute(&sql, params_from_iter(values))?;
        Ok(removed)
    }
}
