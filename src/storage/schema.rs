//! Database schema definitions
//!
//! This module contains the SQL schema for the Sumi-Sonar job store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per user-submitted crawl job
CREATE TABLE IF NOT EXISTS crawls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    html_version TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    heading_counts TEXT NOT NULL DEFAULT '{}',
    internal_links INTEGER NOT NULL DEFAULT 0,
    external_links INTEGER NOT NULL DEFAULT 0,
    broken_links INTEGER NOT NULL DEFAULT 0,
    broken_link_detail TEXT NOT NULL DEFAULT '[]',
    total_links INTEGER NOT NULL DEFAULT 0,
    has_login_form INTEGER NOT NULL DEFAULT 0,
    processing_time_ms INTEGER NOT NULL DEFAULT 0,
    error_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawls_user ON crawls(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_crawls_status ON crawls(status);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - Database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
