//! Database access for the import service
//!
//! One SQLite database holds both the NALD staging tables (written by the
//! nightly extract load, read-only here) and the normalized target schema
//! (written exclusively through the load gateway's upserts).

pub mod extract;
pub mod load;
pub mod schema;

use nald_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool and ensure the schema exists
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    schema::init_tables(&pool).await?;

    Ok(pool)
}
