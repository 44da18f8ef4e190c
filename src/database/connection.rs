use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::setup;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Opens the store at `database_path` and makes sure the schema exists
pub fn open_store<P: AsRef<Path>>(database_path: P) -> Result<DbPool> {
    let pool = create_pool(database_path)?;
    let conn = get_connection(&pool)?;
    setup::ensure_schema(&conn)?;
    Ok(pool)
}

pub fn create_pool<P: AsRef<Path>>(database_path: P) -> Result<DbPool> {
    let manager = build_manager(database_path.as_ref());
    build_pool(manager)
}

fn build_manager(path: &Path) -> SqliteConnectionManager {
    SqliteConnectionManager::file(path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}
