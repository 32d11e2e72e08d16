use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

/// Opens (creating if needed) the SQLite database at `db_path` and makes sure
/// the `products` and `category_definitions` tables exist.
///
/// # Errors
///
/// Fails when the file cannot be opened or a table cannot be created.
pub fn init(db_path: impl AsRef<Path>) -> anyhow::Result<Database> {
    let db_path = db_path.as_ref();

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open SQLite database {}", db_path.display()))?;

    create_tables(&conn)?;
    info!(path = %db_path.display(), "Database ready");

    Ok(Database::new(Arc::new(Mutex::new(conn))))
}

fn create_tables(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            price TEXT,
            url TEXT NOT NULL,
            image TEXT,
            category TEXT NOT NULL,
            category_color TEXT NOT NULL,
            category_emoji TEXT NOT NULL,
            attributes TEXT NOT NULL DEFAULT '{}'
        )",
        [],
    )
    .context("Failed to create products table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS category_definitions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            emoji TEXT NOT NULL,
            color TEXT NOT NULL,
            fields TEXT NOT NULL DEFAULT '[]'
        )",
        [],
    )
    .context("Failed to create category_definitions table")?;

    Ok(())
}
