use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::Result;

pub type DB = SqlitePool;

/// Open (creating if needed) the database at `path` and bring its schema up
/// to date.
pub async fn open(path: &str) -> Result<DB> {
    let opts = SqliteConnectOptions::from_str(path)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    migrate(&pool).await?;
    tracing::debug!(path, "database ready");
    Ok(pool)
}

/// In-memory database. A single connection, since every new connection to
/// `sqlite::memory:` is a fresh, empty database.
pub async fn open_in_memory() -> Result<DB> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &DB) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
