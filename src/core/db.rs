use std::fs;

use anyhow::{Error, Result};
use rusqlite::Connection as SqliteConnection;
use tokio_rusqlite::Connection;

pub const DB_FILE_NAME: &str = "advisor.sqlite";

/// Open the database in the directory `db_path`, creating the
/// directory if needed.
pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    fs::create_dir_all(db_path)?;
    let db = Connection::open(format!(
        "{}/{}",
        db_path.trim_end_matches('/'),
        DB_FILE_NAME
    ))
    .await?;
    Ok(db)
}

/// Create every table the app needs. Safe to run on each startup.
pub fn initialize_db(conn: &SqliteConnection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS users (
            identifier TEXT PRIMARY KEY,
            secret_hash TEXT NOT NULL
        );
        ",
    )
}

/// Open the database and make sure the schema exists.
pub async fn open_and_initialize(db_path: &str) -> Result<Connection, Error> {
    let db = async_db(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}
