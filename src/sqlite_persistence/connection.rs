use super::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::{
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

/// A connection shared by every store that lives in the same database file.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Opens the database at `db_path`, creating the latest schema when the file
/// does not exist yet, otherwise validating it and running pending migrations.
pub fn open_versioned_database<T: AsRef<Path>>(
    db_path: T,
    schemas: &'static [VersionedSchema],
) -> Result<Connection> {
    let db_path = db_path.as_ref();
    let conn = if db_path.exists() {
        Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database {:?}", db_path))?
    } else {
        info!("Creating new database at {:?}", db_path);
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to create database {:?}", db_path))?;
        enable_foreign_keys(&conn)?;
        latest_schema(schemas)?.create(&conn)?;
        conn
    };
    enable_foreign_keys(&conn)?;
    migrate_if_needed(&conn, schemas)?;
    Ok(conn)
}

/// Same as [`open_versioned_database`] but backed by memory, used by tests.
pub fn open_in_memory_database(schemas: &'static [VersionedSchema]) -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    enable_foreign_keys(&conn)?;
    latest_schema(schemas)?.create(&conn)?;
    Ok(conn)
}

// Foreign keys are a per-connection setting in SQLite.
fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")
}

fn latest_schema(schemas: &'static [VersionedSchema]) -> Result<&'static VersionedSchema> {
    schemas.last().context("No schema versions defined")
}

fn migrate_if_needed(conn: &Connection, schemas: &'static [VersionedSchema]) -> Result<()> {
    let db_version = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
        .context("Failed to read database version")?
        - BASE_DB_VERSION as i64;

    if db_version < 0 {
        bail!(
            "Database version {} is too old, does not contain base db version {}",
            db_version,
            BASE_DB_VERSION
        );
    }
    if db_version >= schemas.len() as i64 {
        bail!("Database version {} is too new", db_version);
    }
    let version = db_version as usize;

    schemas
        .get(version)
        .context("Failed to get schema")?
        .validate(conn)?;

    let mut latest_from = version;
    for schema in schemas.iter().skip(version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!(
                "Migrating db from version {} to {}",
                latest_from, schema.version
            );
            migration_fn(conn)?;
            latest_from = schema.version;
        }
    }
    conn.execute(
        &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
        [],
    )?;

    Ok(())
}
