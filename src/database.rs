//! The Songify database: catalog and user tables share one SQLite file so
//! liked songs can reference both users and songs.

use crate::catalog_store::schema::{ALBUMS_TABLE_V_0, BANDS_TABLE_V_0, SONGS_TABLE_V_0};
use crate::sqlite_persistence::{
    open_in_memory_database, open_versioned_database, SharedConnection, VersionedSchema,
};
use crate::user::schema::{
    AUTH_TOKENS_TABLE_V_0, LIKED_SONGS_TABLE_V_0, USERS_TABLE_V_0, USER_PASSWORD_CREDENTIALS_V_0,
    USER_ROLES_TABLE_V_0,
};
use anyhow::Result;
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USERS_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_V_0,
        AUTH_TOKENS_TABLE_V_0,
        USER_ROLES_TABLE_V_0,
        ALBUMS_TABLE_V_0,
        BANDS_TABLE_V_0,
        SONGS_TABLE_V_0,
        LIKED_SONGS_TABLE_V_0,
    ],
    migration: None,
}];

/// Opens (or creates) the database file at `db_path`.
pub fn open<P: AsRef<Path>>(db_path: P) -> Result<SharedConnection> {
    let conn = open_versioned_database(db_path, VERSIONED_SCHEMAS)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory() -> Result<SharedConnection> {
    let conn = open_in_memory_database(VERSIONED_SCHEMAS)?;
    Ok(Arc::new(Mutex::new(conn)))
}
