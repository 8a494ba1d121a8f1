//! Test fixture creation
//!
//! Seeds a fresh database with the catalog and users described in
//! `constants.rs`.

use super::constants::*;
use anyhow::Result;
use songify_server::catalog_store::{
    AlbumFields, BandFields, CatalogStore, SongFields, SqliteCatalogStore,
};
use songify_server::database;
use songify_server::sqlite_persistence::SharedConnection;
use songify_server::user::{SqliteUserStore, UserManager, UserRole};
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary database holding the seeded catalog and users.
/// Returns (temp_dir, connection).
pub fn create_test_db() -> Result<(TempDir, SharedConnection)> {
    let temp_dir = TempDir::new()?;
    let conn = database::open(temp_dir.path().join("songify.db"))?;

    let catalog_store = SqliteCatalogStore::new(conn.clone());
    seed_catalog(&catalog_store)?;

    let catalog_store: Arc<dyn CatalogStore> = Arc::new(catalog_store);
    let user_manager = UserManager::new(catalog_store, Arc::new(SqliteUserStore::new(conn.clone())));
    create_user_with_password(&user_manager, TEST_USER, TEST_PASS, UserRole::User)?;
    create_user_with_password(&user_manager, OTHER_USER, OTHER_PASS, UserRole::User)?;
    create_user_with_password(&user_manager, ADMIN_USER, ADMIN_PASS, UserRole::Admin)?;

    Ok((temp_dir, conn))
}

fn seed_catalog(store: &SqliteCatalogStore) -> Result<()> {
    store.insert_album(&AlbumFields {
        title: ALBUM_1_TITLE.to_string(),
        release_year: ALBUM_1_YEAR,
    })?;
    store.insert_album(&AlbumFields {
        title: ALBUM_2_TITLE.to_string(),
        release_year: ALBUM_2_YEAR,
    })?;

    store.insert_band(&BandFields {
        name: BAND_1_NAME.to_string(),
        form_year: 1990,
        country: "UK".to_string(),
    })?;
    store.insert_band(&BandFields {
        name: BAND_2_NAME.to_string(),
        form_year: 2005,
        country: "USA".to_string(),
    })?;

    for (title, duration, album_id, band_id) in [
        (SONG_1_TITLE, 240, ALBUM_1_ID, BAND_1_ID),
        (SONG_2_TITLE, 180, ALBUM_2_ID, BAND_2_ID),
        (SONG_3_TITLE, 300, ALBUM_1_ID, BAND_1_ID),
    ] {
        store.insert_song(&SongFields {
            title: title.to_string(),
            duration,
            album_id,
            band_id,
        })?;
    }
    Ok(())
}

/// Creates a user holding `role` with a password login.
pub fn create_user_with_password(
    user_manager: &UserManager,
    handle: &str,
    password: &str,
    role: UserRole,
) -> Result<String> {
    let user_id = user_manager.add_user(handle, role)?;
    user_manager.create_password_credentials(handle, password.to_string())?;
    Ok(user_id)
}
