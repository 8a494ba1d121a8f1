//! SQLite-backed catalog store.

use super::models::{
    Album, AlbumFields, Band, BandFields, PickerOption, Song, SongFields, SongListing,
};
use super::reference::ReferenceRule;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::SharedConnection;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use tracing::debug;

const SONG_LISTING_SELECT: &str = "SELECT s.id, s.title, s.duration, s.album_id, a.title, s.band_id, b.name
     FROM songs s
     JOIN albums a ON a.id = s.album_id
     JOIN bands b ON b.id = s.band_id";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: SharedConnection,
}

impl SqliteCatalogStore {
    /// Wraps a connection whose schema was already created and validated.
    pub fn new(conn: SharedConnection) -> Self {
        SqliteCatalogStore { conn }
    }

    fn parse_album_row(row: &Row) -> rusqlite::Result<Album> {
        Ok(Album {
            id: row.get(0)?,
            title: row.get(1)?,
            release_year: row.get(2)?,
        })
    }

    fn parse_band_row(row: &Row) -> rusqlite::Result<Band> {
        Ok(Band {
            id: row.get(0)?,
            name: row.get(1)?,
            form_year: row.get(2)?,
            country: row.get(3)?,
        })
    }

    fn parse_song_row(row: &Row) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get(0)?,
            title: row.get(1)?,
            duration: row.get(2)?,
            album_id: row.get(3)?,
            band_id: row.get(4)?,
        })
    }

    fn parse_song_listing_row(row: &Row) -> rusqlite::Result<SongListing> {
        Ok(SongListing {
            id: row.get(0)?,
            title: row.get(1)?,
            duration: row.get(2)?,
            album_id: row.get(3)?,
            album_title: row.get(4)?,
            band_id: row.get(5)?,
            band_name: row.get(6)?,
        })
    }

    fn parse_picker_row(row: &Row) -> rusqlite::Result<PickerOption> {
        Ok(PickerOption {
            id: row.get(0)?,
            label: row.get(1)?,
        })
    }

    fn query_optional<T, F>(conn: &Connection, sql: &str, id: i64, parse: F) -> Result<Option<T>>
    where
        F: FnOnce(&Row) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare_cached(sql)?;
        match stmt.query_row(params![id], parse) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn query_all<T, F>(conn: &Connection, sql: &str, parse: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map([], parse)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .with_context(|| format!("Failed to count rows of {}", table))?;
        Ok(count as usize)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn list_albums(&self) -> Result<Vec<Album>> {
        let conn = self.conn.lock().unwrap();
        Self::query_all(
            &conn,
            "SELECT id, title, release_year FROM albums ORDER BY id ASC",
            Self::parse_album_row,
        )
    }

    fn get_album(&self, id: i64) -> Result<Option<Album>> {
        let conn = self.conn.lock().unwrap();
        Self::query_optional(
            &conn,
            "SELECT id, title, release_year FROM albums WHERE id = ?1",
            id,
            Self::parse_album_row,
        )
    }

    fn insert_album(&self, fields: &AlbumFields) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO albums (title, release_year) VALUES (?1, ?2)",
            params![fields.title, fields.release_year],
        )
        .with_context(|| format!("Failed to insert album {}", fields.title))?;
        let id = conn.last_insert_rowid();
        debug!("Inserted album {} with id {}", fields.title, id);
        Ok(id)
    }

    fn update_album(&self, id: i64, fields: &AlbumFields) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE albums SET title = ?1, release_year = ?2 WHERE id = ?3",
                params![fields.title, fields.release_year, id],
            )
            .with_context(|| format!("Failed to update album {}", id))?;
        Ok(updated > 0)
    }

    fn delete_album(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM albums WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete album {}", id))?;
        Ok(deleted > 0)
    }

    fn list_bands(&self) -> Result<Vec<Band>> {
        let conn = self.conn.lock().unwrap();
        Self::query_all(
            &conn,
            "SELECT id, name, form_year, country FROM bands ORDER BY id ASC",
            Self::parse_band_row,
        )
    }

    fn get_band(&self, id: i64) -> Result<Option<Band>> {
        let conn = self.conn.lock().unwrap();
        Self::query_optional(
            &conn,
            "SELECT id, name, form_year, country FROM bands WHERE id = ?1",
            id,
            Self::parse_band_row,
        )
    }

    fn insert_band(&self, fields: &BandFields) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO bands (name, form_year, country) VALUES (?1, ?2, ?3)",
            params![fields.name, fields.form_year, fields.country],
        )
        .with_context(|| format!("Failed to insert band {}", fields.name))?;
        let id = conn.last_insert_rowid();
        debug!("Inserted band {} with id {}", fields.name, id);
        Ok(id)
    }

    fn update_band(&self, id: i64, fields: &BandFields) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE bands SET name = ?1, form_year = ?2, country = ?3 WHERE id = ?4",
                params![fields.name, fields.form_year, fields.country, id],
            )
            .with_context(|| format!("Failed to update band {}", id))?;
        Ok(updated > 0)
    }

    fn delete_band(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM bands WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete band {}", id))?;
        Ok(deleted > 0)
    }

    fn list_songs(&self) -> Result<Vec<SongListing>> {
        let conn = self.conn.lock().unwrap();
        Self::query_all(
            &conn,
            &format!("{} ORDER BY s.id ASC", SONG_LISTING_SELECT),
            Self::parse_song_listing_row,
        )
    }

    fn get_song(&self, id: i64) -> Result<Option<Song>> {
        let conn = self.conn.lock().unwrap();
        Self::query_optional(
            &conn,
            "SELECT id, title, duration, album_id, band_id FROM songs WHERE id = ?1",
            id,
            Self::parse_song_row,
        )
    }

    fn get_song_listing(&self, id: i64) -> Result<Option<SongListing>> {
        let conn = self.conn.lock().unwrap();
        Self::query_optional(
            &conn,
            &format!("{} WHERE s.id = ?1", SONG_LISTING_SELECT),
            id,
            Self::parse_song_listing_row,
        )
    }

    fn insert_song(&self, fields: &SongFields) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO songs (title, duration, album_id, band_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                fields.title,
                fields.duration,
                fields.album_id,
                fields.band_id
            ],
        )
        .with_context(|| format!("Failed to insert song {}", fields.title))?;
        let id = conn.last_insert_rowid();
        debug!("Inserted song {} with id {}", fields.title, id);
        Ok(id)
    }

    fn update_song(&self, id: i64, fields: &SongFields) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE songs SET title = ?1, duration = ?2, album_id = ?3, band_id = ?4 WHERE id = ?5",
                params![
                    fields.title,
                    fields.duration,
                    fields.album_id,
                    fields.band_id,
                    id
                ],
            )
            .with_context(|| format!("Failed to update song {}", id))?;
        Ok(updated > 0)
    }

    fn delete_song(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete song {}", id))?;
        Ok(deleted > 0)
    }

    fn album_options(&self) -> Result<Vec<PickerOption>> {
        let conn = self.conn.lock().unwrap();
        Self::query_all(
            &conn,
            "SELECT id, title FROM albums ORDER BY id ASC",
            Self::parse_picker_row,
        )
    }

    fn band_options(&self) -> Result<Vec<PickerOption>> {
        let conn = self.conn.lock().unwrap();
        Self::query_all(
            &conn,
            "SELECT id, name FROM bands ORDER BY id ASC",
            Self::parse_picker_row,
        )
    }

    fn song_options(&self) -> Result<Vec<PickerOption>> {
        let conn = self.conn.lock().unwrap();
        Self::query_all(
            &conn,
            "SELECT id, title FROM songs ORDER BY id ASC",
            Self::parse_picker_row,
        )
    }

    fn reference_exists(&self, rule: &ReferenceRule, value: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&rule.count_query())?;
        let count: i64 = stmt
            .query_row(params![value], |row| row.get(0))
            .with_context(|| {
                format!(
                    "Failed to check {}.{} = {}",
                    rule.table(),
                    rule.column(),
                    value
                )
            })?;
        Ok(count > 0)
    }

    fn get_albums_count(&self) -> Result<usize> {
        self.count("albums")
    }

    fn get_bands_count(&self) -> Result<usize> {
        self.count("bands")
    }

    fn get_songs_count(&self) -> Result<usize> {
        self.count("songs")
    }
}
