//! CatalogStore trait definition.

use super::models::{
    Album, AlbumFields, Band, BandFields, PickerOption, Song, SongFields, SongListing,
};
use super::reference::ReferenceRule;
use anyhow::Result;

/// Row-level access to albums, bands and songs.
///
/// Listings are ordered by id ascending. `update_*` and `delete_*` return
/// whether a row with the given id existed.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Albums
    // =========================================================================

    fn list_albums(&self) -> Result<Vec<Album>>;

    fn get_album(&self, id: i64) -> Result<Option<Album>>;

    /// Inserts a new album and returns its id.
    fn insert_album(&self, fields: &AlbumFields) -> Result<i64>;

    fn update_album(&self, id: i64, fields: &AlbumFields) -> Result<bool>;

    /// Deletes an album, its songs go with it.
    fn delete_album(&self, id: i64) -> Result<bool>;

    // =========================================================================
    // Bands
    // =========================================================================

    fn list_bands(&self) -> Result<Vec<Band>>;

    fn get_band(&self, id: i64) -> Result<Option<Band>>;

    fn insert_band(&self, fields: &BandFields) -> Result<i64>;

    fn update_band(&self, id: i64, fields: &BandFields) -> Result<bool>;

    /// Deletes a band, its songs go with it.
    fn delete_band(&self, id: i64) -> Result<bool>;

    // =========================================================================
    // Songs
    // =========================================================================

    /// All songs joined with their album title and band name.
    fn list_songs(&self) -> Result<Vec<SongListing>>;

    fn get_song(&self, id: i64) -> Result<Option<Song>>;

    fn get_song_listing(&self, id: i64) -> Result<Option<SongListing>>;

    fn insert_song(&self, fields: &SongFields) -> Result<i64>;

    fn update_song(&self, id: i64, fields: &SongFields) -> Result<bool>;

    fn delete_song(&self, id: i64) -> Result<bool>;

    // =========================================================================
    // Pickers and references
    // =========================================================================

    /// (id, title) of every album.
    fn album_options(&self) -> Result<Vec<PickerOption>>;

    /// (id, name) of every band.
    fn band_options(&self) -> Result<Vec<PickerOption>>;

    /// (id, title) of every song.
    fn song_options(&self) -> Result<Vec<PickerOption>>;

    /// Whether a row matching `rule` holds `value`.
    fn reference_exists(&self, rule: &ReferenceRule, value: i64) -> Result<bool>;

    // =========================================================================
    // Counts
    // =========================================================================

    fn get_albums_count(&self) -> Result<usize>;

    fn get_bands_count(&self) -> Result<usize>;

    fn get_songs_count(&self) -> Result<usize>;
}
